//! Strongly-typed migration slug.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Version-bearing name of one migration pair, e.g. `001_init`.
///
/// A slug is the script file name up to its first `.`. Its version is the
/// integer spelled by the characters before the first `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Create a new `Slug`, panicking if it is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(slug: impl Into<String>) -> Self {
        let s = slug.into();
        assert!(!s.is_empty(), "Slug must not be empty");
        Self(s)
    }

    /// Try to create a new `Slug`, returning `None` if the input is empty.
    ///
    /// An empty string is how the cursor table spells "nothing applied", so
    /// this doubles as the decoder for stored cursor values.
    pub fn try_new(slug: impl Into<String>) -> Option<Self> {
        let s = slug.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the underlying slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Parse the numeric version prefix (digits before the first `_`).
    ///
    /// Versions order migrations; gaps between them are never an error.
    pub fn version(&self) -> CoreResult<u64> {
        let prefix = self.0.split('_').next().unwrap_or_default();
        prefix
            .parse::<u64>()
            .map_err(|source| CoreError::InvalidVersion {
                slug: self.0.clone(),
                source,
            })
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Slug {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Slug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = &'static str;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or("Slug must not be empty")
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl PartialEq<str> for Slug {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Slug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
