//! SQL quoting helpers for the statements Tidemark builds itself.
//!
//! Migration scripts are executed verbatim; only cursor-table statements
//! are assembled from configuration values and slugs.

/// Quote a potentially schema-qualified identifier (e.g. `meta.migrations`).
///
/// Each `.`-separated component is wrapped in double quotes with embedded
/// double quotes doubled.
///
/// # Examples
/// ```
/// use tm_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("migrations"), r#""migrations""#);
/// assert_eq!(quote_qualified("meta.migrations"), r#""meta"."migrations""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Render `value` as a single-quoted SQL string literal.
///
/// # Examples
/// ```
/// use tm_core::sql_utils::quote_literal;
/// assert_eq!(quote_literal("001_init"), "'001_init'");
/// assert_eq!(quote_literal("it's"), "'it''s'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
