//! Shared serde helper functions used across multiple modules.

/// Serde default function that returns `true`.
pub fn default_true() -> bool {
    true
}

/// Serde default for CSV-style delimiters.
pub fn default_delimiter() -> String {
    ",".to_string()
}
