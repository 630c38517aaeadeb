//! Error types for startup and I/O surfaces
//!
//! The tick path itself never fails; see `core::session`.

use std::io;
use thiserror::Error;

/// Result alias used across the crate
pub type ClockResult<T> = Result<T, ClockError>;

/// Errors that can abort startup or an I/O operation
#[derive(Error, Debug)]
pub enum ClockError {
    /// File or socket I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid JSON for `ClockConfig`
    #[error("Config parse error: {0}")]
    ConfigParse(serde_json::Error),

    /// A report or summary could not be encoded as JSON
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parsed but violates a constraint
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// CSV session log row could not be read
    #[error("Log format error at line {line}: {reason}")]
    LogFormat { line: usize, reason: String },

    /// CSV session log has a header but no rows
    #[error("Log contains no samples")]
    EmptyLog,

    /// HTTP server failed to bind or serve
    #[error("Server error: {0}")]
    Server(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_list_keyed_map() -> ClockResult<String> {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], 1);
        Ok(serde_json::to_string(&map)?)
    }

    #[test]
    fn test_json_errors_are_not_config_errors() {
        let err = encode_list_keyed_map().unwrap_err();
        assert!(matches!(err, ClockError::Json(_)));
        assert!(err.to_string().starts_with("JSON encoding error"));
    }

    #[test]
    fn test_log_format_message() {
        let err = ClockError::LogFormat { line: 7, reason: "bad".to_string() };
        assert_eq!(err.to_string(), "Log format error at line 7: bad");
    }
}
