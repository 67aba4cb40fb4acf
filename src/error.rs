//! Scanner errors
//!
//! Native engine failures carry the engine's last error text and display it
//! verbatim, so callers see exactly what the engine reported.

/// Errors raised by scanners, the pattern cache and the offset index
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// A non-string pattern, input or config value reached the API boundary
    InvalidArgument(String),
    /// The engine rejected a pattern; nothing was cached for the scanner
    Compilation { pattern_index: usize, message: String },
    /// The engine reported a failure status while matching
    Match(String),
    /// Releasing compiled patterns failed; the affected entry is dropped
    ResourceRelease(String),
    /// The shared pattern cache is already borrowed (re-entrant call)
    CacheUnavailable,
}

impl ScanError {
    /// The text reported by the engine (or the argument description)
    pub fn message(&self) -> &str {
        match self {
            ScanError::InvalidArgument(msg) => msg,
            ScanError::Compilation { message, .. } => message,
            ScanError::Match(msg) => msg,
            ScanError::ResourceRelease(msg) => msg,
            ScanError::CacheUnavailable => "Pattern cache is already in use",
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ScanError::InvalidArgument(_))
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ScanError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_passes_engine_text_through() {
        let err = ScanError::Compilation {
            pattern_index: 2,
            message: "regex parse error: unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "regex parse error: unclosed group");

        let err = ScanError::Match("invalid pattern handle 7".to_string());
        assert_eq!(err.to_string(), "invalid pattern handle 7");
    }

    #[test]
    fn test_invalid_argument_flag() {
        assert!(ScanError::InvalidArgument("Argument must be a string".into()).is_invalid_argument());
        assert!(!ScanError::CacheUnavailable.is_invalid_argument());
    }
}
