//! Index error types.
//!
//! Classification outcomes such as "ignored", "excluded" or "not under any
//! root" are values of [`DirectoryInfo`](crate::index::DirectoryInfo), never
//! errors. Only building a generation and consistency checks can fail.

use thiserror::Error;

use crate::model::ProviderError;

/// Errors raised by the root index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A declaration provider failed while a generation was being built.
    #[error("Failed to build root index: {0}")]
    Provider(#[from] ProviderError),

    /// Registered roots no longer refer to live tree entries.
    #[error("Root index is inconsistent: {} stale root(s): {}", .stale.len(), .stale.join(", "))]
    Inconsistent { stale: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_conversion() {
        let err: IndexError = ProviderError::Units("disk gone".to_string()).into();
        assert!(matches!(err, IndexError::Provider(_)));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_inconsistent_display() {
        let err = IndexError::Inconsistent {
            stale: vec!["#7".to_string(), "#9".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Root index is inconsistent: 2 stale root(s): #7, #9"
        );
    }
}
