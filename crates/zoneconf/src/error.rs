//! Error types for bundle fetching.

/// Bundle fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Non-success HTTP status from the distribution endpoint.
    #[error("transport failure: HTTP {status}")]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Body snippet kept for diagnostics.
        body: String,
    },

    /// The bundle archive lacks a required entry.
    #[error("bundle entry missing: {entry}")]
    MissingEntry { entry: String },

    /// The response body is not a readable archive.
    #[error("corrupt bundle archive: {message}")]
    CorruptArchive { message: String },

    /// The detached signature does not validate against any trusted key.
    ///
    /// The payload is discarded; it is never exposed to the caller.
    #[error("signature rejected: {reason}")]
    SignatureRejected { reason: String },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Configuration error (bad key material, client construction).
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Cache eviction failure in the underlying store.
    #[error("cache error: {message}")]
    Cache { message: String },
}

impl FetchError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Config issues
            Self::Config { .. } => 1,

            // Security issues (higher priority)
            Self::MissingEntry { .. } => 4,
            Self::CorruptArchive { .. } => 4,
            Self::SignatureRejected { .. } => 4,

            // Network/transient
            Self::Transport { .. } => 5,
            Self::Network { .. } => 5,

            // Other
            Self::Cache { .. } => 6,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_errors_share_exit_code() {
        let missing = FetchError::MissingEntry {
            entry: "export.bin".to_string(),
        };
        let corrupt = FetchError::CorruptArchive {
            message: "bad header".to_string(),
        };
        let rejected = FetchError::SignatureRejected {
            reason: "tampered".to_string(),
        };

        assert_eq!(missing.exit_code(), 4);
        assert_eq!(corrupt.exit_code(), 4);
        assert_eq!(rejected.exit_code(), 4);
    }

    #[test]
    fn transport_error_keeps_status_in_message() {
        let err = FetchError::Transport {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert_eq!(err.exit_code(), 5);
    }
}
