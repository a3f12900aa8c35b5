//! Error types shared across LinkCard crates.

/// Top-level error type for LinkCard operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkcardError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    /// Device access was denied or no matching device exists.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using LinkcardError.
pub type LinkcardResult<T> = Result<T, LinkcardError>;

impl LinkcardError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error came from the device permission boundary.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_format_messages() {
        let err = LinkcardError::permission_denied("camera blocked");
        assert_eq!(err.to_string(), "Permission denied: camera blocked");
        assert!(err.is_permission_denied());
        assert!(!LinkcardError::capture("x").is_permission_denied());
    }
}
