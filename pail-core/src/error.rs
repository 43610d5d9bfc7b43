//! Error types for pail

use thiserror::Error;

/// Result type alias
pub type PailResult<T> = Result<T, PailError>;

/// Main error type
#[derive(Error, Debug)]
pub enum PailError {
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("File exists: {0}")]
    AlreadyExists(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid size: '{0}'")]
    InvalidSize(String),

    #[error("invalid date format: '{0}'")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Provider API error ({scheme}): {message}")]
    ProviderApi { scheme: String, message: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("No backend registered for scheme: {0}")]
    BackendNotFound(String),
}

impl PailError {
    /// Backend is unreachable rather than the operation being invalid.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            PailError::Network(_) | PailError::Auth(_) | PailError::ProviderApi { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PailError::NotFound(_))
            || matches!(self, PailError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_backend_unavailable() {
        assert!(PailError::Network("connection reset".into()).is_backend_unavailable());
        assert!(PailError::Auth("bad credentials".into()).is_backend_unavailable());
        assert!(PailError::ProviderApi {
            scheme: "s3".into(),
            message: "503".into()
        }
        .is_backend_unavailable());

        assert!(!PailError::NotFound("file.txt".into()).is_backend_unavailable());
        assert!(!PailError::PermissionDenied("/root".into()).is_backend_unavailable());
    }

    #[test]
    fn test_is_not_found() {
        assert!(PailError::NotFound("x".into()).is_not_found());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(PailError::Io(io).is_not_found());
        assert!(!PailError::AlreadyExists("x".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = PailError::NotFound("/path/to/file".into());
        assert_eq!(format!("{}", err), "No such file or directory: /path/to/file");

        let err = PailError::InvalidSize("1X".into());
        assert_eq!(format!("{}", err), "invalid size: '1X'");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PailError = io_err.into();
        assert!(matches!(err, PailError::Io(_)));
    }
}
