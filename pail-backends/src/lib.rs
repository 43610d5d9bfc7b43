//! Storage backends for pail
//!
//! Concrete `StorageBackend` implementations plus the scheme-keyed
//! registry the command layer dispatches through.

mod local;

#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalBackend;

#[cfg(feature = "s3")]
pub use s3::{S3Backend, S3Config};

use pail_core::{PailError, PailResult, StorageBackend, UnifiedPath};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of storage backends, keyed by URI scheme.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn StorageBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Registry with the stock backends: the local filesystem, and the
    /// S3-compatible store (configured from the environment) answering
    /// for the `s3` scheme.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LocalBackend::new()));
        #[cfg(feature = "s3")]
        registry.register(Arc::new(S3Backend::new("s3", S3Config::from_env())));
        registry
    }

    pub fn register(&mut self, backend: Arc<dyn StorageBackend>) {
        self.backends.insert(backend.scheme().to_string(), backend);
    }

    pub fn get(&self, scheme: &str) -> Option<Arc<dyn StorageBackend>> {
        self.backends.get(scheme).cloned()
    }

    /// Backend serving a path, or `BackendNotFound` for an unregistered
    /// scheme.
    pub fn for_path(&self, path: &UnifiedPath) -> PailResult<Arc<dyn StorageBackend>> {
        self.get(path.scheme())
            .ok_or_else(|| PailError::BackendNotFound(path.scheme().to_string()))
    }

    pub fn schemes(&self) -> Vec<&str> {
        self.backends.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_path_local() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(LocalBackend::new()));

        let path = UnifiedPath::parse("/tmp/x").unwrap();
        assert_eq!(registry.for_path(&path).unwrap().scheme(), "file");
    }

    #[test]
    fn test_for_path_unknown_scheme() {
        let registry = BackendRegistry::new();
        let path = UnifiedPath::parse("s3://bucket/key").unwrap();
        let err = registry.for_path(&path).err().unwrap();
        assert!(matches!(err, PailError::BackendNotFound(_)));
    }

    #[cfg(feature = "s3")]
    #[test]
    fn test_standard_has_both_schemes() {
        let registry = BackendRegistry::standard();
        assert!(registry.get("file").is_some());
        assert!(registry.get("s3").is_some());
    }
}
