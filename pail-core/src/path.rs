//! Unified path abstraction
//!
//! A path operand is either a location on the host filesystem or an
//! object-store URI (`scheme://bucket/key`). Callers operate on the two
//! through the same surface; only the documented divergence points
//! (rename atomicity, real vs synthetic directories, permission bits)
//! are allowed to care which variant they hold.

use crate::error::{PailError, PailResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Object-store address: scheme + bucket + key.
///
/// The key is a flat string; "directories" exist only as key prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectUri {
    pub scheme: String,
    pub bucket: String,
    pub key: String,
}

impl ObjectUri {
    /// Key with a trailing slash, suitable as a listing prefix.
    /// Empty for the bucket root.
    pub fn key_prefix(&self) -> String {
        if self.key.is_empty() {
            String::new()
        } else {
            format!("{}/", self.key)
        }
    }

    pub fn child(&self, name: &str) -> Self {
        let key = if self.key.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.key, name)
        };
        Self {
            scheme: self.scheme.clone(),
            bucket: self.bucket.clone(),
            key,
        }
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}://{}", self.scheme, self.bucket)
        } else {
            write!(f, "{}://{}/{}", self.scheme, self.bucket, self.key)
        }
    }
}

/// A path operand resolved to its storage domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnifiedPath {
    Local(PathBuf),
    Remote(ObjectUri),
}

impl UnifiedPath {
    /// Parse a command-line operand. Anything of the form
    /// `scheme://bucket[/key]` is remote; everything else is local.
    /// Trailing slashes are stripped (so `dir/` and `dir` resolve the
    /// same way), matching coreutils operand handling.
    pub fn parse(operand: &str) -> PailResult<Self> {
        if operand.is_empty() {
            return Err(PailError::InvalidArgument("empty path operand".into()));
        }

        if let Some((scheme, rest)) = operand.split_once("://") {
            if scheme.is_empty()
                || !scheme
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            {
                // Not a URI scheme we recognize; treat as a local path
                // (e.g. a file literally named "C://x" on unix).
                return Ok(Self::local_from(operand));
            }
            let rest = rest.trim_end_matches('/');
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            if bucket.is_empty() {
                return Err(PailError::InvalidArgument(format!(
                    "missing bucket in '{operand}'"
                )));
            }
            return Ok(Self::Remote(ObjectUri {
                scheme: scheme.to_string(),
                bucket: bucket.to_string(),
                key: key.to_string(),
            }));
        }

        Ok(Self::local_from(operand))
    }

    fn local_from(operand: &str) -> Self {
        let trimmed = if operand.len() > 1 {
            operand.trim_end_matches('/')
        } else {
            operand
        };
        Self::Local(PathBuf::from(trimmed))
    }

    pub fn from_local(path: impl AsRef<Path>) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Registry key for the backend serving this path.
    pub fn scheme(&self) -> &str {
        match self {
            Self::Local(_) => "file",
            Self::Remote(uri) => &uri.scheme,
        }
    }

    /// Append one or more path components.
    pub fn join(&self, name: &str) -> Self {
        match self {
            Self::Local(p) => Self::Local(p.join(name)),
            Self::Remote(uri) => {
                let mut child = uri.clone();
                for part in name.split('/').filter(|s| !s.is_empty()) {
                    child = child.child(part);
                }
                Self::Remote(child)
            }
        }
    }

    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Local(p) => p.parent().map(|q| Self::Local(q.to_path_buf())),
            Self::Remote(uri) => {
                if uri.key.is_empty() {
                    return None;
                }
                let key = match uri.key.rsplit_once('/') {
                    Some((head, _)) => head.to_string(),
                    None => String::new(),
                };
                Some(Self::Remote(ObjectUri {
                    scheme: uri.scheme.clone(),
                    bucket: uri.bucket.clone(),
                    key,
                }))
            }
        }
    }

    /// Final component, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Local(p) => p.file_name().and_then(|n| n.to_str()),
            Self::Remote(uri) => {
                if uri.key.is_empty() {
                    None
                } else {
                    uri.key.rsplit('/').next()
                }
            }
        }
    }

    pub fn as_local(&self) -> Option<&Path> {
        match self {
            Self::Local(p) => Some(p),
            Self::Remote(_) => None,
        }
    }

    pub fn as_remote(&self) -> Option<&ObjectUri> {
        match self {
            Self::Local(_) => None,
            Self::Remote(uri) => Some(uri),
        }
    }
}

impl fmt::Display for UnifiedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::Remote(uri) => write!(f, "{uri}"),
        }
    }
}
