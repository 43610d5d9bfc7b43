//! File system entries

use crate::{Metadata, UnifiedPath};
use serde::{Deserialize, Serialize};

/// Entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// A file system entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub path: UnifiedPath,
    pub kind: EntryKind,
    pub metadata: Metadata,
}

impl Entry {
    pub fn file(path: UnifiedPath, metadata: Metadata) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            metadata,
        }
    }

    pub fn directory(path: UnifiedPath, metadata: Metadata) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            metadata,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn name(&self) -> Option<&str> {
        self.path.name()
    }

    pub fn size(&self) -> Option<u64> {
        self.metadata.size
    }
}
