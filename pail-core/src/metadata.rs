//! File and object metadata
//!
//! Every field a backend cannot supply is `None`. Object stores have no
//! uid/gid/mode; those must be reported absent, never invented.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub nlink: Option<u64>,
    /// Inode number where the backend has one; lets tail detect rotation.
    pub ino: Option<u64>,
    pub etag: Option<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Permission bits as the `rwxrwxrwx` triad, or the placeholder when
    /// the backend has no notion of modes.
    pub fn mode_string(&self) -> String {
        match self.mode {
            Some(m) => {
                let mut s = String::with_capacity(9);
                for shift in [6u32, 3, 0] {
                    let bits = (m >> shift) & 0o7;
                    s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
                    s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
                    s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
                }
                s
            }
            None => "?????????".to_string(),
        }
    }
}
