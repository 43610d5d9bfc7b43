//! pail core
//!
//! Core traits and types for the unified local/object-store interface:
//! the path abstraction, the storage backend contract, the entry and
//! metadata model, and the GNU-style numeric/date parsers.

pub mod backend;
pub mod entry;
pub mod error;
pub mod metadata;
pub mod parse;
pub mod path;

pub use backend::{ByteRange, StorageBackend, TimeSpec, WriteMode};
pub use entry::{Entry, EntryKind};
pub use error::{PailError, PailResult};
pub use metadata::Metadata;
pub use path::{ObjectUri, UnifiedPath};
