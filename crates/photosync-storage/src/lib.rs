//! Storage for PhotoSync
//!
//! Files are laid out as
//! `<root>/<YYYY-MM-DD>/<Category>/<YYYYMMDD_HHMMSS>_<name>[_<n>].<ext>`.
//! A stored file is never overwritten: name collisions get a numeric suffix and
//! the final name is claimed with an exclusive, atomic create.

pub mod last_saved;
pub mod local;
pub mod naming;
mod stats;
pub mod traits;

pub use last_saved::{last_saved_state, LastSavedReader, LastSavedWriter};
pub use local::LocalStorage;
pub use traits::{MediaStore, StorageError, StorageResult};
