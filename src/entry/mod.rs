// ============================================================================
// Entity Entries
// ============================================================================
//
// An entry pairs an entity type with the storage for one instance's values:
// the backing object, a shadow snapshot, or both.
//
// ============================================================================

pub mod internal_entry;
pub mod storage;

pub use internal_entry::{EntryKind, EntryStorage, InternalEntityEntry};
pub use storage::{StorageLocation, ValueStorage};
