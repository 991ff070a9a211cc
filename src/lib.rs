// ============================================================================
// MemoTrack Library
// ============================================================================
//
// Change-tracking core for an object mapper: entity metadata with shadow
// members, per-instance tracking entries, and type-erased accessors for
// collection navigations.
//
// ============================================================================

pub mod collection;
pub mod core;
pub mod entry;
pub mod metadata;
pub mod storage;

// Re-export main types for convenience
pub use core::{EntityObject, EntityRef, FromValue, Result, TrackError, TrackingConfig, Value};

pub use collection::{
    AccessorRegistry, CollectionRef, EntityCollection, EntitySet, ShadowCollection,
    ShadowCollectionAccessor, ShadowCollectionAccessorFactory,
};
pub use entry::{EntryKind, InternalEntityEntry};
pub use metadata::{EntityType, EntityTypeBuilder, Navigation, Property, PropertyBase, TargetType};
pub use storage::{ShadowValues, Snapshot, ValueBuffer};
