// ============================================================================
// Shadow Collections
// ============================================================================
//
// Collection-valued navigations that have no typed field to live in are
// stored as type-erased collections. The element type is only known at
// runtime, from the navigation's target; accessors are monomorphized per
// registered element type and dispatched through `ShadowCollectionAccessor`.
//
// ============================================================================

pub mod accessor;
pub mod entity_set;
pub mod factory;
pub mod registry;

use std::fmt;
use std::sync::{Arc, RwLock};

use downcast_rs::{DowncastSync, impl_downcast};

use crate::core::EntityRef;

pub use accessor::{ShadowCollectionAccessor, TypedCollectionAccessor};
pub use entity_set::{EntityCollection, EntitySet};
pub use factory::ShadowCollectionAccessorFactory;
pub use registry::AccessorRegistry;

/// Type-erased view of a navigation collection.
pub trait ShadowCollection: DowncastSync + fmt::Debug {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the collection holds this exact object.
    fn contains_entity(&self, entity: &EntityRef) -> bool;

    /// Members in unspecified order.
    fn entities(&self) -> Vec<EntityRef>;
}
impl_downcast!(sync ShadowCollection);

/// Shared handle to a materialized collection. The snapshot slot (or object
/// member) holding it stays the canonical location.
pub type CollectionRef = Arc<RwLock<dyn ShadowCollection>>;
