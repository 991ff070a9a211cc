use std::any::type_name;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use super::ShadowCollection;
use crate::core::{EntityObject, EntityRef, entity_address};

/// Operations the typed accessor needs from a collection representation.
pub trait EntityCollection: ShadowCollection + Sized {
    fn with_capacity(capacity: usize) -> Self;

    fn contains(&self, entity: &EntityRef) -> bool;

    /// Returns `false` when the object was already present.
    fn insert(&mut self, entity: EntityRef) -> bool;

    /// Returns `false` when the object was absent.
    fn remove(&mut self, entity: &EntityRef) -> bool;
}

#[derive(Clone)]
struct EntityKey(EntityRef);

impl PartialEq for EntityKey {
    fn eq(&self, other: &Self) -> bool {
        entity_address(&self.0) == entity_address(&other.0)
    }
}

impl Eq for EntityKey {}

impl Hash for EntityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        entity_address(&self.0).hash(state);
    }
}

/// Unordered set of backing objects keyed by identity.
///
/// `T` is the element type the set was created for; `dyn EntityObject`
/// when the navigation target has no runtime type.
pub struct EntitySet<T: ?Sized + 'static> {
    items: HashSet<EntityKey>,
    _element: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + 'static> EntitySet<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.items.iter().map(|key| &key.0)
    }
}

impl<T: EntityObject> EntitySet<T> {
    /// Members downcast to the element type.
    pub fn typed(&self) -> Vec<Arc<T>> {
        self.iter()
            .filter_map(|entity| Arc::clone(entity).downcast_arc::<T>().ok())
            .collect()
    }
}

impl<T: ?Sized + 'static> Default for EntitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> fmt::Debug for EntitySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySet")
            .field("element", &type_name::<T>())
            .field("len", &self.items.len())
            .finish()
    }
}

impl<T: ?Sized + 'static> ShadowCollection for EntitySet<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn contains_entity(&self, entity: &EntityRef) -> bool {
        self.items.contains(&EntityKey(Arc::clone(entity)))
    }

    fn entities(&self) -> Vec<EntityRef> {
        self.iter().cloned().collect()
    }
}

impl<T: ?Sized + 'static> EntityCollection for EntitySet<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: HashSet::with_capacity(capacity),
            _element: PhantomData,
        }
    }

    fn contains(&self, entity: &EntityRef) -> bool {
        self.contains_entity(entity)
    }

    fn insert(&mut self, entity: EntityRef) -> bool {
        self.items.insert(EntityKey(entity))
    }

    fn remove(&mut self, entity: &EntityRef) -> bool {
        self.items.remove(&EntityKey(Arc::clone(entity)))
    }
}
