// ============================================================================
// Entry Value Storage
// ============================================================================
//
// Read/write and collection logic shared by every entry representation.
// An entry only has to say where a member lives (`locate`); everything
// else is written once against that capability.
//
// ============================================================================

use std::sync::Arc;

use tracing::{Level, event};

use crate::collection::CollectionRef;
use crate::core::{EntityRef, Result, TrackError, Value};
use crate::metadata::{EntityType, Navigation, PropertyBase};
use crate::storage::Snapshot;

/// Authoritative location of one member's value.
#[derive(Debug, Clone)]
pub enum StorageLocation {
    /// A member of the backing object.
    Object(EntityRef),
    /// A slot of the shadow value snapshot.
    Shadow(usize),
}

/// Capability every entry representation provides.
pub trait ValueStorage {
    fn entity_type(&self) -> &EntityType;

    fn entity(&self) -> Option<&EntityRef>;

    fn shadow_values(&self) -> Option<&dyn Snapshot>;

    fn shadow_values_mut(&mut self) -> Option<&mut dyn Snapshot>;

    /// Decides where `member` is stored for this entry.
    fn locate(&self, member: &dyn PropertyBase) -> Result<StorageLocation>;
}

fn no_shadow_storage<S: ValueStorage + ?Sized>(storage: &S) -> TrackError {
    TrackError::NoShadowStorage(storage.entity_type().name().to_string())
}

pub fn read_value<S: ValueStorage + ?Sized>(storage: &S, member: &dyn PropertyBase) -> Result<Value> {
    match storage.locate(member)? {
        StorageLocation::Object(entity) => entity.read_member(member.name()),
        StorageLocation::Shadow(index) => {
            let shadow_values = storage
                .shadow_values()
                .ok_or_else(|| no_shadow_storage(storage))?;
            Ok(shadow_values.get(index)?.clone())
        }
    }
}

pub fn write_value<S: ValueStorage + ?Sized>(
    storage: &mut S,
    member: &dyn PropertyBase,
    value: Value,
) -> Result<()> {
    match storage.locate(member)? {
        StorageLocation::Object(entity) => entity.write_member(member.name(), value),
        StorageLocation::Shadow(index) => match storage.shadow_values_mut() {
            Some(shadow_values) => shadow_values.set(index, value),
            None => Err(no_shadow_storage(&*storage)),
        },
    }
}

/// Returns the navigation's collection, creating and storing an empty one
/// the first time. Later calls hand back the same instance.
pub fn get_or_create_collection<S: ValueStorage + ?Sized>(
    storage: &mut S,
    navigation: &Navigation,
) -> Result<CollectionRef> {
    if let Value::Collection(collection) = read_value(&*storage, navigation)? {
        return Ok(collection);
    }

    let collection = navigation.shadow_collection_accessor()?.create();
    write_value(storage, navigation, Value::Collection(Arc::clone(&collection)))?;

    event!(
        Level::TRACE,
        entity_type = storage.entity_type().name(),
        navigation = navigation.name(),
        "materialized navigation collection"
    );
    Ok(collection)
}

pub fn collection_contains<S: ValueStorage + ?Sized>(
    storage: &mut S,
    navigation: &Navigation,
    value: Option<&EntityRef>,
) -> Result<bool> {
    let accessor = navigation.shadow_collection_accessor()?;
    let collection = get_or_create_collection(storage, navigation)?;
    accessor.contains(&collection, value)
}

pub fn add_to_collection<S: ValueStorage + ?Sized>(
    storage: &mut S,
    navigation: &Navigation,
    value: Option<&EntityRef>,
) -> Result<bool> {
    let accessor = navigation.shadow_collection_accessor()?;
    let collection = get_or_create_collection(storage, navigation)?;
    accessor.add(&collection, value)
}

pub fn add_range_to_collection<S: ValueStorage + ?Sized>(
    storage: &mut S,
    navigation: &Navigation,
    values: &[EntityRef],
) -> Result<()> {
    let accessor = navigation.shadow_collection_accessor()?;
    let collection = get_or_create_collection(storage, navigation)?;
    accessor.add_range(&collection, values)
}

pub fn remove_from_collection<S: ValueStorage + ?Sized>(
    storage: &mut S,
    navigation: &Navigation,
    value: Option<&EntityRef>,
) -> Result<bool> {
    let accessor = navigation.shadow_collection_accessor()?;
    let collection = get_or_create_collection(storage, navigation)?;
    accessor.remove(&collection, value)
}
