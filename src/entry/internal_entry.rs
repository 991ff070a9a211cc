use std::sync::Arc;

use downcast_rs::Downcast;
use tracing::{Level, event};

use super::storage::{self, StorageLocation, ValueStorage};
use crate::collection::CollectionRef;
use crate::core::{EntityRef, FromValue, Result, TrackError, Value};
use crate::metadata::{EntityType, Navigation, PropertyBase};
use crate::storage::{Snapshot, ValueBuffer};

/// Where an entry keeps its values.
#[derive(Debug)]
pub enum EntryStorage {
    /// Every member lives on the backing object.
    Full { entity: EntityRef },
    /// No backing object; every member lives in the snapshot.
    Shadow { shadow_values: Box<dyn Snapshot> },
    /// Backing object plus a snapshot for the members flagged shadow.
    Mixed {
        entity: EntityRef,
        shadow_values: Box<dyn Snapshot>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Full,
    Shadow,
    Mixed,
}

/// The unit of change tracking for one entity instance.
///
/// Entries are not synchronized; the owner serializes access to each one.
#[derive(Debug)]
pub struct InternalEntityEntry {
    entity_type: Arc<EntityType>,
    storage: EntryStorage,
}

impl InternalEntityEntry {
    /// Entry for an object whose type has no shadow members. The object is
    /// not checked against the runtime type; [`create`](Self::create) does that.
    pub fn new_full(entity_type: Arc<EntityType>, entity: EntityRef) -> Self {
        Self::from_storage(entity_type, EntryStorage::Full { entity })
    }

    /// Entry for a newly added instance of a shadow-state type.
    pub fn new_shadow(entity_type: Arc<EntityType>) -> Result<Self> {
        let shadow_values = empty_shadow_values(&entity_type)?;
        Ok(Self::from_storage(
            entity_type,
            EntryStorage::Shadow { shadow_values },
        ))
    }

    /// Entry for a shadow-state instance read from storage.
    pub fn shadow_from_buffer(entity_type: Arc<EntityType>, buffer: &ValueBuffer) -> Result<Self> {
        let shadow_values = (entity_type.get_shadow_values_factory())(buffer)?;
        Ok(Self::from_storage(
            entity_type,
            EntryStorage::Shadow { shadow_values },
        ))
    }

    /// Entry for a newly added object that also has shadow members.
    pub fn new_mixed(entity_type: Arc<EntityType>, entity: EntityRef) -> Result<Self> {
        check_backing_object(&entity_type, &entity)?;
        let shadow_values = empty_shadow_values(&entity_type)?;
        Ok(Self::from_storage(
            entity_type,
            EntryStorage::Mixed {
                entity,
                shadow_values,
            },
        ))
    }

    /// Entry for an object with shadow members read from storage.
    pub fn mixed_from_buffer(
        entity_type: Arc<EntityType>,
        entity: EntityRef,
        buffer: &ValueBuffer,
    ) -> Result<Self> {
        check_backing_object(&entity_type, &entity)?;
        let shadow_values = (entity_type.get_shadow_values_factory())(buffer)?;
        Ok(Self::from_storage(
            entity_type,
            EntryStorage::Mixed {
                entity,
                shadow_values,
            },
        ))
    }

    /// Picks the representation from the entity type and the presence of a
    /// backing object. With a buffer the shadow values are seeded from it.
    ///
    /// The object, when given, must be an instance of the type's runtime
    /// type; shadow-state types take no object at all.
    pub fn create(
        entity_type: Arc<EntityType>,
        entity: Option<EntityRef>,
        buffer: Option<&ValueBuffer>,
    ) -> Result<Self> {
        if let Some(entity) = &entity {
            check_backing_object(&entity_type, entity)?;
        }

        match (entity, buffer) {
            (None, _) if !entity_type.is_shadow_state() => Err(TrackError::NoBackingObject(
                entity_type.name().to_string(),
            )),
            (None, None) => Self::new_shadow(entity_type),
            (None, Some(buffer)) => Self::shadow_from_buffer(entity_type, buffer),
            (Some(entity), _) if !entity_type.has_shadow_members() => {
                Ok(Self::new_full(entity_type, entity))
            }
            (Some(entity), None) => Self::new_mixed(entity_type, entity),
            (Some(entity), Some(buffer)) => Self::mixed_from_buffer(entity_type, entity, buffer),
        }
    }

    fn from_storage(entity_type: Arc<EntityType>, storage: EntryStorage) -> Self {
        let entry = Self {
            entity_type,
            storage,
        };
        event!(
            Level::TRACE,
            entity_type = entry.entity_type.name(),
            kind = ?entry.kind(),
            "tracking entry created"
        );
        entry
    }

    pub fn kind(&self) -> EntryKind {
        match self.storage {
            EntryStorage::Full { .. } => EntryKind::Full,
            EntryStorage::Shadow { .. } => EntryKind::Shadow,
            EntryStorage::Mixed { .. } => EntryKind::Mixed,
        }
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    /// The backing object; `None` for shadow-only entries.
    pub fn entity(&self) -> Option<&EntityRef> {
        ValueStorage::entity(self)
    }

    pub fn shadow_values(&self) -> Option<&dyn Snapshot> {
        ValueStorage::shadow_values(self)
    }

    /// Typed read of a snapshot slot.
    pub fn read_shadow_value<T: FromValue>(&self, shadow_index: usize) -> Result<T> {
        let shadow_values = self
            .shadow_values()
            .ok_or_else(|| TrackError::NoShadowStorage(self.entity_type.name().to_string()))?;
        shadow_values.get_value(shadow_index)
    }

    /// Untyped read from wherever the member is stored.
    pub fn read_property_value(&self, property: &dyn PropertyBase) -> Result<Value> {
        storage::read_value(self, property)
    }

    /// Typed read from wherever the member is stored.
    pub fn get_current_value<T: FromValue>(&self, property: &dyn PropertyBase) -> Result<T> {
        T::from_value(&self.read_property_value(property)?)
    }

    pub fn write_property_value(&mut self, property: &dyn PropertyBase, value: impl Into<Value>) -> Result<()> {
        storage::write_value(self, property, value.into())
    }

    pub fn get_or_create_collection(&mut self, navigation: &Navigation) -> Result<CollectionRef> {
        storage::get_or_create_collection(self, navigation)
    }

    pub fn collection_contains(&mut self, navigation: &Navigation, value: &InternalEntityEntry) -> Result<bool> {
        storage::collection_contains(self, navigation, value.entity())
    }

    /// Adds `value`'s object unless already present. Returns whether it was added.
    pub fn add_to_collection(&mut self, navigation: &Navigation, value: &InternalEntityEntry) -> Result<bool> {
        storage::add_to_collection(self, navigation, value.entity())
    }

    pub fn add_range_to_collection(
        &mut self,
        navigation: &Navigation,
        values: &[&InternalEntityEntry],
    ) -> Result<()> {
        let entities: Vec<EntityRef> = values
            .iter()
            .filter_map(|entry| entry.entity().cloned())
            .collect();
        storage::add_range_to_collection(self, navigation, &entities)
    }

    /// Removes `value`'s object if present; absent objects are ignored.
    pub fn remove_from_collection(&mut self, navigation: &Navigation, value: &InternalEntityEntry) -> Result<bool> {
        storage::remove_from_collection(self, navigation, value.entity())
    }

    // Object-keyed forms of the collection operations. Needed when the
    // candidate is this entry itself, e.g. a self-referencing navigation.

    pub fn collection_contains_entity(&mut self, navigation: &Navigation, value: Option<&EntityRef>) -> Result<bool> {
        storage::collection_contains(self, navigation, value)
    }

    pub fn add_entity_to_collection(&mut self, navigation: &Navigation, value: Option<&EntityRef>) -> Result<bool> {
        storage::add_to_collection(self, navigation, value)
    }

    pub fn remove_entity_from_collection(&mut self, navigation: &Navigation, value: Option<&EntityRef>) -> Result<bool> {
        storage::remove_from_collection(self, navigation, value)
    }
}

impl ValueStorage for InternalEntityEntry {
    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn entity(&self) -> Option<&EntityRef> {
        match &self.storage {
            EntryStorage::Full { entity } | EntryStorage::Mixed { entity, .. } => Some(entity),
            EntryStorage::Shadow { .. } => None,
        }
    }

    fn shadow_values(&self) -> Option<&dyn Snapshot> {
        match &self.storage {
            EntryStorage::Shadow { shadow_values } | EntryStorage::Mixed { shadow_values, .. } => {
                Some(&**shadow_values)
            }
            EntryStorage::Full { .. } => None,
        }
    }

    fn shadow_values_mut(&mut self) -> Option<&mut dyn Snapshot> {
        match &mut self.storage {
            EntryStorage::Shadow { shadow_values } | EntryStorage::Mixed { shadow_values, .. } => {
                Some(&mut **shadow_values)
            }
            EntryStorage::Full { .. } => None,
        }
    }

    fn locate(&self, member: &dyn PropertyBase) -> Result<StorageLocation> {
        match &self.storage {
            EntryStorage::Full { entity } => {
                if member.is_shadow_property() {
                    Err(TrackError::NoShadowStorage(self.entity_type.name().to_string()))
                } else {
                    Ok(StorageLocation::Object(Arc::clone(entity)))
                }
            }
            EntryStorage::Shadow { .. } => Ok(StorageLocation::Shadow(member.get_shadow_index()?)),
            EntryStorage::Mixed { entity, .. } => {
                if member.is_shadow_property() {
                    Ok(StorageLocation::Shadow(member.get_shadow_index()?))
                } else {
                    Ok(StorageLocation::Object(Arc::clone(entity)))
                }
            }
        }
    }
}

fn check_backing_object(entity_type: &EntityType, entity: &EntityRef) -> Result<()> {
    let Some(clr_type) = entity_type.clr_type() else {
        return Err(TrackError::UnexpectedBackingObject(entity_type.name().to_string()));
    };
    if Downcast::as_any(&**entity).type_id() != clr_type.id() {
        return Err(TrackError::BackingObjectMismatch {
            entity_type: entity_type.name().to_string(),
            expected: clr_type.name().to_string(),
            actual: entity.type_name().to_string(),
        });
    }
    Ok(())
}

fn empty_shadow_values(entity_type: &EntityType) -> Result<Box<dyn Snapshot>> {
    let mut shadow_values = (entity_type.get_empty_shadow_values_factory())();
    for member in entity_type.shadow_members() {
        shadow_values.mark_not_set(member.get_shadow_index()?)?;
    }
    Ok(shadow_values)
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;

    use super::*;
    use crate::collection::ShadowCollectionAccessorFactory;
    use crate::core::{EntityObject, member_not_found};
    use crate::metadata::EntityTypeBuilder;

    #[derive(Debug)]
    struct Account {
        balance: RwLock<i64>,
    }

    impl EntityObject for Account {
        fn read_member(&self, name: &str) -> Result<Value> {
            match name {
                "Balance" => Ok(Value::Integer(*self.balance.read()?)),
                _ => Err(member_not_found(self, name)),
            }
        }

        fn write_member(&self, name: &str, value: Value) -> Result<()> {
            match name {
                "Balance" => *self.balance.write()? = value.get()?,
                _ => return Err(member_not_found(self, name)),
            }
            Ok(())
        }
    }

    fn account() -> EntityRef {
        Arc::new(Account {
            balance: RwLock::new(100),
        })
    }

    fn account_type(with_shadow: bool) -> Arc<EntityType> {
        let factory = Arc::new(ShadowCollectionAccessorFactory::default());
        let mut builder = EntityTypeBuilder::new("Account")
            .clr_type::<Account>()
            .property("Balance");
        if with_shadow {
            builder = builder.shadow_property("Version");
        }
        builder.build(&factory).unwrap()
    }

    #[test]
    fn test_create_picks_representation() {
        let full = InternalEntityEntry::create(account_type(false), Some(account()), None).unwrap();
        assert_eq!(full.kind(), EntryKind::Full);
        assert!(full.shadow_values().is_none());

        let mixed = InternalEntityEntry::create(account_type(true), Some(account()), None).unwrap();
        assert_eq!(mixed.kind(), EntryKind::Mixed);
        assert_eq!(mixed.shadow_values().unwrap().len(), 1);
    }

    #[test]
    fn test_mixed_routes_by_shadow_flag() {
        let entity_type = account_type(true);
        let mut entry =
            InternalEntityEntry::create(Arc::clone(&entity_type), Some(account()), None).unwrap();
        let balance = entity_type.property("Balance").unwrap();
        let version = entity_type.property("Version").unwrap();

        assert!(matches!(
            entry.locate(balance).unwrap(),
            StorageLocation::Object(_)
        ));
        assert!(matches!(
            entry.locate(version).unwrap(),
            StorageLocation::Shadow(0)
        ));

        entry.write_property_value(version, 3).unwrap();
        entry.write_property_value(balance, 250).unwrap();

        assert_eq!(entry.read_shadow_value::<i64>(0).unwrap(), 3);
        assert_eq!(entry.get_current_value::<i64>(balance).unwrap(), 250);
        assert_eq!(
            entry.entity().unwrap().read_member("Balance").unwrap(),
            Value::Integer(250)
        );
    }

    #[test]
    fn test_full_entry_rejects_shadow_member() {
        let shadow_type = account_type(true);
        let entry = InternalEntityEntry::new_full(account_type(false), account());
        let version = shadow_type.property("Version").unwrap();

        assert!(matches!(
            entry.read_property_value(version),
            Err(TrackError::NoShadowStorage(_))
        ));
    }
}
