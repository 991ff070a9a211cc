use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{Level, event};

use super::{EntityCollection, EntitySet, ShadowCollectionAccessor, TypedCollectionAccessor};
use crate::core::{EntityObject, EntityRef, TrackingConfig};

type AccessorBuilder =
    Arc<dyn Fn(&TrackingConfig) -> Arc<dyn ShadowCollectionAccessor> + Send + Sync>;

struct Registration {
    type_name: &'static str,
    build: AccessorBuilder,
}

/// Dispatch table from a runtime element type to its monomorphized accessor.
///
/// Every type that can be the target of a collection navigation must be
/// registered before accessors are built for it.
#[derive(Default)]
pub struct AccessorRegistry {
    registrations: HashMap<TypeId, Registration>,
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self {
            registrations: HashMap::new(),
        }
    }

    /// Registers `T` as a collection element type.
    pub fn register<T: EntityObject>(&mut self) -> &mut Self {
        let build: AccessorBuilder = Arc::new(|config: &TrackingConfig| {
            let capacity = config.collection_capacity;
            let accessor = TypedCollectionAccessor::<EntitySet<T>, T>::new(
                move || EntitySet::with_capacity(capacity),
                admits::<T>,
            );
            Arc::new(accessor) as Arc<dyn ShadowCollectionAccessor>
        });

        event!(
            Level::TRACE,
            element = type_name::<T>(),
            "registered shadow collection element type"
        );
        self.registrations.insert(
            TypeId::of::<T>(),
            Registration {
                type_name: type_name::<T>(),
                build,
            },
        );
        self
    }

    pub fn is_registered(&self, type_id: TypeId) -> bool {
        self.registrations.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Sorted names of the registered element types.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names = self
            .registrations
            .values()
            .map(|registration| registration.type_name)
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Builds a fresh accessor for a registered element type.
    pub fn build(
        &self,
        type_id: TypeId,
        config: &TrackingConfig,
    ) -> Option<Arc<dyn ShadowCollectionAccessor>> {
        self.registrations
            .get(&type_id)
            .map(|registration| (registration.build)(config))
    }

    /// Accessor for targets without a runtime type. Membership is not tracked.
    pub fn untyped(config: &TrackingConfig) -> Arc<dyn ShadowCollectionAccessor> {
        let capacity = config.collection_capacity;
        Arc::new(TypedCollectionAccessor::<
            EntitySet<dyn EntityObject>,
            dyn EntityObject,
        >::new(
            move || EntitySet::with_capacity(capacity),
            |_| true,
        ))
    }
}

impl fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

fn admits<T: EntityObject>(entity: &EntityRef) -> bool {
    entity.is::<T>()
}

/// Registers each listed type as a collection element type.
///
/// ```ignore
/// register_entity_types!(registry; Order, Tag);
/// ```
#[macro_export]
macro_rules! register_entity_types {
    ($registry:expr; $($ty:ty),+ $(,)?) => {{
        let registry: &mut $crate::collection::AccessorRegistry = &mut $registry;
        $( registry.register::<$ty>(); )+
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Result, Value, member_not_found};

    #[derive(Debug)]
    struct Tag;

    impl EntityObject for Tag {
        fn read_member(&self, name: &str) -> Result<Value> {
            Err(member_not_found(self, name))
        }

        fn write_member(&self, name: &str, _value: Value) -> Result<()> {
            Err(member_not_found(self, name))
        }
    }

    #[test]
    fn test_register_and_build() {
        let mut registry = AccessorRegistry::new();
        assert!(registry.is_empty());
        crate::register_entity_types!(registry; Tag);

        assert!(registry.is_registered(TypeId::of::<Tag>()));
        assert_eq!(registry.len(), 1);

        let accessor = registry
            .build(TypeId::of::<Tag>(), &TrackingConfig::default())
            .unwrap();
        assert!(!accessor.is_target_shadow());
        assert!(accessor.element_type().ends_with("Tag"));
    }

    #[test]
    fn test_unregistered_type() {
        let registry = AccessorRegistry::new();
        assert!(
            registry
                .build(TypeId::of::<Tag>(), &TrackingConfig::default())
                .is_none()
        );
    }

    #[test]
    fn test_each_build_is_fresh() {
        let mut registry = AccessorRegistry::new();
        registry.register::<Tag>();
        let config = TrackingConfig::default();

        let first = registry.build(TypeId::of::<Tag>(), &config).unwrap();
        let second = registry.build(TypeId::of::<Tag>(), &config).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_untyped_accessor() {
        let accessor = AccessorRegistry::untyped(&TrackingConfig::default());
        assert!(accessor.is_target_shadow());
    }
}
