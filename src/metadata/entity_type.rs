use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::{ClrType, Navigation, Property, PropertyBase, TargetType};
use crate::collection::ShadowCollectionAccessorFactory;
use crate::core::{EntityObject, Result, TrackError};
use crate::storage::{ShadowValues, Snapshot, ValueBuffer};

pub type EmptyShadowValuesFactory = Arc<dyn Fn() -> Box<dyn Snapshot> + Send + Sync>;
pub type ShadowValuesFactory =
    Arc<dyn Fn(&ValueBuffer) -> Result<Box<dyn Snapshot>> + Send + Sync>;

/// A mapped entity type.
///
/// Shadow indexes are dense: shadow properties take slots `0..p`, shadow
/// navigations follow. They are fixed once the type is built.
pub struct EntityType {
    name: String,
    clr_type: Option<ClrType>,
    properties: Vec<Property>,
    navigations: Vec<Navigation>,
    shadow_count: usize,
    empty_shadow_values_factory: EmptyShadowValuesFactory,
    shadow_values_factory: ShadowValuesFactory,
}

impl EntityType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clr_type(&self) -> Option<ClrType> {
        self.clr_type
    }

    /// True when instances have no backing object at all.
    pub fn is_shadow_state(&self) -> bool {
        self.clr_type.is_none()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    /// Number of snapshot slots an entry of this type needs.
    pub fn shadow_count(&self) -> usize {
        self.shadow_count
    }

    pub fn has_shadow_members(&self) -> bool {
        self.shadow_count > 0
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn property(&self, name: &str) -> Result<&Property> {
        self.find_property(name)
            .ok_or_else(|| TrackError::MemberNotFound(name.to_string(), self.name.clone()))
    }

    pub fn find_navigation(&self, name: &str) -> Option<&Navigation> {
        self.navigations.iter().find(|n| n.name() == name)
    }

    pub fn navigation(&self, name: &str) -> Result<&Navigation> {
        self.find_navigation(name)
            .ok_or_else(|| TrackError::MemberNotFound(name.to_string(), self.name.clone()))
    }

    /// Every shadow member, in slot order.
    pub fn shadow_members(&self) -> Vec<&dyn PropertyBase> {
        let mut members: Vec<&dyn PropertyBase> = self
            .properties
            .iter()
            .map(|p| p as &dyn PropertyBase)
            .chain(self.navigations.iter().map(|n| n as &dyn PropertyBase))
            .filter(|m| m.is_shadow_property())
            .collect();
        members.sort_by_key(|m| m.shadow_index());
        members
    }

    /// Factory for the snapshot of a newly added instance.
    pub fn get_empty_shadow_values_factory(&self) -> EmptyShadowValuesFactory {
        Arc::clone(&self.empty_shadow_values_factory)
    }

    /// Factory for the snapshot of an instance materialized from a row.
    pub fn get_shadow_values_factory(&self) -> ShadowValuesFactory {
        Arc::clone(&self.shadow_values_factory)
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("clr_type", &self.clr_type)
            .field("properties", &self.properties)
            .field("navigations", &self.navigations)
            .field("shadow_count", &self.shadow_count)
            .finish()
    }
}

/// Declares an entity type's members and assigns their indexes.
#[derive(Debug, Clone)]
pub struct EntityTypeBuilder {
    name: String,
    clr_type: Option<ClrType>,
    properties: Vec<(String, bool)>,
    navigations: Vec<(String, TargetType, bool)>,
}

impl EntityTypeBuilder {
    /// Starts a shadow-state type; call [`clr_type`](Self::clr_type) to
    /// back it with a runtime type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clr_type: None,
            properties: Vec::new(),
            navigations: Vec::new(),
        }
    }

    pub fn clr_type<T: EntityObject>(mut self) -> Self {
        self.clr_type = Some(ClrType::of::<T>());
        self
    }

    /// A property stored on the backing object.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push((name.into(), false));
        self
    }

    /// A property stored in the shadow snapshot.
    pub fn shadow_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push((name.into(), true));
        self
    }

    /// A collection navigation stored on the backing object.
    pub fn navigation(mut self, name: impl Into<String>, target: TargetType) -> Self {
        self.navigations.push((name.into(), target, false));
        self
    }

    /// A collection navigation stored in the shadow snapshot.
    pub fn shadow_navigation(mut self, name: impl Into<String>, target: TargetType) -> Self {
        self.navigations.push((name.into(), target, true));
        self
    }

    pub fn build(self, accessor_factory: &Arc<ShadowCollectionAccessorFactory>) -> Result<Arc<EntityType>> {
        let mut seen = HashSet::new();
        let names = self
            .properties
            .iter()
            .map(|(name, _)| name)
            .chain(self.navigations.iter().map(|(name, _, _)| name));
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(TrackError::InvalidModel(format!(
                    "duplicate member '{}' on entity type '{}'",
                    name, self.name
                )));
            }
        }

        // Shadow-state types have nowhere else to keep their members.
        let all_shadow = self.clr_type.is_none();
        let mut next_slot = 0;

        let mut properties = Vec::with_capacity(self.properties.len());
        let mut buffer_layout = Vec::new();
        for (index, (name, shadow)) in self.properties.into_iter().enumerate() {
            let is_shadow = shadow || all_shadow;
            let shadow_index = is_shadow.then(|| {
                let slot = next_slot;
                next_slot += 1;
                slot
            });
            if let Some(slot) = shadow_index {
                buffer_layout.push((index, slot));
            }
            properties.push(Property::new(name, index, is_shadow, shadow_index));
        }

        let mut navigations = Vec::with_capacity(self.navigations.len());
        for (name, target, shadow) in self.navigations {
            let is_shadow = shadow || all_shadow;
            let shadow_index = is_shadow.then(|| {
                let slot = next_slot;
                next_slot += 1;
                slot
            });
            navigations.push(Navigation::new(
                name,
                target,
                is_shadow,
                shadow_index,
                Arc::clone(accessor_factory),
            ));
        }

        let shadow_count = next_slot;
        let empty_shadow_values_factory: EmptyShadowValuesFactory =
            Arc::new(move || Box::new(ShadowValues::with_len(shadow_count)) as Box<dyn Snapshot>);
        let shadow_values_factory: ShadowValuesFactory = Arc::new(move |buffer: &ValueBuffer| {
            let mut values = ShadowValues::with_len(shadow_count);
            for &(position, slot) in &buffer_layout {
                values.set(slot, buffer.get(position)?.clone())?;
            }
            Ok(Box::new(values) as Box<dyn Snapshot>)
        });

        Ok(Arc::new(EntityType {
            name: self.name,
            clr_type: self.clr_type,
            properties,
            navigations,
            shadow_count,
            empty_shadow_values_factory,
            shadow_values_factory,
        }))
    }
}
