// ============================================================================
// Entity Metadata
// ============================================================================
//
// The narrow slice of the model the change-tracking core reads: which
// members are shadow, which snapshot slot each one occupies, where each
// property sits in a materialized row, and what a navigation points at.
//
// ============================================================================

pub mod entity_type;
pub mod navigation;
pub mod property;

use std::any::{TypeId, type_name};
use std::fmt;

use crate::core::{EntityObject, Result, TrackError};

pub use entity_type::{EmptyShadowValuesFactory, EntityType, EntityTypeBuilder, ShadowValuesFactory};
pub use navigation::Navigation;
pub use property::Property;

/// Runtime type of a mapped object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClrType {
    id: TypeId,
    name: &'static str,
}

impl ClrType {
    pub fn of<T: EntityObject>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// What a navigation points at: an entity type name and, when known, its
/// runtime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetType {
    name: String,
    clr_type: Option<ClrType>,
}

impl TargetType {
    /// Target backed by runtime type `T`.
    pub fn of<T: EntityObject>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clr_type: Some(ClrType::of::<T>()),
        }
    }

    /// Target with no runtime type (a shadow-state entity type).
    pub fn shadow(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clr_type: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clr_type(&self) -> Option<ClrType> {
        self.clr_type
    }
}

/// Common view over properties and navigations.
pub trait PropertyBase: fmt::Debug {
    fn name(&self) -> &str;

    /// True when the member has no field on the backing object.
    fn is_shadow_property(&self) -> bool;

    /// Slot in the shadow value snapshot, if one was assigned.
    fn shadow_index(&self) -> Option<usize>;

    fn get_shadow_index(&self) -> Result<usize> {
        self.shadow_index()
            .ok_or_else(|| TrackError::MissingShadowIndex(self.name().to_string()))
    }
}
