use std::sync::{Arc, OnceLock};

use super::{PropertyBase, TargetType};
use crate::collection::{ShadowCollectionAccessor, ShadowCollectionAccessorFactory};
use crate::core::Result;

/// A collection-valued navigation of an entity type.
#[derive(Debug)]
pub struct Navigation {
    name: String,
    target: TargetType,
    is_shadow: bool,
    shadow_index: Option<usize>,
    accessor_factory: Arc<ShadowCollectionAccessorFactory>,
    accessor: OnceLock<Arc<dyn ShadowCollectionAccessor>>,
}

impl Navigation {
    pub(crate) fn new(
        name: impl Into<String>,
        target: TargetType,
        is_shadow: bool,
        shadow_index: Option<usize>,
        accessor_factory: Arc<ShadowCollectionAccessorFactory>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            is_shadow,
            shadow_index,
            accessor_factory,
            accessor: OnceLock::new(),
        }
    }

    pub fn target_type(&self) -> &TargetType {
        &self.target
    }

    /// Accessor for this navigation's collections, built on first use and
    /// shared by every entry of the declaring type afterwards.
    pub fn shadow_collection_accessor(&self) -> Result<Arc<dyn ShadowCollectionAccessor>> {
        if let Some(accessor) = self.accessor.get() {
            return Ok(Arc::clone(accessor));
        }

        let accessor = self.accessor_factory.create(self)?;
        Ok(Arc::clone(self.accessor.get_or_init(|| accessor)))
    }
}

impl PropertyBase for Navigation {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_shadow_property(&self) -> bool {
        self.is_shadow
    }

    fn shadow_index(&self) -> Option<usize> {
        self.shadow_index
    }
}
