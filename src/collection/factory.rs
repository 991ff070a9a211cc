use std::sync::Arc;

use tracing::{Level, event};

use super::{AccessorRegistry, ShadowCollectionAccessor};
use crate::core::{Result, TrackError, TrackingConfig};
use crate::metadata::{Navigation, PropertyBase};

/// Builds shadow collection accessors for navigations.
///
/// No caching happens here; each call produces a fresh accessor. Navigations
/// cache the accessor they were given.
#[derive(Debug, Default)]
pub struct ShadowCollectionAccessorFactory {
    registry: AccessorRegistry,
    config: TrackingConfig,
}

impl ShadowCollectionAccessorFactory {
    pub fn new(registry: AccessorRegistry, config: TrackingConfig) -> Self {
        Self { registry, config }
    }

    pub fn with_registry(registry: AccessorRegistry) -> Self {
        Self::new(registry, TrackingConfig::default())
    }

    pub fn registry(&self) -> &AccessorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Selects the element type from the navigation's target and builds a
    /// set-backed accessor for it.
    ///
    /// A target without a runtime type yields the untyped (shadow-shadow)
    /// accessor. A runtime type that was never registered is a model error,
    /// unless `strict_element_types` is off.
    pub fn create(&self, navigation: &Navigation) -> Result<Arc<dyn ShadowCollectionAccessor>> {
        let target = navigation.target_type();

        let accessor = match target.clr_type() {
            None => AccessorRegistry::untyped(&self.config),
            Some(clr_type) => match self.registry.build(clr_type.id(), &self.config) {
                Some(accessor) => accessor,
                None if self.config.strict_element_types => {
                    return Err(TrackError::UnsupportedElementType(format!(
                        "{} (target of navigation '{}')",
                        clr_type.name(),
                        navigation.name()
                    )));
                }
                None => {
                    event!(
                        Level::WARN,
                        navigation = navigation.name(),
                        element = clr_type.name(),
                        "element type not registered, membership will not be tracked"
                    );
                    AccessorRegistry::untyped(&self.config)
                }
            },
        };

        event!(
            Level::DEBUG,
            navigation = navigation.name(),
            target = target.name(),
            element = accessor.element_type(),
            target_shadow = accessor.is_target_shadow(),
            "built shadow collection accessor"
        );
        Ok(accessor)
    }
}
