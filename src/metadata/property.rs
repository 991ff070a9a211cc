use super::PropertyBase;

/// A scalar property of an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    index: usize,
    is_shadow: bool,
    shadow_index: Option<usize>,
}

impl Property {
    pub(crate) fn new(
        name: impl Into<String>,
        index: usize,
        is_shadow: bool,
        shadow_index: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            is_shadow,
            shadow_index,
        }
    }

    /// Position of this property in a materialized value buffer.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PropertyBase for Property {
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
