// ============================================================================
// Shadow Value Snapshots
// ============================================================================
//
// Fixed-length, slot-addressed value storage for the members of an entry
// that have no field on a backing object. The slot count and the meaning
// of each slot come from the entity type's shadow index layout.
//
// ============================================================================

use std::fmt;

use crate::core::{FromValue, Result, TrackError, Value};

static NOT_SET: Value = Value::Null;

/// Indexed bag of untyped values owned by a single entry.
///
/// Slots start out "not set" and read as `Value::Null` until written.
pub trait Snapshot: fmt::Debug + Send + Sync {
    /// Number of addressable slots; fixed for the snapshot's lifetime.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Untyped read of a slot.
    fn get(&self, index: usize) -> Result<&Value>;

    /// Untyped write of a slot; marks it set.
    fn set(&mut self, index: usize, value: Value) -> Result<()>;

    /// Whether the slot has been written since creation.
    fn is_set(&self, index: usize) -> Result<bool>;

    /// Resets a slot to the "not set" state.
    fn mark_not_set(&mut self, index: usize) -> Result<()>;

    /// Positional copy of every slot.
    fn values(&self) -> Vec<Value>;
}

impl<'a> dyn Snapshot + 'a {
    /// Typed read of a slot. Fails with `TypeMismatch` when the stored value
    /// does not convert to `T`.
    pub fn get_value<T: FromValue>(&self, index: usize) -> Result<T> {
        T::from_value(self.get(index)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    NotSet,
    Set(Value),
}

/// Default snapshot implementation backed by a persistent vector, so
/// [`ShadowValues::fork`] is O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowValues {
    slots: im::Vector<Slot>,
}

impl ShadowValues {
    /// Snapshot with `len` slots, all "not set".
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| Slot::NotSet).collect(),
        }
    }

    /// Copy of this snapshot sharing structure with the original.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(TrackError::ShadowIndexOutOfRange {
                index,
                len: self.slots.len(),
            })
        }
    }
}

impl Snapshot for ShadowValues {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn get(&self, index: usize) -> Result<&Value> {
        self.check(index)?;
        match &self.slots[index] {
            Slot::NotSet => Ok(&NOT_SET),
            Slot::Set(value) => Ok(value),
        }
    }

    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        self.check(index)?;
        self.slots.set(index, Slot::Set(value));
        Ok(())
    }

    fn is_set(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(matches!(self.slots[index], Slot::Set(_)))
    }

    fn mark_not_set(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.slots.set(index, Slot::NotSet);
        Ok(())
    }

    fn values(&self) -> Vec<Value> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::NotSet => Value::Null,
                Slot::Set(value) => value.clone(),
            })
            .collect()
    }
}
