use crate::core::{Result, TrackError, Value};

/// One materialized storage row, addressed by column position.
///
/// Only consumed while seeding a snapshot for a freshly loaded entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueBuffer {
    values: Vec<Value>,
}

impl ValueBuffer {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or(TrackError::ValueBufferIndex {
            index,
            len: self.values.len(),
        })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl From<Vec<Value>> for ValueBuffer {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_access() {
        let buffer = ValueBuffer::from(vec![Value::Integer(1), Value::from("a")]);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.get(1).unwrap(), &Value::from("a"));
    }

    #[test]
    fn test_out_of_range() {
        let buffer = ValueBuffer::default();
        assert!(buffer.is_empty());
        assert!(matches!(
            buffer.get(0),
            Err(TrackError::ValueBufferIndex { index: 0, len: 0 })
        ));
    }
}
