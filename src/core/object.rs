use std::fmt;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};

use crate::core::{Result, TrackError, Value};

/// A real, application-owned object backing an entity entry.
///
/// Members are addressed by name. Implementors hold their state behind
/// interior mutability, since the same object is shared between its entry
/// and every collection it is a member of.
pub trait EntityObject: DowncastSync + fmt::Debug {
    /// Name of the runtime type, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Reads a mapped member (property or navigation) from the object.
    fn read_member(&self, name: &str) -> Result<Value>;

    /// Writes a mapped member (property or navigation) on the object.
    fn write_member(&self, name: &str, value: Value) -> Result<()>;
}
impl_downcast!(sync EntityObject);

/// Shared handle to a backing object. Identity is the allocation address.
pub type EntityRef = Arc<dyn EntityObject>;

/// Builds the error returned for a member an object does not map.
pub fn member_not_found(object: &dyn EntityObject, name: &str) -> TrackError {
    TrackError::MemberNotFound(name.to_string(), object.type_name().to_string())
}

/// Address used for identity comparisons of backing objects.
pub fn entity_address(entity: &EntityRef) -> *const () {
    Arc::as_ptr(entity) as *const ()
}
