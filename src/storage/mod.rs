pub mod snapshot;
pub mod value_buffer;

pub use snapshot::{ShadowValues, Snapshot};
pub use value_buffer::ValueBuffer;
