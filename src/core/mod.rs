pub mod config;
pub mod error;
pub mod object;
pub mod value;

pub use config::TrackingConfig;
pub use error::{Result, TrackError};
pub use object::{EntityObject, EntityRef, entity_address, member_not_found};
pub use value::{FromValue, Value};
