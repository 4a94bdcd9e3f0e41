pub mod domain;
pub mod error;
pub mod protocol;

pub use domain::OfficeStatus;
pub use error::RecordError;
pub use protocol::{StatusRecord, StoreCredentials};
