pub mod entities;
pub mod errors;
pub mod ports;
pub mod sync;

pub use entities::*;
pub use errors::{DomainError, Result};
pub use sync::{FailurePolicy, IdPolicy, SyncConfig};
