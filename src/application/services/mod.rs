mod index_sync;
mod qa;

pub use index_sync::IndexSync;
pub use qa::{QaAnswer, QaService, NO_RESULTS_ANSWER, SERVICE_FAILURE_ANSWER};
