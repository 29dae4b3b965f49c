pub mod config;
pub mod error;
pub mod metrics;
pub mod session;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{Result, WorkerErr};
pub use metrics::{WorkerMetrics, WorkerReport};
pub use session::{Schedule, SessionState, WorkerSession};
pub use worker::Worker;
