pub mod buffer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod relay;
pub mod service;

pub use buffer::{AggKey, AggregationBuffer, Progress};
pub use config::RelayConfig;
pub use error::{AggregationErr, RelayErr, Result};
pub use metrics::RelayMetrics;
pub use relay::{Flow, Outgoing, Relay};
pub use service::{Batch, RelayService};
