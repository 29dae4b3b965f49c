pub mod coordinator;
pub mod error;
pub mod server;


pub use coordinator::{Coordinator, CoordinatorMetrics};
pub use error::{Result, ServerErr};
pub use server::ParameterServer;
