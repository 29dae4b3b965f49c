pub mod spec;
pub mod topology;

pub use spec::TopologySpec;
pub use topology::{TopologyReport, launch};
