pub mod config;
pub mod core;
pub mod decode;
pub mod engine;
pub mod observability;
pub mod resilience;
pub mod sim;
pub mod sinks;
pub mod transport;
pub mod visualization;

pub use config::PipelineConfig;
pub use engine::{EndReason, Session, SessionHandle, SessionSummary};
