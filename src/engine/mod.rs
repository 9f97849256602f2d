pub mod aggregator;
pub mod scheduler;
pub mod session;
pub mod state;

pub use aggregator::{ClassificationAggregator, ClassificationTally, ConfidenceBar, HistoryEntry};
pub use scheduler::{FrameOutcome, FrameRequest, RenderScheduler, RenderState};
pub use session::{EventOutcome, Session, SessionHandle, SessionSummary};
pub use state::{EndReason, SessionState};
