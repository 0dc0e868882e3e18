pub mod metrics;
pub mod state;

pub use metrics::{WorkflowMetrics, WorkflowPhase};
pub use state::{StateKind, WorkflowState};
