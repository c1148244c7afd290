pub mod analysis;
pub mod execution;

pub use analysis::{AnalysisRecord, SessionStats};
pub use execution::{Execution, ExecutionState, ExecutionStatus, TaskRun};
