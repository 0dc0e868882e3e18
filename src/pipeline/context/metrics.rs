use indexmap::IndexMap;
use std::time::Duration;

/// Which collaborator a phase is delegated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowPhase {
    Preparation,
    Classification,
}

impl WorkflowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Preparation => "Preparation",
            WorkflowPhase::Classification => "Classification",
        }
    }
}

/// Timing collected while driving a submission
#[derive(Debug, Clone, Default)]
pub struct WorkflowMetrics {
    attempts: u32,
    /// Phase durations of the latest attempt, in execution order
    phase_durations: IndexMap<WorkflowPhase, Duration>,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, forgetting the previous attempt's timings
    pub fn begin_attempt(&mut self) {
        self.attempts += 1;
        self.phase_durations.clear();
    }

    pub fn record_phase(&mut self, phase: WorkflowPhase, duration: Duration) {
        self.phase_durations.insert(phase, duration);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn phase_duration(&self, phase: WorkflowPhase) -> Option<Duration> {
        self.phase_durations.get(&phase).copied()
    }

    pub fn completed_phases(&self) -> Vec<WorkflowPhase> {
        self.phase_durations.keys().copied().collect()
    }

    pub fn total_duration(&self) -> Duration {
        self.phase_durations.values().sum()
    }
}
