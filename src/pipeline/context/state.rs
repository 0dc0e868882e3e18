use std::fmt;

use crate::pipeline::domain::AnalysisResult;

/// Where a single submission currently is in the prepare → classify flow.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Preparing,
    Analyzing,
    Success(AnalysisResult),
    Error,
}

/// Payload-free discriminant of [`WorkflowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Preparing,
    Analyzing,
    Success,
    Error,
}

impl StateKind {
    pub fn state_name(&self) -> &'static str {
        match self {
            StateKind::Preparing => "Preparing",
            StateKind::Analyzing => "Analyzing",
            StateKind::Success => "Success",
            StateKind::Error => "Error",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state_name())
    }
}

impl WorkflowState {
    pub fn kind(&self) -> StateKind {
        match self {
            WorkflowState::Preparing => StateKind::Preparing,
            WorkflowState::Analyzing => StateKind::Analyzing,
            WorkflowState::Success(_) => StateKind::Success,
            WorkflowState::Error => StateKind::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Success(_) | WorkflowState::Error)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            WorkflowState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// `Error → Preparing` is only reachable through an explicit retry.
    pub fn can_transition_to(&self, next: &WorkflowState) -> bool {
        matches!(
            (self.kind(), next.kind()),
            (StateKind::Preparing, StateKind::Analyzing)
                | (StateKind::Preparing, StateKind::Error)
                | (StateKind::Analyzing, StateKind::Success)
                | (StateKind::Analyzing, StateKind::Error)
                | (StateKind::Error, StateKind::Preparing)
        )
    }
}
