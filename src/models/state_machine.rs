// Workflow stage state machine with validation

use super::WorkflowStage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageTransitionError {
    #[error("Invalid stage transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: WorkflowStage,
        to: WorkflowStage,
    },

    #[error("Workflow already in terminal stage: {0:?}")]
    AlreadyTerminal(WorkflowStage),
}

/// Validates if the workflow can move from one stage to another
pub fn can_transition(from: WorkflowStage, to: WorkflowStage) -> bool {
    match (from, to) {
        (WorkflowStage::Configuring, WorkflowStage::GeneratingPersonas) => true,

        // Straight to synthesis when there is nothing to interview
        (WorkflowStage::GeneratingPersonas, WorkflowStage::Interviewing) => true,
        (WorkflowStage::GeneratingPersonas, WorkflowStage::Synthesizing) => true,

        // The only self-loop in the pipeline
        (WorkflowStage::Interviewing, WorkflowStage::Interviewing) => true,
        (WorkflowStage::Interviewing, WorkflowStage::Synthesizing) => true,

        (WorkflowStage::Synthesizing, WorkflowStage::Done) => true,

        _ => false,
    }
}

/// Validates and performs a stage transition
pub fn transition_stage(
    current: WorkflowStage,
    target: WorkflowStage,
) -> Result<WorkflowStage, StageTransitionError> {
    if is_terminal_stage(current) {
        return Err(StageTransitionError::AlreadyTerminal(current));
    }

    if !can_transition(current, target) {
        return Err(StageTransitionError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    Ok(target)
}

/// Check if a stage is terminal
pub fn is_terminal_stage(stage: WorkflowStage) -> bool {
    matches!(stage, WorkflowStage::Done)
}

/// Successor of a stage that does not depend on run state.
///
/// `None` for `GeneratingPersonas` and `Interviewing`, whose successor the
/// interview router picks, and for `Done`.
pub fn next_stage(current: WorkflowStage) -> Option<WorkflowStage> {
    match current {
        WorkflowStage::Configuring => Some(WorkflowStage::GeneratingPersonas),
        WorkflowStage::Synthesizing => Some(WorkflowStage::Done),
        WorkflowStage::GeneratingPersonas | WorkflowStage::Interviewing => None,
        WorkflowStage::Done => None,
    }
}
