// Workflow notifications
//
// The engine reports progress through a `WorkflowObserver` instead of writing
// to the console. `LogObserver` forwards everything to the `log` facade.

use crate::models::{TimelineEvent, WorkflowStage};

pub trait WorkflowObserver: Send + Sync {
    /// A stage is about to run
    fn on_stage_entered(&self, _stage: WorkflowStage) {}

    /// A generation attempt failed; `will_retry` is false on the last one
    fn on_attempt_failed(
        &self,
        _step: &str,
        _attempt: u32,
        _max_attempts: u32,
        _error: &str,
        _will_retry: bool,
    ) {
    }

    /// A timeline event was recorded
    fn on_event(&self, _event: &TimelineEvent) {}

    /// Something was accepted despite looking wrong
    fn on_warning(&self, _message: &str) {}
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl WorkflowObserver for NoopObserver {}

/// Writes notifications through the `log` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl WorkflowObserver for LogObserver {
    fn on_stage_entered(&self, stage: WorkflowStage) {
        log::debug!("[workflow] Entering stage: {}", stage.display_name());
    }

    fn on_attempt_failed(
        &self,
        step: &str,
        attempt: u32,
        max_attempts: u32,
        error: &str,
        will_retry: bool,
    ) {
        if will_retry {
            log::warn!(
                "[{}] Attempt {}/{} failed: {}. Retrying...",
                step,
                attempt,
                max_attempts,
                error
            );
        } else {
            log::error!("[{}] Attempt {}/{} failed: {}", step, attempt, max_attempts, error);
        }
    }

    fn on_event(&self, event: &TimelineEvent) {
        log::info!("[workflow] {}", event.message);
    }

    fn on_warning(&self, message: &str) {
        log::warn!("[workflow] {}", message);
    }
}
