// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{DispatchError, DispatchResult};
use crate::job::{ExecutionDecision, JobResult};

/// Owns a job's execution decision once routing is done.
///
/// The only error it absorbs is `RemoteUnavailable`, and only once: the
/// decision flips to `Local` for good and the reason is kept so a later
/// engine-load failure can be reported together with it.
#[derive(Debug)]
pub struct FallbackController {
    decision: ExecutionDecision,
    fallback_reason: Option<String>,
}

impl FallbackController {
    pub fn new(decision: ExecutionDecision) -> Self {
        Self {
            decision,
            fallback_reason: None,
        }
    }

    pub fn decision(&self) -> ExecutionDecision {
        self.decision
    }

    pub fn has_fallen_back(&self) -> bool {
        self.fallback_reason.is_some()
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }

    /// Inspect an error from the remote path.
    ///
    /// Returns `Ok(())` when the job should be rerun locally; every other
    /// error is handed back unchanged.
    pub fn intercept(&mut self, error: DispatchError) -> DispatchResult<()> {
        match error {
            DispatchError::RemoteUnavailable(reason)
                if self.decision == ExecutionDecision::Remote && !self.has_fallen_back() =>
            {
                self.decision = ExecutionDecision::Local;
                self.fallback_reason = Some(reason);
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Reconcile the outcome of the local run.
    pub fn finish_local(&self, result: DispatchResult<JobResult>) -> DispatchResult<JobResult> {
        match (result, &self.fallback_reason) {
            (Err(local @ DispatchError::LocalEngineUnavailable(_)), Some(remote)) => {
                Err(DispatchError::FallbackFailed {
                    remote: remote.clone(),
                    local: Box::new(local),
                })
            }
            (result, _) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_unavailable_falls_back_once() {
        let mut controller = FallbackController::new(ExecutionDecision::Remote);

        assert!(controller
            .intercept(DispatchError::RemoteUnavailable("busy".to_string()))
            .is_ok());
        assert_eq!(controller.decision(), ExecutionDecision::Local);
        assert_eq!(controller.fallback_reason(), Some("busy"));

        let second = controller.intercept(DispatchError::RemoteUnavailable("again".to_string()));
        assert!(matches!(second, Err(DispatchError::RemoteUnavailable(reason)) if reason == "again"));
        assert_eq!(controller.fallback_reason(), Some("busy"));
    }

    #[test]
    fn test_worker_failure_is_not_absorbed() {
        let mut controller = FallbackController::new(ExecutionDecision::Remote);

        let result = controller.intercept(DispatchError::RemoteProcessingFailure("codec".to_string()));
        assert!(matches!(result, Err(DispatchError::RemoteProcessingFailure(_))));
        assert_eq!(controller.decision(), ExecutionDecision::Remote);
        assert!(!controller.has_fallen_back());
    }

    #[test]
    fn test_local_decision_never_falls_back() {
        let mut controller = FallbackController::new(ExecutionDecision::Local);
        let result = controller.intercept(DispatchError::RemoteUnavailable("busy".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_engine_failure_after_fallback_is_combined() {
        let mut controller = FallbackController::new(ExecutionDecision::Remote);
        controller
            .intercept(DispatchError::RemoteUnavailable("busy".to_string()))
            .unwrap();

        let result = controller.finish_local(Err(DispatchError::LocalEngineUnavailable(
            "missing module".to_string(),
        )));
        match result {
            Err(DispatchError::FallbackFailed { remote, local }) => {
                assert_eq!(remote, "busy");
                assert!(matches!(*local, DispatchError::LocalEngineUnavailable(_)));
            }
            other => panic!("expected FallbackFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_processing_error_after_fallback_propagates() {
        let mut controller = FallbackController::new(ExecutionDecision::Remote);
        controller
            .intercept(DispatchError::RemoteUnavailable("busy".to_string()))
            .unwrap();

        let result = controller.finish_local(Err(DispatchError::Processing("exit 1".to_string())));
        assert!(matches!(result, Err(DispatchError::Processing(_))));
    }

    #[test]
    fn test_engine_failure_without_fallback_is_unchanged() {
        let controller = FallbackController::new(ExecutionDecision::Local);
        let result = controller.finish_local(Err(DispatchError::LocalEngineUnavailable(
            "missing module".to_string(),
        )));
        assert!(matches!(result, Err(DispatchError::LocalEngineUnavailable(_))));
    }
}
