// src/workflow/orchestrator.rs
//! Step sequencing over the accumulated workflow state

use tracing::{info, warn};

use super::payload::{StepKey, StepPayload};
use super::state::WorkflowState;
use super::steps::WorkflowStep;
use crate::error::{Result, WorkflowError};
use crate::policy::ScoringPolicy;

const FINISHED: &str = "finished";

#[derive(Debug, Clone)]
pub struct WorkflowOrchestrator {
    state: WorkflowState,
    current: StepKey,
    finished: bool,
    /// Completion order, latest last.
    history: Vec<StepKey>,
    policy: ScoringPolicy,
}

impl Default for WorkflowOrchestrator {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

impl WorkflowOrchestrator {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            state: WorkflowState::default(),
            current: StepKey::JobDescription,
            finished: false,
            history: Vec::new(),
            policy,
        }
    }

    pub fn current_step(&self) -> StepKey {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Everything completed so far. Steps read from this, never write to it.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn history(&self) -> &[StepKey] {
        &self.history
    }

    /// Loads the controller for the current step.
    pub fn open<S: WorkflowStep>(&self) -> Result<S> {
        self.ensure_current(S::KEY)?;
        Ok(S::load(&self.state, &self.policy))
    }

    /// Completes `step` and advances with its payload.
    pub fn complete<S: WorkflowStep>(&mut self, step: S) -> Result<StepKey> {
        self.ensure_current(S::KEY)?;
        let payload = step.complete()?;
        self.advance(payload)
    }

    /// Stores a completion payload for the current step and moves on.
    /// Returns the key that was stored.
    ///
    /// Re-submitting a step after going back discards every later payload,
    /// since those were derived from the old one.
    pub fn advance(&mut self, payload: impl Into<StepPayload>) -> Result<StepKey> {
        let payload = payload.into();
        let key = payload.key();
        self.ensure_current(key)?;

        if self.state.contains(key) {
            let invalidated = self.state.clear_after(key);
            self.history.retain(|k| *k < key);
            if !invalidated.is_empty() {
                let keys: Vec<&str> = invalidated.iter().map(|k| k.as_str()).collect();
                info!(
                    "Resubmitted {}: invalidated {} later steps ({})",
                    key,
                    invalidated.len(),
                    keys.join(", ")
                );
            }
        }

        self.state.insert(payload);
        self.history.push(key);
        match key.next() {
            Some(next) => {
                info!("Completed {} ({}), now on {}", key, key.title(), next);
                self.current = next;
            }
            None => {
                info!("Completed {} ({}), workflow finished", key, key.title());
                self.finished = true;
            }
        }
        Ok(key)
    }

    /// Moves to the previous step without touching stored payloads.
    pub fn go_back(&mut self) -> Result<StepKey> {
        if self.finished {
            self.finished = false;
            return Ok(self.current);
        }
        let previous = self.current.previous().ok_or_else(|| {
            WorkflowError::validation("already at the first step")
        })?;
        info!("Back from {} to {}", self.current, previous);
        self.current = previous;
        Ok(previous)
    }

    /// Moves to the next step, only over a step that already has a payload.
    pub fn go_forward(&mut self) -> Result<StepKey> {
        if self.finished {
            return Err(WorkflowError::validation("the workflow is already finished"));
        }
        if !self.state.contains(self.current) {
            return Err(WorkflowError::validation(format!(
                "complete {} before moving forward",
                self.current.title()
            )));
        }
        match self.current.next() {
            Some(next) => {
                self.current = next;
                Ok(next)
            }
            None => {
                self.finished = true;
                Ok(self.current)
            }
        }
    }

    pub fn restart(&mut self) {
        info!("Restarting workflow");
        self.state = WorkflowState::default();
        self.current = StepKey::JobDescription;
        self.finished = false;
        self.history.clear();
    }

    /// The `workflowData` object as JSON.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.state)
    }

    fn ensure_current(&self, attempted: StepKey) -> Result<()> {
        if self.finished || attempted != self.current {
            let current = if self.finished {
                FINISHED.to_string()
            } else {
                self.current.to_string()
            };
            warn!("Rejected {} while on {}", attempted, current);
            return Err(WorkflowError::OutOfOrder {
                current,
                attempted: attempted.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobDescriptionPayload, JobRequirements};
    use crate::workflow::payload::{CandidateMatchingPayload, ResumeScanPayload};
    use crate::workflow::steps::{CandidateMatchingStep, JobDescriptionStep, ResumeScanStep};
    use chrono::Utc;

    fn step1() -> JobDescriptionPayload {
        JobDescriptionPayload {
            requirements: JobRequirements::new("Engineer", "Eng", "3-5").with_skills(["React"]),
            job_description: "Build the product".into(),
            timestamp: Utc::now(),
        }
    }

    fn step2() -> ResumeScanPayload {
        ResumeScanPayload {
            requirements: step1().requirements,
            resumes: vec![],
            timestamp: Utc::now(),
        }
    }

    fn step3() -> CandidateMatchingPayload {
        CandidateMatchingPayload {
            candidates: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_duplicate_advance_is_rejected() {
        let mut flow = WorkflowOrchestrator::default();
        assert_eq!(flow.advance(step1()).unwrap(), StepKey::JobDescription);
        let err = flow.advance(step1()).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::OutOfOrder {
                current: "step2".into(),
                attempted: "step1".into(),
            }
        );
        assert_eq!(flow.history(), &[StepKey::JobDescription]);
    }

    #[test]
    fn test_cannot_skip_ahead() {
        let mut flow = WorkflowOrchestrator::default();
        assert!(matches!(
            flow.advance(step3()),
            Err(WorkflowError::OutOfOrder { .. })
        ));
        assert!(flow.state().step3.is_none());
        assert!(flow.open::<ResumeScanStep>().is_err());
        assert!(flow.open::<JobDescriptionStep>().is_ok());
    }

    #[test]
    fn test_back_and_forward_keep_payloads() {
        let mut flow = WorkflowOrchestrator::default();
        flow.advance(step1()).unwrap();
        assert!(flow.go_forward().is_err());

        assert_eq!(flow.go_back().unwrap(), StepKey::JobDescription);
        assert!(flow.state().step1.is_some());
        assert!(flow.go_back().is_err());

        assert_eq!(flow.go_forward().unwrap(), StepKey::ResumeScan);
    }

    #[test]
    fn test_resubmission_invalidates_later_steps() {
        let mut flow = WorkflowOrchestrator::default();
        flow.advance(step1()).unwrap();
        flow.advance(step2()).unwrap();
        flow.advance(step3()).unwrap();
        assert!(flow.state().step3.is_some());
        assert_eq!(flow.current_step(), StepKey::InterviewScheduling);

        assert_eq!(flow.go_back().unwrap(), StepKey::CandidateMatching);
        assert_eq!(flow.go_back().unwrap(), StepKey::ResumeScan);
        assert_eq!(flow.go_back().unwrap(), StepKey::JobDescription);
        assert_eq!(flow.state().completed_keys().len(), 3);

        let mut edited = step1();
        edited.requirements.role = "Staff Engineer".into();
        flow.advance(edited).unwrap();

        assert!(flow.state().step2.is_none());
        assert!(flow.state().step3.is_none());
        assert_eq!(flow.state().step1.as_ref().unwrap().requirements.role, "Staff Engineer");
        assert_eq!(flow.current_step(), StepKey::ResumeScan);
        assert_eq!(flow.history(), &[StepKey::JobDescription]);
    }

    #[test]
    fn test_open_loads_from_state() {
        let mut flow = WorkflowOrchestrator::default();
        flow.advance(step1()).unwrap();
        let scan: ResumeScanStep = flow.open().unwrap();
        assert_eq!(scan.requirements().role, "Engineer");
        assert!(flow.open::<CandidateMatchingStep>().is_err());
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut flow = WorkflowOrchestrator::default();
        flow.advance(step1()).unwrap();
        flow.restart();
        assert_eq!(flow.current_step(), StepKey::JobDescription);
        assert_eq!(flow.snapshot_json().unwrap(), "{}");
        assert!(flow.history().is_empty());
    }
}
