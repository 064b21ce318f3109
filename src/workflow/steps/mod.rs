// src/workflow/steps/mod.rs
//! The seven step controllers.
//!
//! A step is loaded from the accumulated state, mutated locally, and consumed
//! by `complete` to produce its payload. Nothing a step does touches the state
//! it was loaded from.

pub mod background_verification;
pub mod candidate_matching;
pub mod final_decision;
pub mod interview_assessment;
pub mod interview_scheduling;
pub mod job_description;
pub mod resume_scan;

use tracing::warn;

use super::payload::{StepKey, StepPayload};
use super::state::WorkflowState;
use crate::error::{Result, WorkflowError};
use crate::policy::ScoringPolicy;
use crate::types::JobRequirements;

pub use background_verification::BackgroundVerificationStep;
pub use candidate_matching::CandidateMatchingStep;
pub use final_decision::FinalDecisionStep;
pub use interview_assessment::InterviewAssessmentStep;
pub use interview_scheduling::InterviewSchedulingStep;
pub use job_description::JobDescriptionStep;
pub use resume_scan::ResumeScanStep;

pub trait WorkflowStep: Sized {
    const KEY: StepKey;
    type Output: Into<StepPayload>;

    /// Builds local state from upstream payloads, falling back to placeholder
    /// data when one is missing. Never fails.
    fn load(state: &WorkflowState, policy: &ScoringPolicy) -> Self;

    /// Packages local state into this step's payload.
    fn complete(self) -> Result<Self::Output>;
}

/// Outcome of a batch of per-entity operations.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, WorkflowError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Most recent job requirements on record.
pub(crate) fn requirements_from(state: &WorkflowState, step: StepKey) -> JobRequirements {
    if let Some(scan) = &state.step2 {
        return scan.requirements.clone();
    }
    if let Some(jd) = &state.step1 {
        return jd.requirements.clone();
    }
    warn!("{}: no job description on record, using placeholder requirements", step);
    JobRequirements::placeholder()
}

pub(crate) fn missing_upstream(step: StepKey, upstream: StepKey) {
    warn!(
        "{}: {} payload missing, falling back to placeholder data",
        step, upstream
    );
}
