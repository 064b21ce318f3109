// src/workflow/mod.rs
//! The seven-step hiring workflow

pub mod orchestrator;
pub mod payload;
pub mod state;
pub mod steps;

pub use orchestrator::WorkflowOrchestrator;
pub use payload::{
    BackgroundVerificationPayload, CandidateMatchingPayload, FinalDecisionPayload,
    InterviewAssessmentPayload, InterviewSchedulingPayload, JobDescriptionPayload,
    ResumeScanPayload, StepKey, StepPayload,
};
pub use state::WorkflowState;
pub use steps::{
    BackgroundVerificationStep, BatchReport, CandidateMatchingStep, FinalDecisionStep,
    InterviewAssessmentStep, InterviewSchedulingStep, JobDescriptionStep, ResumeScanStep,
    WorkflowStep,
};
