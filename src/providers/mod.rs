// src/providers/mod.rs
//! Sources of analysis, scheduling and verification results.
//!
//! Steps only talk to these traits, so a simulated provider and the REST
//! backend are interchangeable.

pub mod http;
pub mod simulated;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    AiAnalysis, Candidate, FitScores, InterviewSession, InterviewSlot, InterviewType,
    JobRequirements, ResumeAnalysis, ResumeRecord, VerificationResult, VerificationType,
};

pub use http::HttpProvider;
pub use simulated::SimulatedProvider;

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn generate_job_description(&self, requirements: &JobRequirements) -> Result<String>;

    async fn analyze_resume(
        &self,
        resume: &ResumeRecord,
        requirements: &JobRequirements,
    ) -> Result<ResumeAnalysis>;

    async fn match_candidate(
        &self,
        candidate: &Candidate,
        requirements: &JobRequirements,
    ) -> Result<FitScores>;

    async fn analyze_interview(&self, session: &InterviewSession) -> Result<AiAnalysis>;

    async fn generate_interview_questions(
        &self,
        candidate: &Candidate,
        interview_type: InterviewType,
        count: usize,
    ) -> Result<Vec<String>>;
}

#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// Open slots offered to the given candidates.
    async fn available_slots(&self, candidates: &[Candidate]) -> Result<Vec<InterviewSlot>>;
}

#[async_trait]
pub trait VerificationProvider: Send + Sync {
    async fn run_check(
        &self,
        candidate_id: &str,
        candidate_name: &str,
        kind: VerificationType,
    ) -> Result<VerificationResult>;
}
