// src/types/mod.rs
//! Workflow data model

pub mod candidate;
pub mod decision;
pub mod interview;
pub mod job;
pub mod response;
pub mod resume;
pub mod verification;

pub use candidate::{Candidate, FitScores};
pub use decision::{
    AiRecommendation, CandidateEvaluation, CompensationOffer, Decision, DecisionRecord,
    DecisionStatus, FinalDecision, ScoreBreakdown,
};
pub use interview::{
    AiAnalysis, InterviewSession, InterviewSlot, InterviewType, SessionStatus, SlotStatus,
};
pub use job::{JobDescriptionPayload, JobRequirements, WorkType};
pub use resume::{OverallRating, ResumeAnalysis, ResumeRecord, ResumeStatus};
pub use verification::{
    CheckStatus, ResultStatus, RiskLevel, VerificationCheck, VerificationResult,
    VerificationType,
};
