// src/workflow/payload.rs
//! Completion payloads, one per step

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics;
use crate::types::{
    Candidate, CandidateEvaluation, FinalDecision, InterviewSession, InterviewSlot,
    JobRequirements, ResumeAnalysis, ResumeRecord, SlotStatus, VerificationCheck,
};

pub use crate::types::JobDescriptionPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepKey {
    #[serde(rename = "step1")]
    JobDescription,
    #[serde(rename = "step2")]
    ResumeScan,
    #[serde(rename = "step3")]
    CandidateMatching,
    #[serde(rename = "step4")]
    InterviewScheduling,
    #[serde(rename = "step5")]
    InterviewAssessment,
    #[serde(rename = "step6")]
    BackgroundVerification,
    #[serde(rename = "step7")]
    FinalDecision,
}

impl StepKey {
    pub const ALL: [StepKey; 7] = [
        StepKey::JobDescription,
        StepKey::ResumeScan,
        StepKey::CandidateMatching,
        StepKey::InterviewScheduling,
        StepKey::InterviewAssessment,
        StepKey::BackgroundVerification,
        StepKey::FinalDecision,
    ];

    /// 1-based position in the workflow.
    pub fn index(self) -> usize {
        self as usize + 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_index(self.index() - 1)
    }

    /// Key under which the payload is stored in `workflowData`.
    pub fn as_str(self) -> &'static str {
        match self {
            StepKey::JobDescription => "step1",
            StepKey::ResumeScan => "step2",
            StepKey::CandidateMatching => "step3",
            StepKey::InterviewScheduling => "step4",
            StepKey::InterviewAssessment => "step5",
            StepKey::BackgroundVerification => "step6",
            StepKey::FinalDecision => "step7",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StepKey::JobDescription => "Job Description",
            StepKey::ResumeScan => "Resume Scan",
            StepKey::CandidateMatching => "Candidate Matching",
            StepKey::InterviewScheduling => "Interview Scheduling",
            StepKey::InterviewAssessment => "Interview Assessment",
            StepKey::BackgroundVerification => "Background Verification",
            StepKey::FinalDecision => "Final Decision",
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScanPayload {
    pub requirements: JobRequirements,
    pub resumes: Vec<ResumeRecord>,
    pub timestamp: DateTime<Utc>,
}

impl ResumeScanPayload {
    pub fn analyzed_resumes(&self) -> impl Iterator<Item = (&ResumeRecord, &ResumeAnalysis)> {
        self.resumes
            .iter()
            .filter_map(|r| r.analysis.as_ref().map(|a| (r, a)))
    }

    pub fn average_match_score(&self) -> u8 {
        metrics::average_match_score(self.analyzed_resumes().map(|(_, a)| a))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatchingPayload {
    pub candidates: Vec<Candidate>,
    pub timestamp: DateTime<Utc>,
}

impl CandidateMatchingPayload {
    pub fn selected(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_selected)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSchedulingPayload {
    pub candidates: Vec<Candidate>,
    pub slots: Vec<InterviewSlot>,
    pub timestamp: DateTime<Utc>,
}

impl InterviewSchedulingPayload {
    pub fn scheduled(&self) -> impl Iterator<Item = &InterviewSlot> {
        self.slots
            .iter()
            .filter(|s| s.status == SlotStatus::Scheduled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewAssessmentPayload {
    pub candidates: Vec<Candidate>,
    pub sessions: Vec<InterviewSession>,
    pub timestamp: DateTime<Utc>,
}

impl InterviewAssessmentPayload {
    pub fn average_interview_score(&self) -> u8 {
        let scores: Vec<f64> = self
            .sessions
            .iter()
            .filter_map(|s| s.overall_score())
            .map(f64::from)
            .collect();
        metrics::rounded_mean(&scores)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundVerificationPayload {
    pub candidates: Vec<Candidate>,
    pub checks: Vec<VerificationCheck>,
    pub timestamp: DateTime<Utc>,
}

impl BackgroundVerificationPayload {
    pub fn checks_for<'a>(
        &'a self,
        candidate_id: &'a str,
    ) -> impl Iterator<Item = &'a VerificationCheck> + 'a {
        self.checks
            .iter()
            .filter(move |c| c.candidate_id == candidate_id)
    }

    pub fn compliance_score(&self, candidate_id: &str) -> u8 {
        metrics::compliance_score(self.checks_for(candidate_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalDecisionPayload {
    pub evaluations: Vec<CandidateEvaluation>,
    pub timestamp: DateTime<Utc>,
}

impl FinalDecisionPayload {
    pub fn hire_rate(&self) -> f64 {
        metrics::hire_rate(&self.evaluations)
    }

    pub fn hired(&self) -> impl Iterator<Item = &CandidateEvaluation> {
        self.evaluations
            .iter()
            .filter(|e| e.final_decision() == Some(FinalDecision::Hired))
    }
}

/// Any step's completion payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StepPayload {
    JobDescription(JobDescriptionPayload),
    ResumeScan(ResumeScanPayload),
    CandidateMatching(CandidateMatchingPayload),
    InterviewScheduling(InterviewSchedulingPayload),
    InterviewAssessment(InterviewAssessmentPayload),
    BackgroundVerification(BackgroundVerificationPayload),
    FinalDecision(FinalDecisionPayload),
}

impl StepPayload {
    pub fn key(&self) -> StepKey {
        match self {
            StepPayload::JobDescription(_) => StepKey::JobDescription,
            StepPayload::ResumeScan(_) => StepKey::ResumeScan,
            StepPayload::CandidateMatching(_) => StepKey::CandidateMatching,
            StepPayload::InterviewScheduling(_) => StepKey::InterviewScheduling,
            StepPayload::InterviewAssessment(_) => StepKey::InterviewAssessment,
            StepPayload::BackgroundVerification(_) => StepKey::BackgroundVerification,
            StepPayload::FinalDecision(_) => StepKey::FinalDecision,
        }
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StepPayload {
                fn from(payload: $ty) -> Self {
                    StepPayload::$variant(payload)
                }
            }
        )*
    };
}

impl_from_payload! {
    JobDescription => JobDescriptionPayload,
    ResumeScan => ResumeScanPayload,
    CandidateMatching => CandidateMatchingPayload,
    InterviewScheduling => InterviewSchedulingPayload,
    InterviewAssessment => InterviewAssessmentPayload,
    BackgroundVerification => BackgroundVerificationPayload,
    FinalDecision => FinalDecisionPayload,
}
