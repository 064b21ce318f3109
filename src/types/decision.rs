// src/types/decision.rs
//! Candidate evaluation and the final hiring decision (step 7)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkflowError};
use crate::status::transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AiRecommendation {
    StrongHire,
    Hire,
    Consider,
    Reject,
}

impl AiRecommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            AiRecommendation::StrongHire => "strong-hire",
            AiRecommendation::Hire => "hire",
            AiRecommendation::Consider => "consider",
            AiRecommendation::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalDecision {
    Hired,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    #[default]
    Pending,
    Hired,
    Rejected,
}

impl From<FinalDecision> for DecisionStatus {
    fn from(decision: FinalDecision) -> Self {
        match decision {
            FinalDecision::Hired => DecisionStatus::Hired,
            FinalDecision::Rejected => DecisionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationOffer {
    pub salary: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

/// What the hiring manager chose for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Hire { offer: CompensationOffer, reason: String },
    Reject { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub decision: FinalDecision,
    pub reason: String,
    pub decided_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<CompensationOffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub resume_match: u8,
    pub technical: u8,
    pub culture: u8,
    pub experience: u8,
    pub verification: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvaluation {
    pub candidate_id: String,
    pub candidate_name: String,
    pub scores: ScoreBreakdown,
    pub overall_score: u8,
    pub ai_recommendation: AiRecommendation,
    pub status: DecisionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionRecord>,
}

impl CandidateEvaluation {
    pub fn decide(&mut self, decision: Decision) -> Result<&DecisionRecord> {
        let (final_decision, reason, offer) = match decision {
            Decision::Hire { offer, reason } => (FinalDecision::Hired, reason, Some(offer)),
            Decision::Reject { reason } => {
                if reason.trim().is_empty() {
                    return Err(WorkflowError::validation(format!(
                        "a rejection reason is required for {}",
                        self.candidate_name
                    )));
                }
                (FinalDecision::Rejected, reason, None)
            }
        };

        transition(&mut self.status, final_decision.into(), &self.candidate_id)?;
        Ok(&*self.decision.insert(DecisionRecord {
            decision: final_decision,
            reason,
            decided_at: Utc::now(),
            offer,
        }))
    }

    pub fn final_decision(&self) -> Option<FinalDecision> {
        self.decision.as_ref().map(|d| d.decision)
    }

    pub fn is_decided(&self) -> bool {
        self.status != DecisionStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation() -> CandidateEvaluation {
        CandidateEvaluation {
            candidate_id: "c1".into(),
            candidate_name: "Ada".into(),
            scores: ScoreBreakdown::default(),
            overall_score: 91,
            ai_recommendation: AiRecommendation::StrongHire,
            status: DecisionStatus::Pending,
            decision: None,
        }
    }

    fn offer() -> CompensationOffer {
        CompensationOffer {
            salary: "$140,000".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_decision_is_recorded_once() {
        let mut eval = evaluation();
        eval.decide(Decision::Hire {
            offer: offer(),
            reason: "Strong technical interview".into(),
        })
        .unwrap();
        assert_eq!(eval.final_decision(), Some(FinalDecision::Hired));
        assert_eq!(eval.status, DecisionStatus::Hired);

        let err = eval
            .decide(Decision::Reject {
                reason: "changed mind".into(),
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert_eq!(eval.final_decision(), Some(FinalDecision::Hired));
    }

    #[test]
    fn test_rejection_needs_reason() {
        let mut eval = evaluation();
        assert!(eval
            .decide(Decision::Reject {
                reason: "  ".into()
            })
            .is_err());
        assert!(!eval.is_decided());
    }

    #[test]
    fn test_recommendation_serializes_kebab_case() {
        let json = serde_json::to_value(AiRecommendation::StrongHire).unwrap();
        assert_eq!(json, "strong-hire");
    }
}
