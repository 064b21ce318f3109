// src/workflow/steps/final_decision.rs
//! Step 7: weigh every signal and record the hiring decision

use chrono::Utc;
use tracing::info;

use super::{missing_upstream, WorkflowStep};
use crate::error::{Result, WorkflowError};
use crate::metrics;
use crate::policy::{ScoreBand, ScoringPolicy};
use crate::types::{
    Candidate, CandidateEvaluation, Decision, DecisionRecord, DecisionStatus, InterviewSession,
    ScoreBreakdown,
};
use crate::workflow::payload::{FinalDecisionPayload, StepKey};
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone)]
pub struct FinalDecisionStep {
    evaluations: Vec<CandidateEvaluation>,
    policy: ScoringPolicy,
}

impl FinalDecisionStep {
    pub fn evaluations(&self) -> &[CandidateEvaluation] {
        &self.evaluations
    }

    pub fn evaluation(&self, candidate_id: &str) -> Option<&CandidateEvaluation> {
        self.evaluations
            .iter()
            .find(|e| e.candidate_id == candidate_id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &CandidateEvaluation> {
        self.evaluations
            .iter()
            .filter(|e| e.status == DecisionStatus::Pending)
    }

    pub fn score_band(&self, candidate_id: &str) -> Option<ScoreBand> {
        self.evaluation(candidate_id)
            .map(|e| self.policy.score_band(e.overall_score))
    }

    /// Records the decision for one candidate. A second decision for the same
    /// candidate is rejected.
    pub fn decide(&mut self, candidate_id: &str, decision: Decision) -> Result<&DecisionRecord> {
        let evaluation = self
            .evaluations
            .iter_mut()
            .find(|e| e.candidate_id == candidate_id)
            .ok_or_else(|| WorkflowError::not_found("candidate", candidate_id))?;
        let name = evaluation.candidate_name.clone();
        let record = evaluation.decide(decision)?;
        info!("{}: {:?} ({})", name, record.decision, record.reason);
        Ok(record)
    }

    pub fn hire_rate(&self) -> f64 {
        metrics::hire_rate(&self.evaluations)
    }

    fn evaluate(
        policy: &ScoringPolicy,
        candidate: &Candidate,
        session: Option<&InterviewSession>,
    ) -> CandidateEvaluation {
        // a signal that was never measured falls back to the resume match score
        let fallback = candidate.match_score;
        let fit = candidate.fit;
        let analysis = session.and_then(|s| s.analysis.as_ref());

        let scores = ScoreBreakdown {
            resume_match: candidate.match_score,
            technical: analysis
                .map(|a| a.technical)
                .or(fit.map(|f| f.technical_fit))
                .unwrap_or(fallback),
            culture: analysis
                .map(|a| a.cultural_fit)
                .or(fit.map(|f| f.culture_fit))
                .unwrap_or(fallback),
            experience: fit.map(|f| f.experience_fit).unwrap_or(fallback),
            verification: candidate.compliance_score.unwrap_or(fallback),
        };
        let overall_score = policy.weighted_score(&scores);

        CandidateEvaluation {
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.name.clone(),
            scores,
            overall_score,
            ai_recommendation: policy.recommendation(overall_score),
            status: DecisionStatus::Pending,
            decision: None,
        }
    }
}

impl WorkflowStep for FinalDecisionStep {
    const KEY: StepKey = StepKey::FinalDecision;
    type Output = FinalDecisionPayload;

    fn load(state: &WorkflowState, policy: &ScoringPolicy) -> Self {
        let policy = policy.clone();
        if let Some(previous) = &state.step7 {
            return Self {
                evaluations: previous.evaluations.clone(),
                policy,
            };
        }

        let candidates = match &state.step6 {
            Some(verification) => verification.candidates.clone(),
            None => {
                missing_upstream(Self::KEY, StepKey::BackgroundVerification);
                Candidate::placeholders()
            }
        };
        let sessions: &[InterviewSession] = state
            .step5
            .as_ref()
            .map(|a| a.sessions.as_slice())
            .unwrap_or(&[]);

        let mut evaluations: Vec<CandidateEvaluation> = candidates
            .iter()
            .map(|c| {
                let session = sessions
                    .iter()
                    .find(|s| s.candidate_id == c.id && s.is_analyzed());
                Self::evaluate(&policy, c, session)
            })
            .collect();
        evaluations.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));

        Self {
            evaluations,
            policy,
        }
    }

    fn complete(self) -> Result<FinalDecisionPayload> {
        if self.evaluations.is_empty() {
            return Err(WorkflowError::validation("no candidates to decide on"));
        }
        let open = self.pending().count();
        if open > 0 {
            return Err(WorkflowError::validation(format!(
                "{} candidates are still awaiting a decision",
                open
            )));
        }
        info!("Hiring round closed with hire rate {:.1}%", self.hire_rate());
        Ok(FinalDecisionPayload {
            evaluations: self.evaluations,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AiRecommendation, CompensationOffer, FinalDecision, FitScores};
    use chrono::NaiveDate;

    fn step() -> FinalDecisionStep {
        FinalDecisionStep::load(&WorkflowState::default(), &ScoringPolicy::default())
    }

    fn offer() -> CompensationOffer {
        CompensationOffer {
            salary: "$140,000".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_placeholder_evaluations_use_match_score() {
        let step = step();
        assert_eq!(step.evaluations().len(), 3);
        // every sub-score falls back to the match score
        let top = &step.evaluations()[0];
        assert_eq!(top.candidate_name, "Sarah Johnson");
        assert_eq!(top.overall_score, 92);
        assert_eq!(top.ai_recommendation, AiRecommendation::StrongHire);
        assert_eq!(step.score_band("placeholder-3"), Some(ScoreBand::Amber));
    }

    #[test]
    fn test_measured_zero_fit_is_kept() {
        let policy = ScoringPolicy::default();
        let mut candidate = Candidate::placeholders().remove(0);
        let unmatched = FinalDecisionStep::evaluate(&policy, &candidate, None);
        assert_eq!(unmatched.scores.experience, 92);

        candidate.fit = Some(FitScores {
            culture_fit: 0,
            technical_fit: 40,
            experience_fit: 0,
        });
        let evaluation = FinalDecisionStep::evaluate(&policy, &candidate, None);
        assert_eq!(evaluation.scores.culture, 0);
        assert_eq!(evaluation.scores.technical, 40);
        assert_eq!(evaluation.scores.experience, 0);
        assert_eq!(evaluation.scores.verification, 92);
        assert!(evaluation.overall_score < unmatched.overall_score);
    }

    #[test]
    fn test_decide_once_and_hire_rate() {
        let mut step = step();
        assert_eq!(step.hire_rate(), 0.0);

        step.decide(
            "placeholder-1",
            Decision::Hire {
                offer: offer(),
                reason: "Strong all round".into(),
            },
        )
        .unwrap();
        let again = step.decide(
            "placeholder-1",
            Decision::Reject {
                reason: "changed mind".into(),
            },
        );
        assert!(matches!(again, Err(WorkflowError::InvalidTransition { .. })));
        assert_eq!(
            step.evaluation("placeholder-1").unwrap().final_decision(),
            Some(FinalDecision::Hired)
        );

        step.decide(
            "placeholder-2",
            Decision::Reject {
                reason: "Experience gap".into(),
            },
        )
        .unwrap();
        assert_eq!(step.hire_rate(), 50.0);
        assert_eq!(step.pending().count(), 1);
    }

    #[test]
    fn test_rejection_needs_reason() {
        let mut step = step();
        let err = step
            .decide(
                "placeholder-3",
                Decision::Reject {
                    reason: " ".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(
            step.evaluation("placeholder-3").unwrap().status,
            DecisionStatus::Pending
        );
    }

    #[test]
    fn test_complete_requires_every_decision() {
        let mut step = step();
        for id in ["placeholder-1", "placeholder-2"] {
            step.decide(
                id,
                Decision::Reject {
                    reason: "Not this round".into(),
                },
            )
            .unwrap();
        }
        assert!(step.clone().complete().is_err());
        step.decide(
            "placeholder-3",
            Decision::Hire {
                offer: offer(),
                reason: "Best culture fit".into(),
            },
        )
        .unwrap();
        let payload = step.complete().unwrap();
        assert_eq!(payload.hired().count(), 1);
    }
}
