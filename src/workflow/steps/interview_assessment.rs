// src/workflow/steps/interview_assessment.rs
//! Step 5: run the booked interviews and collect AI analysis

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::{missing_upstream, WorkflowStep};
use crate::error::{Result, WorkflowError};
use crate::policy::ScoringPolicy;
use crate::providers::AnalysisProvider;
use crate::types::{AiAnalysis, Candidate, InterviewSession, InterviewSlot, InterviewType};
use crate::workflow::payload::{InterviewAssessmentPayload, StepKey};
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone)]
pub struct InterviewAssessmentStep {
    candidates: Vec<Candidate>,
    sessions: Vec<InterviewSession>,
}

impl InterviewAssessmentStep {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn sessions(&self) -> &[InterviewSession] {
        &self.sessions
    }

    pub fn session(&self, id: &str) -> Option<&InterviewSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn start(&mut self, session_id: &str) -> Result<()> {
        let session = self.session_mut(session_id)?;
        session.start()?;
        info!("Interview {} started", session.id);
        Ok(())
    }

    pub fn finish(&mut self, session_id: &str) -> Result<()> {
        let session = self.session_mut(session_id)?;
        session.finish()?;
        info!("Interview {} finished", session.id);
        Ok(())
    }

    pub async fn generate_questions(
        &mut self,
        session_id: &str,
        provider: &dyn AnalysisProvider,
        count: usize,
    ) -> Result<&[String]> {
        let index = self.index_of(session_id)?;
        let session = &mut self.sessions[index];
        let candidate = self
            .candidates
            .iter()
            .find(|c| c.id == session.candidate_id)
            .ok_or_else(|| WorkflowError::not_found("candidate", session.candidate_id.as_str()))?;

        let questions = provider
            .generate_interview_questions(candidate, session.interview_type, count)
            .await?;
        session.questions = questions;
        Ok(&session.questions)
    }

    /// Scores a finished interview. On provider failure the session stays
    /// `completed` and can be analysed again.
    pub async fn analyze(
        &mut self,
        session_id: &str,
        provider: &dyn AnalysisProvider,
    ) -> Result<&AiAnalysis> {
        let index = self.index_of(session_id)?;
        let session = &mut self.sessions[index];
        session.ensure_ready_for_analysis()?;

        let analysis = provider.analyze_interview(session).await.map_err(|e| {
            warn!("Analysis of interview {} failed: {}", session.id, e);
            e
        })?;
        let overall = analysis.overall_score;
        session.attach_analysis(analysis)?;
        info!("Interview {} scored {}", session.id, overall);

        if let Some(candidate) = self
            .candidates
            .iter_mut()
            .find(|c| c.id == session.candidate_id)
        {
            candidate.interview_score = Some(overall);
        }

        session
            .analysis
            .as_ref()
            .ok_or_else(|| WorkflowError::not_found("interview analysis", session_id))
    }

    pub fn average_interview_score(&self) -> u8 {
        let scores: Vec<f64> = self
            .sessions
            .iter()
            .filter_map(|s| s.overall_score())
            .map(f64::from)
            .collect();
        crate::metrics::rounded_mean(&scores)
    }

    fn index_of(&self, session_id: &str) -> Result<usize> {
        self.sessions
            .iter()
            .position(|s| s.id == session_id)
            .ok_or_else(|| WorkflowError::not_found("interview session", session_id))
    }

    fn session_mut(&mut self, session_id: &str) -> Result<&mut InterviewSession> {
        let index = self.index_of(session_id)?;
        Ok(&mut self.sessions[index])
    }

    fn placeholder() -> Self {
        let candidates = Candidate::placeholders();
        let first_day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or_default();
        let sessions = candidates
            .iter()
            .enumerate()
            .map(|(n, c)| {
                let slot = InterviewSlot::available(
                    &format!("placeholder-slot-{}", n + 1),
                    first_day,
                    "10:00",
                    "Alex Thompson",
                    InterviewType::Video,
                );
                InterviewSession::for_slot(&slot, &c.id, &c.name)
            })
            .collect();
        Self {
            candidates,
            sessions,
        }
    }
}

impl WorkflowStep for InterviewAssessmentStep {
    const KEY: StepKey = StepKey::InterviewAssessment;
    type Output = InterviewAssessmentPayload;

    fn load(state: &WorkflowState, _policy: &ScoringPolicy) -> Self {
        if let Some(previous) = &state.step5 {
            return Self {
                candidates: previous.candidates.clone(),
                sessions: previous.sessions.clone(),
            };
        }

        let Some(scheduling) = &state.step4 else {
            missing_upstream(Self::KEY, StepKey::InterviewScheduling);
            return Self::placeholder();
        };

        let sessions: Vec<InterviewSession> = scheduling
            .scheduled()
            .filter_map(|slot| {
                let candidate_id = slot.candidate_id.as_deref()?;
                let candidate = scheduling.candidates.iter().find(|c| c.id == candidate_id)?;
                Some(InterviewSession::for_slot(slot, &candidate.id, &candidate.name))
            })
            .collect();
        let candidates = scheduling
            .candidates
            .iter()
            .filter(|c| sessions.iter().any(|s| s.candidate_id == c.id))
            .cloned()
            .collect();

        Self {
            candidates,
            sessions,
        }
    }

    fn complete(self) -> Result<InterviewAssessmentPayload> {
        if !self.sessions.iter().any(|s| s.is_analyzed()) {
            return Err(WorkflowError::validation(
                "analyse at least one interview before continuing",
            ));
        }
        Ok(InterviewAssessmentPayload {
            candidates: self.candidates,
            sessions: self.sessions,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SimulatedProvider;
    use crate::types::SessionStatus;

    fn step() -> InterviewAssessmentStep {
        InterviewAssessmentStep::load(&WorkflowState::default(), &ScoringPolicy::default())
    }

    #[test]
    fn test_placeholder_sessions_without_scheduling() {
        let step = step();
        assert_eq!(step.sessions().len(), 3);
        assert_eq!(step.sessions()[0].id, "session-placeholder-slot-1");
        assert!(step
            .sessions()
            .iter()
            .all(|s| s.status == SessionStatus::Scheduled));
    }

    #[tokio::test]
    async fn test_analysis_requires_finished_interview() {
        let mut step = step();
        let provider = SimulatedProvider::instant(2);
        let id = step.sessions()[0].id.clone();

        assert!(matches!(
            step.analyze(&id, &provider).await,
            Err(WorkflowError::InvalidTransition { .. })
        ));

        step.start(&id).unwrap();
        step.finish(&id).unwrap();
        let overall = step.analyze(&id, &provider).await.unwrap().overall_score;

        assert_eq!(step.session(&id).unwrap().status, SessionStatus::Analyzed);
        assert_eq!(step.candidates()[0].interview_score, Some(overall));
        assert_eq!(step.average_interview_score(), overall);

        // analysed is terminal
        assert!(step.analyze(&id, &provider).await.is_err());
        assert!(step.start(&id).is_err());
    }

    #[tokio::test]
    async fn test_questions_are_attached_to_session() {
        let mut step = step();
        let id = step.sessions()[1].id.clone();
        let questions = step
            .generate_questions(&id, &SimulatedProvider::instant(2), 3)
            .await
            .unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(step.session(&id).unwrap().questions.len(), 3);
    }

    #[test]
    fn test_complete_requires_an_analysed_session() {
        assert!(matches!(
            step().complete(),
            Err(WorkflowError::Validation(_))
        ));
    }
}
