// src/types/interview.rs
//! Interview slots (step 4) and interview sessions with AI analysis (step 5)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkflowError};
use crate::metrics;
use crate::status::{transition, ProcessingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Phone,
    Video,
    Onsite,
}

impl InterviewType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewType::Phone => "phone",
            InterviewType::Video => "video",
            InterviewType::Onsite => "onsite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSlot {
    pub id: String,
    pub date: NaiveDate,
    /// Local start time, "HH:MM".
    pub time: String,
    pub interviewer: String,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub status: SlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
}

impl InterviewSlot {
    pub fn available(
        id: &str,
        date: NaiveDate,
        time: &str,
        interviewer: &str,
        interview_type: InterviewType,
    ) -> Self {
        Self {
            id: id.to_string(),
            date,
            time: time.to_string(),
            interviewer: interviewer.to_string(),
            interview_type,
            status: SlotStatus::Available,
            candidate_id: None,
        }
    }

    /// One-way assignment. A scheduled slot is never reassigned.
    pub fn assign(&mut self, candidate_id: &str) -> Result<()> {
        if self.status == SlotStatus::Scheduled {
            return Err(WorkflowError::conflict(format!(
                "slot {} is already scheduled for {}",
                self.id,
                self.candidate_id.as_deref().unwrap_or("another candidate")
            )));
        }
        transition(&mut self.status, SlotStatus::Scheduled, &self.id)?;
        self.candidate_id = Some(candidate_id.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Analyzed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub communication: u8,
    pub technical: u8,
    pub problem_solving: u8,
    pub cultural_fit: u8,
    pub overall_score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

impl AiAnalysis {
    /// `overall_score` is always the rounded mean of the four sub-scores.
    pub fn new(
        communication: u8,
        technical: u8,
        problem_solving: u8,
        cultural_fit: u8,
        strengths: Vec<String>,
        improvements: Vec<String>,
    ) -> Self {
        let overall_score = metrics::rounded_mean(&[
            communication as f64,
            technical as f64,
            problem_solving as f64,
            cultural_fit as f64,
        ]);
        Self {
            communication,
            technical,
            problem_solving,
            cultural_fit,
            overall_score,
            strengths,
            improvements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: String,
    pub candidate_id: String,
    pub candidate_name: String,
    pub slot_id: String,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    pub status: SessionStatus,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AiAnalysis>,
}

impl InterviewSession {
    pub fn for_slot(slot: &InterviewSlot, candidate_id: &str, candidate_name: &str) -> Self {
        Self {
            id: format!("session-{}", slot.id),
            candidate_id: candidate_id.to_string(),
            candidate_name: candidate_name.to_string(),
            slot_id: slot.id.clone(),
            interview_type: slot.interview_type,
            status: SessionStatus::Scheduled,
            questions: Vec::new(),
            analysis: None,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        transition(&mut self.status, SessionStatus::InProgress, &self.id)
    }

    pub fn finish(&mut self) -> Result<()> {
        transition(&mut self.status, SessionStatus::Completed, &self.id)
    }

    /// Fails unless the interview has finished and is not yet analysed.
    pub fn ensure_ready_for_analysis(&self) -> Result<()> {
        if self.status.can_transition_to(SessionStatus::Analyzed) {
            return Ok(());
        }
        Err(WorkflowError::InvalidTransition {
            entity: format!("{} {}", SessionStatus::ENTITY, self.id),
            from: self.status.as_str().to_string(),
            to: SessionStatus::Analyzed.as_str().to_string(),
        })
    }

    /// Only the terminal `analyzed` status carries an analysis.
    pub fn attach_analysis(&mut self, analysis: AiAnalysis) -> Result<()> {
        transition(&mut self.status, SessionStatus::Analyzed, &self.id)?;
        self.analysis = Some(analysis);
        Ok(())
    }

    pub fn overall_score(&self) -> Option<u8> {
        self.analysis.as_ref().map(|a| a.overall_score)
    }

    pub fn is_analyzed(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> InterviewSlot {
        InterviewSlot::available(
            "slot-1",
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            "10:00",
            "Dana Park",
            InterviewType::Video,
        )
    }

    #[test]
    fn test_slot_assignment_is_exclusive() {
        let mut slot = slot();
        slot.assign("c1").unwrap();
        assert_eq!(slot.status, SlotStatus::Scheduled);

        let err = slot.assign("c2").unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
        assert_eq!(slot.candidate_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_overall_score_is_rounded_mean() {
        let analysis = AiAnalysis::new(80, 91, 85, 77, vec![], vec![]);
        // (80 + 91 + 85 + 77) / 4 = 83.25
        assert_eq!(analysis.overall_score, 83);
        let analysis = AiAnalysis::new(80, 81, 80, 81, vec![], vec![]);
        assert_eq!(analysis.overall_score, 81);
    }

    #[test]
    fn test_session_needs_completion_before_analysis() {
        let mut session = InterviewSession::for_slot(&slot(), "c1", "Ada");
        let analysis = AiAnalysis::new(70, 70, 70, 70, vec![], vec![]);
        assert!(session.attach_analysis(analysis.clone()).is_err());
        assert!(session.analysis.is_none());

        session.start().unwrap();
        session.finish().unwrap();
        session.attach_analysis(analysis).unwrap();
        assert_eq!(session.overall_score(), Some(70));
        assert!(session.is_analyzed());
    }

    #[test]
    fn test_slot_type_serializes_as_type() {
        let json = serde_json::to_value(slot()).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["status"], "available");
        assert!(json.get("candidateId").is_none());
    }
}
