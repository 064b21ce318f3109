// src/types/resume.rs
//! Uploaded resumes and their analysis (step 2)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, WorkflowError};
use crate::status::{transition, ProcessingStatus};

pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    Uploading,
    Analyzing,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub candidate_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub skills: Vec<String>,
    pub experience_years: f32,
    pub education: Vec<String>,
    /// 0-100
    pub match_score: u8,
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
    pub overall_rating: OverallRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: String,
    pub file_name: String,
    pub upload_progress: u8,
    pub status: ResumeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ResumeAnalysis>,
    /// Extracted text sent to a remote analyser. Never part of the payload.
    #[serde(skip)]
    pub content: Option<String>,
}

impl ResumeRecord {
    pub fn new(file_name: &str) -> Result<Self> {
        validate_file_name(file_name)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            upload_progress: 0,
            status: ResumeStatus::Uploading,
            analysis: None,
            content: None,
        })
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Advances the simulated upload. Reaching 100 completes the upload.
    pub fn record_progress(&mut self, delta: u8) -> Result<u8> {
        if self.status != ResumeStatus::Uploading {
            return Err(self.rejected(ResumeStatus::Uploading));
        }
        self.upload_progress = self.upload_progress.saturating_add(delta).min(100);
        if self.upload_progress == 100 {
            transition(&mut self.status, ResumeStatus::Completed, &self.id)?;
        }
        Ok(self.upload_progress)
    }

    pub fn is_uploaded(&self) -> bool {
        self.upload_progress == 100 && self.status != ResumeStatus::Error
    }

    pub fn is_analyzed(&self) -> bool {
        self.status == ResumeStatus::Completed && self.analysis.is_some()
    }

    /// Uploaded and not yet analysed.
    pub fn awaiting_analysis(&self) -> bool {
        self.status == ResumeStatus::Completed && self.analysis.is_none()
    }

    /// Marks the record as analysing. Only an uploaded, unanalysed record can start.
    pub fn begin_analysis(&mut self) -> Result<()> {
        if self.analysis.is_some() {
            return Err(self.rejected(ResumeStatus::Analyzing));
        }
        transition(&mut self.status, ResumeStatus::Analyzing, &self.id)
    }

    pub fn attach_analysis(&mut self, analysis: ResumeAnalysis) -> Result<()> {
        if self.status != ResumeStatus::Analyzing {
            return Err(self.rejected(ResumeStatus::Completed));
        }
        transition(&mut self.status, ResumeStatus::Completed, &self.id)?;
        self.analysis = Some(analysis);
        Ok(())
    }

    /// Returns an analysing record to its last stable state after a failed
    /// or cancelled analysis.
    pub fn abandon_analysis(&mut self) -> Result<()> {
        if self.status != ResumeStatus::Analyzing {
            return Err(self.rejected(ResumeStatus::Completed));
        }
        transition(&mut self.status, ResumeStatus::Completed, &self.id)
    }

    pub fn mark_error(&mut self) -> Result<()> {
        transition(&mut self.status, ResumeStatus::Error, &self.id)
    }

    fn rejected(&self, to: ResumeStatus) -> WorkflowError {
        WorkflowError::InvalidTransition {
            entity: format!("{} {}", ResumeStatus::ENTITY, self.id),
            from: self.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

pub fn validate_file_name(file_name: &str) -> Result<()> {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| {
            WorkflowError::validation(format!("file has no extension: {}", file_name))
        })?;

    if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(WorkflowError::validation(format!(
            "unsupported resume format: {} (allowed: {})",
            ext,
            ACCEPTED_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_analysis() -> ResumeAnalysis {
        ResumeAnalysis {
            candidate_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+1 555 0100".into(),
            location: "London".into(),
            skills: vec!["Rust".into()],
            experience_years: 6.0,
            education: vec!["BSc Mathematics".into()],
            match_score: 88,
            highlights: vec![],
            concerns: vec![],
            overall_rating: OverallRating::Excellent,
        }
    }

    #[test]
    fn test_upload_progress_clamps_and_completes() {
        let mut record = ResumeRecord::new("ada.pdf").unwrap();
        assert_eq!(record.record_progress(60).unwrap(), 60);
        assert_eq!(record.status, ResumeStatus::Uploading);
        assert_eq!(record.record_progress(60).unwrap(), 100);
        assert_eq!(record.status, ResumeStatus::Completed);
        assert!(record.awaiting_analysis());
        assert!(record.record_progress(10).is_err());
    }

    #[test]
    fn test_analysis_lifecycle() {
        let mut record = ResumeRecord::new("ada.docx").unwrap();
        record.record_progress(100).unwrap();
        record.begin_analysis().unwrap();
        assert_eq!(record.status, ResumeStatus::Analyzing);
        record.attach_analysis(sample_analysis()).unwrap();
        assert!(record.is_analyzed());

        // an analysed record cannot be re-queued
        assert!(matches!(
            record.begin_analysis(),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert!(record.mark_error().is_err());
    }

    #[test]
    fn test_abandoned_analysis_returns_to_uploaded() {
        let mut record = ResumeRecord::new("ada.txt").unwrap();
        record.record_progress(100).unwrap();
        record.begin_analysis().unwrap();
        record.abandon_analysis().unwrap();
        assert!(record.awaiting_analysis());
        assert!(record.begin_analysis().is_ok());
    }

    #[test]
    fn test_cannot_analyze_while_uploading() {
        let mut record = ResumeRecord::new("ada.pdf").unwrap();
        assert!(record.begin_analysis().is_err());
        assert!(record.attach_analysis(sample_analysis()).is_err());
    }

    #[test]
    fn test_file_name_validation() {
        assert!(validate_file_name("cv.PDF").is_ok());
        assert!(validate_file_name("cv.png").is_err());
        assert!(validate_file_name("cv").is_err());
        assert!(ResumeRecord::new("photo.jpg").is_err());
    }
}
