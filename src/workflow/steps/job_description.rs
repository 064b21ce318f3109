// src/workflow/steps/job_description.rs
//! Step 1: collect job requirements and generate the description

use chrono::Utc;
use tracing::info;

use super::WorkflowStep;
use crate::error::{Result, WorkflowError};
use crate::policy::ScoringPolicy;
use crate::providers::AnalysisProvider;
use crate::types::{JobDescriptionPayload, JobRequirements};
use crate::workflow::payload::StepKey;
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone, Default)]
pub struct JobDescriptionStep {
    requirements: JobRequirements,
    job_description: Option<String>,
}

impl JobDescriptionStep {
    pub fn requirements(&self) -> &JobRequirements {
        &self.requirements
    }

    pub fn requirements_mut(&mut self) -> &mut JobRequirements {
        &mut self.requirements
    }

    pub fn set_requirements(&mut self, requirements: JobRequirements) {
        self.requirements = requirements;
    }

    pub fn add_skill(&mut self, skill: &str) -> bool {
        self.requirements.add_skill(skill)
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        self.requirements.remove_skill(skill)
    }

    pub fn job_description(&self) -> Option<&str> {
        self.job_description.as_deref()
    }

    /// Replaces the generated text with a hand-edited one.
    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = Some(text.into());
    }

    pub async fn generate(&mut self, provider: &dyn AnalysisProvider) -> Result<&str> {
        if self.requirements.role.trim().is_empty() {
            return Err(WorkflowError::validation("role is required"));
        }
        if self.requirements.department.trim().is_empty() {
            return Err(WorkflowError::validation("department is required"));
        }

        info!("Generating job description for {}", self.requirements.role);
        let text = provider.generate_job_description(&self.requirements).await?;
        if text.trim().is_empty() {
            return Err(WorkflowError::transport(
                "job description generator returned an empty description",
            ));
        }
        Ok(self.job_description.insert(text).as_str())
    }
}

impl WorkflowStep for JobDescriptionStep {
    const KEY: StepKey = StepKey::JobDescription;
    type Output = JobDescriptionPayload;

    fn load(state: &WorkflowState, _policy: &ScoringPolicy) -> Self {
        match &state.step1 {
            Some(previous) => Self {
                requirements: previous.requirements.clone(),
                job_description: Some(previous.job_description.clone()),
            },
            None => Self::default(),
        }
    }

    fn complete(self) -> Result<JobDescriptionPayload> {
        if self.requirements.role.trim().is_empty() {
            return Err(WorkflowError::validation("role is required"));
        }
        let job_description = self
            .job_description
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                WorkflowError::validation("generate a job description before continuing")
            })?;

        Ok(JobDescriptionPayload {
            requirements: self.requirements,
            job_description,
            timestamp: Utc::now(),
        })
    }
}
