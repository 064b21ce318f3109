// src/workflow/steps/resume_scan.rs
//! Step 2: upload resumes and analyse them against the requirements

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::{requirements_from, BatchReport, WorkflowStep};
use crate::error::{Result, WorkflowError};
use crate::metrics;
use crate::policy::ScoringPolicy;
use crate::providers::AnalysisProvider;
use crate::tasks::OperationTracker;
use crate::types::{JobRequirements, ResumeAnalysis, ResumeRecord};
use crate::workflow::payload::{ResumeScanPayload, StepKey};
use crate::workflow::state::WorkflowState;

/// Progress added per simulated upload tick.
pub const UPLOAD_TICK: u8 = 10;

#[derive(Debug)]
pub struct ResumeScanStep {
    requirements: JobRequirements,
    resumes: Vec<ResumeRecord>,
    tracker: OperationTracker,
}

impl ResumeScanStep {
    pub fn requirements(&self) -> &JobRequirements {
        &self.requirements
    }

    pub fn resumes(&self) -> &[ResumeRecord] {
        &self.resumes
    }

    pub fn resume(&self, id: &str) -> Option<&ResumeRecord> {
        self.resumes.iter().find(|r| r.id == id)
    }

    /// Handle for cancelling analyses from outside the step.
    pub fn tracker(&self) -> OperationTracker {
        self.tracker.clone()
    }

    pub fn add_file(&mut self, file_name: &str) -> Result<&ResumeRecord> {
        let record = ResumeRecord::new(file_name)?;
        Ok(self.push(record))
    }

    /// Adds a record carrying extracted text for remote analysis.
    pub fn add_resume(&mut self, record: ResumeRecord) -> &ResumeRecord {
        self.push(record)
    }

    fn push(&mut self, record: ResumeRecord) -> &ResumeRecord {
        info!("Queued resume {} ({})", record.file_name, record.id);
        let index = self.resumes.len();
        self.resumes.push(record);
        &self.resumes[index]
    }

    pub fn record_progress(&mut self, id: &str, delta: u8) -> Result<u8> {
        self.find_mut(id)?.record_progress(delta)
    }

    /// Drives every uploading record to 100%. Returns how many finished.
    pub fn upload_all(&mut self) -> usize {
        let mut finished = 0;
        for record in self.resumes.iter_mut() {
            while !record.is_uploaded() {
                match record.record_progress(UPLOAD_TICK) {
                    Ok(100) => finished += 1,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Upload of {} stopped: {}", record.file_name, e);
                        break;
                    }
                }
            }
        }
        finished
    }

    pub async fn analyze(
        &mut self,
        id: &str,
        provider: &dyn AnalysisProvider,
    ) -> Result<&ResumeAnalysis> {
        let index = self.index_of(id)?;
        let requirements = &self.requirements;
        let record = &mut self.resumes[index];
        record.begin_analysis()?;

        match provider.analyze_resume(record, requirements).await {
            Ok(analysis) => {
                info!(
                    "Analysed {}: match score {}",
                    record.file_name, analysis.match_score
                );
                record.attach_analysis(analysis)?;
            }
            Err(e) => {
                warn!("Analysis of {} failed: {}", record.file_name, e);
                record.abandon_analysis()?;
                return Err(e);
            }
        }

        record
            .analysis
            .as_ref()
            .ok_or_else(|| WorkflowError::not_found("resume analysis", id))
    }

    /// Analyses every uploaded, unanalysed resume concurrently. Each resume
    /// has at most one analysis in flight; failures roll back individually.
    pub async fn analyze_all(&mut self, provider: Arc<dyn AnalysisProvider>) -> BatchReport {
        let mut report = BatchReport::default();
        let mut handles = Vec::new();

        for record in self.resumes.iter_mut().filter(|r| r.awaiting_analysis()) {
            if let Err(e) = record.begin_analysis() {
                report.failed.push((record.id.clone(), e));
                continue;
            }
            let snapshot = record.clone();
            let requirements = self.requirements.clone();
            let provider = Arc::clone(&provider);
            let spawned = self.tracker.spawn(&record.id, async move {
                provider.analyze_resume(&snapshot, &requirements).await
            });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // another analysis owns this resume
                    let _ = record.abandon_analysis();
                    report.failed.push((record.id.clone(), e));
                }
            }
        }
        info!("Analysing {} resumes", handles.len());

        for handle in handles {
            let id = handle.key().to_string();
            let outcome = handle.join().await;
            let Some(record) = self.resumes.iter_mut().find(|r| r.id == id) else {
                // removed while in flight
                continue;
            };
            let applied = match outcome {
                Ok(analysis) => record.attach_analysis(analysis),
                Err(e) => {
                    warn!("Analysis of {} failed: {}", record.file_name, e);
                    record.abandon_analysis().and(Err(e))
                }
            };
            match applied {
                Ok(()) => report.succeeded.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        report
    }

    /// Drops a resume, cancelling its analysis if one is running.
    pub fn remove(&mut self, id: &str) -> Result<ResumeRecord> {
        let index = self.index_of(id)?;
        self.tracker.cancel(id);
        let record = self.resumes.remove(index);
        info!("Removed resume {}", record.file_name);
        Ok(record)
    }

    pub fn mark_error(&mut self, id: &str) -> Result<()> {
        self.find_mut(id)?.mark_error()
    }

    pub fn analyzed_resumes(&self) -> impl Iterator<Item = (&ResumeRecord, &ResumeAnalysis)> {
        self.resumes
            .iter()
            .filter_map(|r| r.analysis.as_ref().map(|a| (r, a)))
    }

    pub fn average_match_score(&self) -> u8 {
        metrics::average_match_score(self.analyzed_resumes().map(|(_, a)| a))
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.resumes
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| WorkflowError::not_found("resume", id))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut ResumeRecord> {
        let index = self.index_of(id)?;
        Ok(&mut self.resumes[index])
    }
}

impl WorkflowStep for ResumeScanStep {
    const KEY: StepKey = StepKey::ResumeScan;
    type Output = ResumeScanPayload;

    fn load(state: &WorkflowState, _policy: &ScoringPolicy) -> Self {
        let requirements = match &state.step1 {
            Some(jd) => jd.requirements.clone(),
            None => requirements_from(state, Self::KEY),
        };
        let resumes = state
            .step2
            .as_ref()
            .map(|scan| scan.resumes.clone())
            .unwrap_or_default();

        Self {
            requirements,
            resumes,
            tracker: OperationTracker::new(),
        }
    }

    fn complete(self) -> Result<ResumeScanPayload> {
        if self.analyzed_resumes().next().is_none() {
            return Err(WorkflowError::validation(
                "analyse at least one resume before continuing",
            ));
        }
        let in_flight = self.tracker.cancel_all();
        if in_flight > 0 {
            warn!("Completed resume scan with {} analyses still running", in_flight);
        }

        Ok(ResumeScanPayload {
            requirements: self.requirements,
            resumes: self.resumes,
            timestamp: Utc::now(),
        })
    }
}
