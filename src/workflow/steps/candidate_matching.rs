// src/workflow/steps/candidate_matching.rs
//! Step 3: score candidates against the role and pick who moves on

use chrono::Utc;
use std::cmp::Reverse;
use tracing::{info, warn};

use super::{missing_upstream, requirements_from, WorkflowStep};
use crate::error::{Result, WorkflowError};
use crate::metrics::{self, ComparisonMetrics};
use crate::policy::ScoringPolicy;
use crate::providers::AnalysisProvider;
use crate::types::{Candidate, JobRequirements};
use crate::workflow::payload::{CandidateMatchingPayload, StepKey};
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone)]
pub struct CandidateMatchingStep {
    requirements: JobRequirements,
    candidates: Vec<Candidate>,
}

impl CandidateMatchingStep {
    pub fn requirements(&self) -> &JobRequirements {
        &self.requirements
    }

    /// Candidates ordered by match score, best first.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_selected)
    }

    /// Fetches fit scores for every candidate not matched yet. Stops at the
    /// first failure; candidates matched before it keep their scores.
    pub async fn run_matching(&mut self, provider: &dyn AnalysisProvider) -> Result<usize> {
        let mut matched = 0;
        for candidate in self.candidates.iter_mut().filter(|c| !c.is_matched()) {
            let fit = provider
                .match_candidate(candidate, &self.requirements)
                .await
                .map_err(|e| {
                    warn!("Matching {} failed: {}", candidate.name, e);
                    e
                })?;
            candidate.fit = Some(fit);
            matched += 1;
        }
        info!("Matched {} candidates", matched);
        Ok(matched)
    }

    /// Flips the selection flag. Returns the new value.
    pub fn toggle_selection(&mut self, id: &str) -> Result<bool> {
        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| WorkflowError::not_found("candidate", id))?;
        candidate.is_selected = !candidate.is_selected;
        Ok(candidate.is_selected)
    }

    /// Selects the `n` highest match scores and clears every other selection.
    pub fn select_top(&mut self, n: usize) {
        self.sort();
        for (rank, candidate) in self.candidates.iter_mut().enumerate() {
            candidate.is_selected = rank < n;
        }
    }

    pub fn comparison(&self) -> ComparisonMetrics {
        metrics::compare_candidates(&self.candidates)
    }

    fn sort(&mut self) {
        self.candidates.sort_by_key(|c| Reverse(c.match_score));
    }
}

impl WorkflowStep for CandidateMatchingStep {
    const KEY: StepKey = StepKey::CandidateMatching;
    type Output = CandidateMatchingPayload;

    fn load(state: &WorkflowState, _policy: &ScoringPolicy) -> Self {
        let requirements = requirements_from(state, Self::KEY);

        let mut candidates: Vec<Candidate> = match &state.step2 {
            Some(scan) => scan
                .analyzed_resumes()
                .map(|(record, analysis)| Candidate::from_analysis(&record.id, analysis))
                .collect(),
            None => Vec::new(),
        };
        if candidates.is_empty() {
            missing_upstream(Self::KEY, StepKey::ResumeScan);
            candidates = Candidate::placeholders();
        }

        // re-entry: restore earlier fit scores and selection
        if let Some(previous) = &state.step3 {
            for candidate in candidates.iter_mut() {
                if let Some(earlier) = previous.candidates.iter().find(|c| c.id == candidate.id) {
                    candidate.fit = earlier.fit;
                    candidate.is_selected = earlier.is_selected;
                }
            }
        }

        let mut step = Self {
            requirements,
            candidates,
        };
        step.sort();
        step
    }

    fn complete(self) -> Result<CandidateMatchingPayload> {
        let selected: Vec<Candidate> = self
            .candidates
            .into_iter()
            .filter(|c| c.is_selected)
            .collect();
        if selected.is_empty() {
            return Err(WorkflowError::validation(
                "select at least one candidate before continuing",
            ));
        }
        info!("{} candidates selected for interviews", selected.len());
        Ok(CandidateMatchingPayload {
            candidates: selected,
            timestamp: Utc::now(),
        })
    }
}
