// src/workflow/state.rs
//! Accumulated `workflowData`: one optional payload per step

use serde::{Deserialize, Serialize};

use super::payload::{
    BackgroundVerificationPayload, CandidateMatchingPayload, FinalDecisionPayload,
    InterviewAssessmentPayload, InterviewSchedulingPayload, JobDescriptionPayload,
    ResumeScanPayload, StepKey, StepPayload,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step1: Option<JobDescriptionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step2: Option<ResumeScanPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step3: Option<CandidateMatchingPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step4: Option<InterviewSchedulingPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step5: Option<InterviewAssessmentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step6: Option<BackgroundVerificationPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step7: Option<FinalDecisionPayload>,
}

impl WorkflowState {
    pub fn contains(&self, key: StepKey) -> bool {
        match key {
            StepKey::JobDescription => self.step1.is_some(),
            StepKey::ResumeScan => self.step2.is_some(),
            StepKey::CandidateMatching => self.step3.is_some(),
            StepKey::InterviewScheduling => self.step4.is_some(),
            StepKey::InterviewAssessment => self.step5.is_some(),
            StepKey::BackgroundVerification => self.step6.is_some(),
            StepKey::FinalDecision => self.step7.is_some(),
        }
    }

    /// Keys with a stored payload, in step order.
    pub fn completed_keys(&self) -> Vec<StepKey> {
        StepKey::ALL
            .into_iter()
            .filter(|k| self.contains(*k))
            .collect()
    }

    /// Looks a payload up by its `workflowData` key ("step1".."step7").
    pub fn get_json(&self, key: &str) -> Option<serde_json::Value> {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut(key).map(serde_json::Value::take))
    }

    /// Stores a payload under its own key, replacing only that key.
    pub(crate) fn insert(&mut self, payload: StepPayload) {
        match payload {
            StepPayload::JobDescription(p) => self.step1 = Some(p),
            StepPayload::ResumeScan(p) => self.step2 = Some(p),
            StepPayload::CandidateMatching(p) => self.step3 = Some(p),
            StepPayload::InterviewScheduling(p) => self.step4 = Some(p),
            StepPayload::InterviewAssessment(p) => self.step5 = Some(p),
            StepPayload::BackgroundVerification(p) => self.step6 = Some(p),
            StepPayload::FinalDecision(p) => self.step7 = Some(p),
        }
    }

    /// Drops the payloads of every step after `key`. Returns the dropped keys.
    pub(crate) fn clear_after(&mut self, key: StepKey) -> Vec<StepKey> {
        let mut cleared = Vec::new();
        for later in StepKey::ALL.into_iter().filter(|k| *k > key) {
            let was_set = self.contains(later);
            match later {
                StepKey::JobDescription => self.step1 = None,
                StepKey::ResumeScan => self.step2 = None,
                StepKey::CandidateMatching => self.step3 = None,
                StepKey::InterviewScheduling => self.step4 = None,
                StepKey::InterviewAssessment => self.step5 = None,
                StepKey::BackgroundVerification => self.step6 = None,
                StepKey::FinalDecision => self.step7 = None,
            }
            if was_set {
                cleared.push(later);
            }
        }
        cleared
    }
}
