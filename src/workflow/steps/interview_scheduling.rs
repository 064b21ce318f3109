// src/workflow/steps/interview_scheduling.rs
//! Step 4: book interview slots for the selected candidates

use chrono::Utc;
use tracing::{info, warn};

use super::{missing_upstream, WorkflowStep};
use crate::error::{Result, WorkflowError};
use crate::policy::ScoringPolicy;
use crate::providers::SchedulingProvider;
use crate::types::{Candidate, InterviewSlot, SlotStatus};
use crate::workflow::payload::{InterviewSchedulingPayload, StepKey};
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone)]
pub struct InterviewSchedulingStep {
    candidates: Vec<Candidate>,
    slots: Vec<InterviewSlot>,
}

impl InterviewSchedulingStep {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn slots(&self) -> &[InterviewSlot] {
        &self.slots
    }

    pub fn available_slots(&self) -> impl Iterator<Item = &InterviewSlot> {
        self.slots
            .iter()
            .filter(|s| s.status == SlotStatus::Available)
    }

    pub fn scheduled(&self) -> impl Iterator<Item = &InterviewSlot> {
        self.slots
            .iter()
            .filter(|s| s.status == SlotStatus::Scheduled)
    }

    pub fn unscheduled_candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .filter(|c| c.interview_slot_id.is_none())
    }

    /// Pulls open slots from the provider. Slots already known are kept as they
    /// are. Returns how many slots are available afterwards.
    pub async fn load_slots(&mut self, provider: &dyn SchedulingProvider) -> Result<usize> {
        let offered = provider.available_slots(&self.candidates).await?;
        for slot in offered {
            if self.slots.iter().any(|s| s.id == slot.id) {
                continue;
            }
            self.slots.push(slot);
        }
        let available = self.available_slots().count();
        info!("{} interview slots available", available);
        Ok(available)
    }

    pub fn add_slot(&mut self, slot: InterviewSlot) -> Result<()> {
        if self.slots.iter().any(|s| s.id == slot.id) {
            return Err(WorkflowError::conflict(format!(
                "slot {} already exists",
                slot.id
            )));
        }
        self.slots.push(slot);
        Ok(())
    }

    /// Books `slot_id` for `candidate_id`. Both sides are checked before
    /// either is modified.
    pub fn schedule(&mut self, slot_id: &str, candidate_id: &str) -> Result<&InterviewSlot> {
        let slot_index = self
            .slots
            .iter()
            .position(|s| s.id == slot_id)
            .ok_or_else(|| WorkflowError::not_found("interview slot", slot_id))?;
        let candidate_index = self
            .candidates
            .iter()
            .position(|c| c.id == candidate_id)
            .ok_or_else(|| WorkflowError::not_found("candidate", candidate_id))?;

        let candidate = &mut self.candidates[candidate_index];
        if let Some(booked) = &candidate.interview_slot_id {
            warn!("{} is already booked into {}", candidate.name, booked);
            return Err(WorkflowError::conflict(format!(
                "{} already has an interview in slot {}",
                candidate.name, booked
            )));
        }

        let slot = &mut self.slots[slot_index];
        if let Err(e) = slot.assign(candidate_id) {
            warn!("Scheduling conflict: {}", e);
            return Err(e);
        }
        candidate.interview_slot_id = Some(slot_id.to_string());
        info!(
            "Scheduled {} on {} at {} with {}",
            candidate.name, slot.date, slot.time, slot.interviewer
        );
        Ok(slot)
    }
}

impl WorkflowStep for InterviewSchedulingStep {
    const KEY: StepKey = StepKey::InterviewScheduling;
    type Output = InterviewSchedulingPayload;

    fn load(state: &WorkflowState, _policy: &ScoringPolicy) -> Self {
        if let Some(previous) = &state.step4 {
            return Self {
                candidates: previous.candidates.clone(),
                slots: previous.slots.clone(),
            };
        }

        let candidates: Vec<Candidate> = match &state.step3 {
            Some(matching) => matching.selected().cloned().collect(),
            None => {
                missing_upstream(Self::KEY, StepKey::CandidateMatching);
                Candidate::placeholders()
                    .into_iter()
                    .map(|mut c| {
                        c.is_selected = true;
                        c
                    })
                    .collect()
            }
        };

        Self {
            candidates,
            slots: Vec::new(),
        }
    }

    fn complete(self) -> Result<InterviewSchedulingPayload> {
        if self.scheduled().next().is_none() {
            return Err(WorkflowError::validation(
                "schedule at least one interview before continuing",
            ));
        }
        Ok(InterviewSchedulingPayload {
            candidates: self.candidates,
            slots: self.slots,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SimulatedProvider;

    async fn loaded() -> InterviewSchedulingStep {
        let mut step =
            InterviewSchedulingStep::load(&WorkflowState::default(), &ScoringPolicy::default());
        step.load_slots(&SimulatedProvider::instant(1)).await.unwrap();
        step
    }

    #[tokio::test]
    async fn test_same_slot_cannot_be_scheduled_twice() {
        let mut step = loaded().await;
        step.schedule("slot-1", "placeholder-1").unwrap();

        let err = step.schedule("slot-1", "placeholder-2").unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
        // the losing candidate stays unbooked
        assert!(step
            .candidates()
            .iter()
            .find(|c| c.id == "placeholder-2")
            .unwrap()
            .interview_slot_id
            .is_none());
        assert_eq!(
            step.slots()[0].candidate_id.as_deref(),
            Some("placeholder-1")
        );
    }

    #[tokio::test]
    async fn test_candidate_cannot_be_double_booked() {
        let mut step = loaded().await;
        step.schedule("slot-1", "placeholder-1").unwrap();
        let err = step.schedule("slot-2", "placeholder-1").unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
        assert_eq!(step.slots()[1].status, SlotStatus::Available);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let mut step = loaded().await;
        assert!(matches!(
            step.schedule("slot-99", "placeholder-1"),
            Err(WorkflowError::NotFound { kind: "interview slot", .. })
        ));
        assert!(matches!(
            step.schedule("slot-1", "nobody"),
            Err(WorkflowError::NotFound { kind: "candidate", .. })
        ));
    }

    #[tokio::test]
    async fn test_reloading_slots_keeps_bookings() {
        let mut step = loaded().await;
        step.schedule("slot-1", "placeholder-1").unwrap();
        let total = step.slots().len();
        step.load_slots(&SimulatedProvider::instant(1)).await.unwrap();
        assert_eq!(step.slots().len(), total);
        assert_eq!(step.scheduled().count(), 1);
    }

    #[tokio::test]
    async fn test_complete_requires_a_booking() {
        let step = loaded().await;
        assert!(matches!(step.complete(), Err(WorkflowError::Validation(_))));
    }
}
