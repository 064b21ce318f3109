// src/status.rs
//! Entity processing state machines.
//!
//! Every status enum moves forward only. A terminal status accepts no further
//! transition, so a completed entity can never be silently re-queued.

use tracing::warn;

use crate::error::{Result, WorkflowError};
use crate::types::decision::DecisionStatus;
use crate::types::interview::{SessionStatus, SlotStatus};
use crate::types::resume::ResumeStatus;
use crate::types::verification::CheckStatus;

pub trait ProcessingStatus: Copy + Eq {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn as_str(self) -> &'static str;

    fn is_terminal(self) -> bool;

    /// Whether `self -> next` is an edge of the state machine.
    fn can_transition_to(self, next: Self) -> bool;
}

/// Moves `current` to `next` in one step, or leaves it untouched and reports why.
pub fn transition<S: ProcessingStatus>(current: &mut S, next: S, id: &str) -> Result<()> {
    if current.is_terminal() || !current.can_transition_to(next) {
        warn!(
            "Rejected {} transition for {}: {} -> {}",
            S::ENTITY,
            id,
            current.as_str(),
            next.as_str()
        );
        return Err(WorkflowError::InvalidTransition {
            entity: format!("{} {}", S::ENTITY, id),
            from: current.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }
    *current = next;
    Ok(())
}

impl ProcessingStatus for ResumeStatus {
    const ENTITY: &'static str = "resume";

    fn as_str(self) -> &'static str {
        match self {
            ResumeStatus::Uploading => "uploading",
            ResumeStatus::Analyzing => "analyzing",
            ResumeStatus::Completed => "completed",
            ResumeStatus::Error => "error",
        }
    }

    // `Completed` is reached twice (upload done, then analysis attached);
    // `ResumeRecord` refuses to leave it once an analysis is present.
    fn is_terminal(self) -> bool {
        matches!(self, ResumeStatus::Error)
    }

    fn can_transition_to(self, next: Self) -> bool {
        use ResumeStatus::*;
        matches!(
            (self, next),
            (Uploading, Completed)
                | (Uploading, Error)
                | (Completed, Analyzing)
                | (Analyzing, Completed)
                | (Analyzing, Error)
        )
    }
}

impl ProcessingStatus for SlotStatus {
    const ENTITY: &'static str = "interview slot";

    fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Scheduled => "scheduled",
        }
    }

    fn is_terminal(self) -> bool {
        self == SlotStatus::Scheduled
    }

    fn can_transition_to(self, next: Self) -> bool {
        self == SlotStatus::Available && next == SlotStatus::Scheduled
    }
}

impl ProcessingStatus for SessionStatus {
    const ENTITY: &'static str = "interview session";

    fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Analyzed => "analyzed",
        }
    }

    fn is_terminal(self) -> bool {
        self == SessionStatus::Analyzed
    }

    fn can_transition_to(self, next: Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress) | (InProgress, Completed) | (Completed, Analyzed)
        )
    }
}

impl ProcessingStatus for CheckStatus {
    const ENTITY: &'static str = "verification check";

    fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pending => "pending",
            CheckStatus::InProgress => "in-progress",
            CheckStatus::Completed => "completed",
            CheckStatus::Failed => "failed",
            CheckStatus::Clear => "clear",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            CheckStatus::Completed | CheckStatus::Failed | CheckStatus::Clear
        )
    }

    fn can_transition_to(self, next: Self) -> bool {
        use CheckStatus::*;
        match self {
            Pending => next == InProgress,
            InProgress => matches!(next, Completed | Failed | Clear),
            _ => false,
        }
    }
}

impl ProcessingStatus for DecisionStatus {
    const ENTITY: &'static str = "candidate decision";

    fn as_str(self) -> &'static str {
        match self {
            DecisionStatus::Pending => "pending",
            DecisionStatus::Hired => "hired",
            DecisionStatus::Rejected => "rejected",
        }
    }

    fn is_terminal(self) -> bool {
        self != DecisionStatus::Pending
    }

    fn can_transition_to(self, next: Self) -> bool {
        self == DecisionStatus::Pending && next != DecisionStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses_reject_every_transition() {
        let all_checks = [
            CheckStatus::Pending,
            CheckStatus::InProgress,
            CheckStatus::Completed,
            CheckStatus::Failed,
            CheckStatus::Clear,
        ];
        for terminal in [CheckStatus::Completed, CheckStatus::Failed, CheckStatus::Clear] {
            for next in all_checks {
                let mut status = terminal;
                assert!(transition(&mut status, next, "c1").is_err());
                assert_eq!(status, terminal);
            }
        }

        let mut slot = SlotStatus::Scheduled;
        assert!(transition(&mut slot, SlotStatus::Scheduled, "s1").is_err());
        assert!(transition(&mut slot, SlotStatus::Available, "s1").is_err());

        let mut decision = DecisionStatus::Hired;
        assert!(transition(&mut decision, DecisionStatus::Rejected, "d1").is_err());
    }

    #[test]
    fn test_session_progression_is_linear() {
        let mut status = SessionStatus::Scheduled;
        assert!(transition(&mut status, SessionStatus::Completed, "i1").is_err());
        transition(&mut status, SessionStatus::InProgress, "i1").unwrap();
        transition(&mut status, SessionStatus::Completed, "i1").unwrap();
        assert!(transition(&mut status, SessionStatus::InProgress, "i1").is_err());
        transition(&mut status, SessionStatus::Analyzed, "i1").unwrap();
        assert!(status.is_terminal());
    }

    #[test]
    fn test_check_cannot_skip_in_progress() {
        let mut status = CheckStatus::Pending;
        assert!(transition(&mut status, CheckStatus::Clear, "c1").is_err());
        transition(&mut status, CheckStatus::InProgress, "c1").unwrap();
        transition(&mut status, CheckStatus::Failed, "c1").unwrap();
    }

    #[test]
    fn test_rejected_transition_reports_both_ends() {
        let mut status = ResumeStatus::Error;
        let err = transition(&mut status, ResumeStatus::Analyzing, "r1").unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                entity: "resume r1".into(),
                from: "error".into(),
                to: "analyzing".into(),
            }
        );
    }
}
