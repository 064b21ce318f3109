// src/workflow/steps/background_verification.rs
//! Step 6: background checks for every interviewed candidate

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::{missing_upstream, BatchReport, WorkflowStep};
use crate::error::{Result, WorkflowError};
use crate::metrics;
use crate::policy::{BiasLevel, ScoringPolicy};
use crate::providers::VerificationProvider;
use crate::tasks::OperationTracker;
use crate::types::{
    Candidate, CheckStatus, RiskLevel, VerificationCheck, VerificationResult, VerificationType,
};
use crate::workflow::payload::{BackgroundVerificationPayload, StepKey};
use crate::workflow::state::WorkflowState;

#[derive(Debug)]
pub struct BackgroundVerificationStep {
    candidates: Vec<Candidate>,
    checks: Vec<VerificationCheck>,
    policy: ScoringPolicy,
    tracker: OperationTracker,
}

impl BackgroundVerificationStep {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn checks(&self) -> &[VerificationCheck] {
        &self.checks
    }

    pub fn check(&self, id: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.id == id)
    }

    pub fn tracker(&self) -> OperationTracker {
        self.tracker.clone()
    }

    pub fn checks_for<'a>(
        &'a self,
        candidate_id: &'a str,
    ) -> impl Iterator<Item = &'a VerificationCheck> + 'a {
        self.checks
            .iter()
            .filter(move |c| c.candidate_id == candidate_id)
    }

    pub fn compliance_score(&self, candidate_id: &str) -> u8 {
        metrics::compliance_score(self.checks_for(candidate_id))
    }

    /// Worst risk among the resolved checks, `None` while nothing resolved.
    pub fn overall_risk(&self, candidate_id: &str) -> Option<RiskLevel> {
        metrics::overall_risk(self.checks_for(candidate_id))
    }

    pub fn bias_level(&self, candidate_id: &str) -> BiasLevel {
        let index = metrics::compliance_risk_index(self.compliance_score(candidate_id));
        self.policy.bias_level(index)
    }

    pub fn all_terminal(&self) -> bool {
        self.checks.iter().all(|c| c.is_terminal())
    }

    pub async fn run_check(
        &mut self,
        check_id: &str,
        provider: &dyn VerificationProvider,
    ) -> Result<&VerificationCheck> {
        let index = self
            .checks
            .iter()
            .position(|c| c.id == check_id)
            .ok_or_else(|| WorkflowError::not_found("verification check", check_id))?;
        let check = &mut self.checks[index];
        check.begin()?;

        match provider
            .run_check(&check.candidate_id, &check.candidate_name, check.kind)
            .await
        {
            Ok(result) => check.resolve(result)?,
            Err(e) => {
                warn!("{} check for {} failed: {}", check.kind.as_str(), check.candidate_name, e);
                check.reset_after_failure();
                return Err(e);
            }
        }
        info!("Check {} finished as {:?}", check.id, check.status);

        let candidate_id = self.checks[index].candidate_id.clone();
        self.refresh_compliance(&candidate_id);
        Ok(&self.checks[index])
    }

    /// Runs every pending check concurrently, one operation per check.
    pub async fn run_all(&mut self, provider: Arc<dyn VerificationProvider>) -> BatchReport {
        let mut report = BatchReport::default();
        let mut handles = Vec::new();

        for check in self
            .checks
            .iter_mut()
            .filter(|c| c.status == CheckStatus::Pending)
        {
            if let Err(e) = check.begin() {
                report.failed.push((check.id.clone(), e));
                continue;
            }
            let provider = Arc::clone(&provider);
            let (candidate_id, candidate_name, kind) =
                (check.candidate_id.clone(), check.candidate_name.clone(), check.kind);
            let spawned = self.tracker.spawn(&check.id, async move {
                provider.run_check(&candidate_id, &candidate_name, kind).await
            });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    check.reset_after_failure();
                    report.failed.push((check.id.clone(), e));
                }
            }
        }
        info!("Running {} background checks", handles.len());

        for handle in handles {
            let id = handle.key().to_string();
            let outcome: Result<VerificationResult> = handle.join().await;
            let Some(check) = self.checks.iter_mut().find(|c| c.id == id) else {
                continue;
            };
            let applied = match outcome {
                Ok(result) => check.resolve(result),
                Err(e) => {
                    warn!("Check {} failed: {}", id, e);
                    check.reset_after_failure();
                    Err(e)
                }
            };
            match applied {
                Ok(()) => report.succeeded.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }

        let ids: Vec<String> = self.candidates.iter().map(|c| c.id.clone()).collect();
        for id in ids {
            self.refresh_compliance(&id);
        }
        report
    }

    fn refresh_compliance(&mut self, candidate_id: &str) {
        let score = self.compliance_score(candidate_id);
        if let Some(candidate) = self.candidates.iter_mut().find(|c| c.id == candidate_id) {
            candidate.compliance_score = Some(score);
        }
    }

    fn checks_for_candidates(candidates: &[Candidate]) -> Vec<VerificationCheck> {
        candidates
            .iter()
            .flat_map(|c| {
                VerificationType::ALL
                    .into_iter()
                    .map(move |kind| VerificationCheck::pending(&c.id, &c.name, kind))
            })
            .collect()
    }
}

impl WorkflowStep for BackgroundVerificationStep {
    const KEY: StepKey = StepKey::BackgroundVerification;
    type Output = BackgroundVerificationPayload;

    fn load(state: &WorkflowState, policy: &ScoringPolicy) -> Self {
        let policy = policy.clone();
        if let Some(previous) = &state.step6 {
            return Self {
                candidates: previous.candidates.clone(),
                checks: previous.checks.clone(),
                policy,
                tracker: OperationTracker::new(),
            };
        }

        let candidates: Vec<Candidate> = match &state.step5 {
            Some(assessment) => {
                let interviewed: Vec<Candidate> = assessment
                    .candidates
                    .iter()
                    .filter(|c| c.interview_score.is_some())
                    .cloned()
                    .collect();
                if interviewed.is_empty() {
                    assessment.candidates.clone()
                } else {
                    interviewed
                }
            }
            None => {
                missing_upstream(Self::KEY, StepKey::InterviewAssessment);
                Candidate::placeholders()
            }
        };

        let checks = Self::checks_for_candidates(&candidates);
        Self {
            candidates,
            checks,
            policy,
            tracker: OperationTracker::new(),
        }
    }

    fn complete(self) -> Result<BackgroundVerificationPayload> {
        if self.checks.is_empty() {
            return Err(WorkflowError::validation("no candidates to verify"));
        }
        let open = self.checks.iter().filter(|c| !c.is_terminal()).count();
        if open > 0 {
            return Err(WorkflowError::validation(format!(
                "{} verification checks are still open",
                open
            )));
        }
        Ok(BackgroundVerificationPayload {
            candidates: self.candidates,
            checks: self.checks,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SimulatedProvider;
    use crate::types::ResultStatus;
    use async_trait::async_trait;
    use std::time::Duration;

    fn step() -> BackgroundVerificationStep {
        BackgroundVerificationStep::load(&WorkflowState::default(), &ScoringPolicy::default())
    }

    #[test]
    fn test_six_checks_per_candidate() {
        let step = step();
        assert_eq!(step.checks().len(), 18);
        assert_eq!(step.checks_for("placeholder-1").count(), 6);
        assert!(step.check("placeholder-1-credit").is_some());
        assert!(!step.all_terminal());
        assert_eq!(step.overall_risk("placeholder-1"), None);
    }

    #[tokio::test]
    async fn test_run_all_resolves_every_check() {
        let mut step = step();
        let report = step.run_all(Arc::new(SimulatedProvider::instant(4))).await;
        assert!(report.is_clean());
        assert_eq!(report.succeeded.len(), 18);
        assert!(step.all_terminal());

        let score = step.compliance_score("placeholder-1");
        assert_eq!(step.candidates()[0].compliance_score, Some(score));
        assert!(step.overall_risk("placeholder-1").is_some());
        assert!(step.complete().is_ok());
    }

    #[tokio::test]
    async fn test_terminal_check_cannot_rerun() {
        let mut step = step();
        let provider = SimulatedProvider::instant(4);
        step.run_check("placeholder-2-identity", &provider).await.unwrap();
        assert!(matches!(
            step.run_check("placeholder-2-identity", &provider).await,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    struct StalledProvider;

    #[async_trait]
    impl VerificationProvider for StalledProvider {
        async fn run_check(
            &self,
            _: &str,
            _: &str,
            _: VerificationType,
        ) -> Result<VerificationResult> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(VerificationResult {
                status: ResultStatus::Verified,
                score: 100,
                findings: vec![],
                risk_level: RiskLevel::Low,
            })
        }
    }

    #[tokio::test]
    async fn test_cancelled_checks_return_to_pending() {
        let mut step = step();
        let tracker = step.tracker();
        let canceller = tokio::spawn(async move {
            while tracker.len() < 18 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            tracker.cancel_all()
        });

        let report = step.run_all(Arc::new(StalledProvider)).await;
        assert_eq!(canceller.await.unwrap(), 18);
        assert_eq!(report.failed.len(), 18);
        assert!(report
            .failed
            .iter()
            .all(|(_, e)| matches!(e, WorkflowError::Cancelled(_))));
        assert!(step
            .checks()
            .iter()
            .all(|c| c.status == CheckStatus::Pending));
    }

    #[test]
    fn test_bias_level_from_compliance() {
        let mut step = step();
        for check in step.checks.iter_mut().filter(|c| c.candidate_id == "placeholder-1") {
            check.begin().unwrap();
            check
                .resolve(VerificationResult {
                    status: ResultStatus::Verified,
                    score: 95,
                    findings: vec![],
                    risk_level: RiskLevel::Low,
                })
                .unwrap();
        }
        // risk index (100 - 95) / 10 = 0.5
        assert_eq!(step.bias_level("placeholder-1"), BiasLevel::Excellent);
        // nothing resolved: score 0, index 10
        assert_eq!(step.bias_level("placeholder-2"), BiasLevel::NeedsAttention);
    }
}
