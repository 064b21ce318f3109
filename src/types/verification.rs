// src/types/verification.rs
//! Background verification checks (step 6)

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::status::{transition, ProcessingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationType {
    Employment,
    Education,
    Criminal,
    Reference,
    Identity,
    Credit,
}

impl VerificationType {
    pub const ALL: [VerificationType; 6] = [
        VerificationType::Employment,
        VerificationType::Education,
        VerificationType::Criminal,
        VerificationType::Reference,
        VerificationType::Identity,
        VerificationType::Credit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VerificationType::Employment => "employment",
            VerificationType::Education => "education",
            VerificationType::Criminal => "criminal",
            VerificationType::Reference => "reference",
            VerificationType::Identity => "identity",
            VerificationType::Credit => "credit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultStatus {
    Verified,
    Discrepancy,
    Unverifiable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub status: ResultStatus,
    /// 0-100, higher is better.
    pub score: u8,
    pub findings: Vec<String>,
    pub risk_level: RiskLevel,
}

impl VerificationResult {
    /// Terminal check status implied by this result.
    pub fn check_status(&self) -> CheckStatus {
        match (self.status, self.risk_level) {
            (ResultStatus::Verified, RiskLevel::Low) => CheckStatus::Clear,
            (ResultStatus::Unverifiable, _) | (_, RiskLevel::High) => CheckStatus::Failed,
            _ => CheckStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCheck {
    pub id: String,
    pub candidate_id: String,
    pub candidate_name: String,
    #[serde(rename = "type")]
    pub kind: VerificationType,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
}

impl VerificationCheck {
    pub fn pending(candidate_id: &str, candidate_name: &str, kind: VerificationType) -> Self {
        Self {
            id: format!("{}-{}", candidate_id, kind.as_str()),
            candidate_id: candidate_id.to_string(),
            candidate_name: candidate_name.to_string(),
            kind,
            status: CheckStatus::Pending,
            result: None,
        }
    }

    pub fn begin(&mut self) -> Result<()> {
        transition(&mut self.status, CheckStatus::InProgress, &self.id)
    }

    pub fn resolve(&mut self, result: VerificationResult) -> Result<()> {
        transition(&mut self.status, result.check_status(), &self.id)?;
        self.result = Some(result);
        Ok(())
    }

    /// Returns an in-progress check to pending after a failed provider call.
    pub(crate) fn reset_after_failure(&mut self) {
        if self.status == CheckStatus::InProgress {
            self.status = CheckStatus::Pending;
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: ResultStatus, risk: RiskLevel) -> VerificationResult {
        VerificationResult {
            status,
            score: 90,
            findings: vec![],
            risk_level: risk,
        }
    }

    #[test]
    fn test_result_maps_to_terminal_status() {
        assert_eq!(
            result(ResultStatus::Verified, RiskLevel::Low).check_status(),
            CheckStatus::Clear
        );
        assert_eq!(
            result(ResultStatus::Discrepancy, RiskLevel::Medium).check_status(),
            CheckStatus::Completed
        );
        assert_eq!(
            result(ResultStatus::Verified, RiskLevel::High).check_status(),
            CheckStatus::Failed
        );
        assert_eq!(
            result(ResultStatus::Unverifiable, RiskLevel::Low).check_status(),
            CheckStatus::Failed
        );
    }

    #[test]
    fn test_check_lifecycle() {
        let mut check = VerificationCheck::pending("c1", "Ada", VerificationType::Identity);
        assert_eq!(check.id, "c1-identity");
        assert!(check
            .resolve(result(ResultStatus::Verified, RiskLevel::Low))
            .is_err());

        check.begin().unwrap();
        check
            .resolve(result(ResultStatus::Verified, RiskLevel::Low))
            .unwrap();
        assert!(check.is_terminal());
        assert!(check.begin().is_err());
    }

    #[test]
    fn test_risk_levels_are_ordered() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert_eq!(
            [RiskLevel::Low, RiskLevel::High, RiskLevel::Medium]
                .into_iter()
                .max(),
            Some(RiskLevel::High)
        );
    }
}
