// src/metrics.rs
//! Aggregate metrics. Every value here is recomputed from the entity list it
//! summarises and never stored alongside it.

use serde::Serialize;
use std::collections::HashMap;

use crate::types::{
    Candidate, CandidateEvaluation, FinalDecision, ResumeAnalysis, RiskLevel, VerificationCheck,
};

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of 0-100 scores rounded to the nearest integer.
pub fn rounded_mean(values: &[f64]) -> u8 {
    mean(values).round().clamp(0.0, 100.0) as u8
}

pub fn average_match_score<'a, I>(analyses: I) -> u8
where
    I: IntoIterator<Item = &'a ResumeAnalysis>,
{
    let scores: Vec<f64> = analyses
        .into_iter()
        .map(|a| a.match_score as f64)
        .collect();
    rounded_mean(&scores)
}

/// Percentage of decided candidates that were hired; 0 when nobody is decided.
pub fn hire_rate(evaluations: &[CandidateEvaluation]) -> f64 {
    let decided: Vec<FinalDecision> = evaluations
        .iter()
        .filter_map(|e| e.final_decision())
        .collect();
    if decided.is_empty() {
        return 0.0;
    }
    let hired = decided
        .iter()
        .filter(|d| **d == FinalDecision::Hired)
        .count();
    hired as f64 * 100.0 / decided.len() as f64
}

/// Mean result score over the checks that produced a result.
pub fn compliance_score<'a, I>(checks: I) -> u8
where
    I: IntoIterator<Item = &'a VerificationCheck>,
{
    let scores: Vec<f64> = checks
        .into_iter()
        .filter_map(|c| c.result.as_ref())
        .map(|r| r.score as f64)
        .collect();
    rounded_mean(&scores)
}

/// Compliance shortfall on the 0-10 scale the bias bands are expressed in.
pub fn compliance_risk_index(compliance_score: u8) -> f64 {
    (100.0 - compliance_score as f64) / 10.0
}

/// Worst risk reported by any resolved check.
pub fn overall_risk<'a, I>(checks: I) -> Option<RiskLevel>
where
    I: IntoIterator<Item = &'a VerificationCheck>,
{
    checks
        .into_iter()
        .filter_map(|c| c.result.as_ref().map(|r| r.risk_level))
        .max()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    pub average_match_score: f64,
    pub highest_match_score: u8,
    pub lowest_match_score: u8,
    pub total_candidates: usize,
    pub common_highlights: Vec<String>,
    pub common_concerns: Vec<String>,
}

pub fn compare_candidates(candidates: &[Candidate]) -> ComparisonMetrics {
    let scores: Vec<f64> = candidates.iter().map(|c| c.match_score as f64).collect();
    let highlights: Vec<&[String]> = candidates.iter().map(|c| c.highlights.as_slice()).collect();
    let concerns: Vec<&[String]> = candidates.iter().map(|c| c.concerns.as_slice()).collect();

    ComparisonMetrics {
        average_match_score: mean(&scores),
        highest_match_score: candidates.iter().map(|c| c.match_score).max().unwrap_or(0),
        lowest_match_score: candidates.iter().map(|c| c.match_score).min().unwrap_or(0),
        total_candidates: candidates.len(),
        common_highlights: common_elements(&highlights),
        common_concerns: common_elements(&concerns),
    }
}

/// Elements that occur in at least half of the lists (minimum once), in
/// first-seen order.
pub fn common_elements(lists: &[&[String]]) -> Vec<String> {
    if lists.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<&String> = Vec::new();
    let mut counts: HashMap<&String, usize> = HashMap::new();
    for list in lists {
        for element in list.iter() {
            let count = counts.entry(element).or_insert(0);
            if *count == 0 {
                order.push(element);
            }
            *count += 1;
        }
    }

    let threshold = std::cmp::max(1, lists.len() / 2);
    order
        .into_iter()
        .filter(|e| counts.get(e).copied().unwrap_or(0) >= threshold)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AiRecommendation, DecisionStatus, ResultStatus, ScoreBreakdown, VerificationResult,
        VerificationType,
    };

    #[test]
    fn test_empty_inputs_yield_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert!(!mean(&[]).is_nan());
        assert_eq!(rounded_mean(&[]), 0);
        assert_eq!(average_match_score(&[] as &[ResumeAnalysis]), 0);
        assert_eq!(hire_rate(&[]), 0.0);
        assert_eq!(compliance_score(&[] as &[VerificationCheck]), 0);
        assert_eq!(overall_risk(&[] as &[VerificationCheck]), None);

        let metrics = compare_candidates(&[]);
        assert_eq!(metrics.total_candidates, 0);
        assert_eq!(metrics.highest_match_score, 0);
        assert_eq!(metrics.average_match_score, 0.0);
    }

    #[test]
    fn test_rounded_mean_rounds_to_nearest() {
        assert_eq!(rounded_mean(&[85.0, 90.0, 78.0]), 84); // 84.33
        assert_eq!(rounded_mean(&[85.0, 86.0]), 86); // 85.5
        assert_eq!(rounded_mean(&[70.0, 71.0, 71.0]), 71); // 70.67
    }

    fn evaluation(id: &str, decision: Option<FinalDecision>) -> CandidateEvaluation {
        let status = decision.map(DecisionStatus::from).unwrap_or_default();
        CandidateEvaluation {
            candidate_id: id.into(),
            candidate_name: id.into(),
            scores: ScoreBreakdown::default(),
            overall_score: 80,
            ai_recommendation: AiRecommendation::Hire,
            status,
            decision: decision.map(|d| crate::types::DecisionRecord {
                decision: d,
                reason: "test".into(),
                decided_at: chrono::Utc::now(),
                offer: None,
            }),
        }
    }

    #[test]
    fn test_hire_rate_counts_only_decided() {
        let evals = vec![
            evaluation("a", Some(FinalDecision::Hired)),
            evaluation("b", Some(FinalDecision::Rejected)),
            evaluation("c", Some(FinalDecision::Hired)),
            evaluation("d", None),
        ];
        let rate = hire_rate(&evals);
        assert!((rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_compliance_and_risk() {
        let mut a = VerificationCheck::pending("c1", "Ada", VerificationType::Employment);
        a.result = Some(VerificationResult {
            status: ResultStatus::Verified,
            score: 95,
            findings: vec![],
            risk_level: RiskLevel::Low,
        });
        let mut b = VerificationCheck::pending("c1", "Ada", VerificationType::Credit);
        b.result = Some(VerificationResult {
            status: ResultStatus::Discrepancy,
            score: 70,
            findings: vec!["late payments".into()],
            risk_level: RiskLevel::Medium,
        });
        let pending = VerificationCheck::pending("c1", "Ada", VerificationType::Criminal);

        let checks = [a, b, pending];
        assert_eq!(compliance_score(&checks), 83); // 82.5
        assert_eq!(overall_risk(&checks), Some(RiskLevel::Medium));
        assert!((compliance_risk_index(83) - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_common_elements_threshold() {
        let a = vec!["Rust".to_string(), "Leadership".to_string()];
        let b = vec!["Rust".to_string()];
        let c = vec!["Go".to_string()];
        let d = vec!["Leadership".to_string(), "Rust".to_string()];
        let lists = [a.as_slice(), b.as_slice(), c.as_slice(), d.as_slice()];
        // threshold = 2
        assert_eq!(common_elements(&lists), vec!["Rust", "Leadership"]);

        let single = [c.as_slice()];
        assert_eq!(common_elements(&single), vec!["Go"]);
    }
}
