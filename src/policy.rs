// src/policy.rs
//! Scoring policy: every threshold used for a categorical label lives here so it
//! can be tuned from configuration without touching the steps.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WorkflowError};
use crate::types::{AiRecommendation, OverallRating, ScoreBreakdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BiasLevel {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl fmt::Display for BiasLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BiasLevel::Excellent => "Excellent",
            BiasLevel::Good => "Good",
            BiasLevel::Fair => "Fair",
            BiasLevel::NeedsAttention => "Needs Attention",
        };
        f.write_str(s)
    }
}

/// Display colour for a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Green,
    Blue,
    Amber,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasThresholds {
    pub excellent_max: f64,
    pub good_max: f64,
    pub fair_max: f64,
}

impl Default for BiasThresholds {
    fn default() -> Self {
        Self {
            excellent_max: 3.0,
            good_max: 6.0,
            fair_max: 8.0,
        }
    }
}

/// Lower bounds, inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub strong_hire: u8,
    pub hire: u8,
    pub consider: u8,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            strong_hire: 90,
            hire: 80,
            consider: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub green: u8,
    pub blue: u8,
    pub amber: u8,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            green: 90,
            blue: 80,
            amber: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingThresholds {
    pub excellent: u8,
    pub good: u8,
    pub fair: u8,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            excellent: 85,
            good: 70,
            fair: 50,
        }
    }
}

/// Weights of the final evaluation sub-scores. Must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub resume_match: f64,
    pub technical: f64,
    pub culture: f64,
    pub experience: f64,
    pub verification: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            resume_match: 0.25,
            technical: 0.30,
            culture: 0.20,
            experience: 0.10,
            verification: 0.15,
        }
    }
}

impl ScoreWeights {
    fn total(&self) -> f64 {
        self.resume_match + self.technical + self.culture + self.experience + self.verification
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub bias: BiasThresholds,
    pub recommendation: RecommendationThresholds,
    pub bands: BandThresholds,
    pub rating: RatingThresholds,
    pub weights: ScoreWeights,
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<()> {
        let b = &self.bias;
        if !(b.excellent_max <= b.good_max && b.good_max <= b.fair_max) {
            return Err(WorkflowError::validation(
                "bias thresholds must be ascending: excellent_max <= good_max <= fair_max",
            ));
        }

        let r = &self.recommendation;
        if !(r.strong_hire >= r.hire && r.hire >= r.consider) {
            return Err(WorkflowError::validation(
                "recommendation thresholds must be descending: strong_hire >= hire >= consider",
            ));
        }

        let w = &self.weights;
        let weights = [w.resume_match, w.technical, w.culture, w.experience, w.verification];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(WorkflowError::validation("score weights must not be negative"));
        }
        if (w.total() - 1.0).abs() > 1e-6 {
            return Err(WorkflowError::validation(format!(
                "score weights must sum to 1.0, got {:.3}",
                w.total()
            )));
        }
        Ok(())
    }

    pub fn bias_level(&self, score: f64) -> BiasLevel {
        if score <= self.bias.excellent_max {
            BiasLevel::Excellent
        } else if score <= self.bias.good_max {
            BiasLevel::Good
        } else if score <= self.bias.fair_max {
            BiasLevel::Fair
        } else {
            BiasLevel::NeedsAttention
        }
    }

    pub fn recommendation(&self, overall_score: u8) -> AiRecommendation {
        let r = &self.recommendation;
        if overall_score >= r.strong_hire {
            AiRecommendation::StrongHire
        } else if overall_score >= r.hire {
            AiRecommendation::Hire
        } else if overall_score >= r.consider {
            AiRecommendation::Consider
        } else {
            AiRecommendation::Reject
        }
    }

    pub fn score_band(&self, score: u8) -> ScoreBand {
        if score >= self.bands.green {
            ScoreBand::Green
        } else if score >= self.bands.blue {
            ScoreBand::Blue
        } else if score >= self.bands.amber {
            ScoreBand::Amber
        } else {
            ScoreBand::Red
        }
    }

    pub fn rating(&self, match_score: u8) -> OverallRating {
        if match_score >= self.rating.excellent {
            OverallRating::Excellent
        } else if match_score >= self.rating.good {
            OverallRating::Good
        } else if match_score >= self.rating.fair {
            OverallRating::Fair
        } else {
            OverallRating::Poor
        }
    }

    /// Weighted overall score, rounded and clamped to 0-100.
    pub fn weighted_score(&self, scores: &ScoreBreakdown) -> u8 {
        let w = &self.weights;
        let total = scores.resume_match as f64 * w.resume_match
            + scores.technical as f64 * w.technical
            + scores.culture as f64 * w.culture
            + scores.experience as f64 * w.experience
            + scores.verification as f64 * w.verification;
        total.round().clamp(0.0, 100.0) as u8
    }
}
