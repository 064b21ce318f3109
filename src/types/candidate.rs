// src/types/candidate.rs
//! Candidate record carried from matching (step 3) to the final decision

use serde::{Deserialize, Serialize};

use super::decision::FinalDecision;
use super::resume::{OverallRating, ResumeAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitScores {
    pub culture_fit: u8,
    pub technical_fit: u8,
    pub experience_fit: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: String,
    pub skills: Vec<String>,
    pub experience_years: f32,
    pub education: Vec<String>,
    pub match_score: u8,
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
    pub overall_rating: OverallRating,
    /// Absent until the candidate has been matched.
    #[serde(flatten)]
    pub fit: Option<FitScores>,
    pub is_selected: bool,

    // Filled in by later steps on their own copies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_slot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_decision: Option<FinalDecision>,
}

impl Candidate {
    /// Candidate id reuses the resume id so every step can join on it.
    pub fn from_analysis(resume_id: &str, analysis: &ResumeAnalysis) -> Self {
        Self {
            id: resume_id.to_string(),
            name: analysis.candidate_name.clone(),
            email: analysis.email.clone(),
            location: analysis.location.clone(),
            skills: analysis.skills.clone(),
            experience_years: analysis.experience_years,
            education: analysis.education.clone(),
            match_score: analysis.match_score,
            highlights: analysis.highlights.clone(),
            concerns: analysis.concerns.clone(),
            overall_rating: analysis.overall_rating,
            fit: None,
            is_selected: false,
            interview_slot_id: None,
            interview_score: None,
            compliance_score: None,
            final_decision: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.fit.is_some()
    }

    /// Fixed candidate pool used when no resume analysis is available upstream.
    pub fn placeholders() -> Vec<Candidate> {
        let seeds: [(&str, &str, &str, &[&str], f32, u8, OverallRating); 3] = [
            (
                "placeholder-1",
                "Sarah Johnson",
                "San Francisco, CA",
                &["React", "TypeScript", "Node.js", "AWS"],
                6.0,
                92,
                OverallRating::Excellent,
            ),
            (
                "placeholder-2",
                "Michael Chen",
                "Seattle, WA",
                &["Python", "Django", "PostgreSQL", "Docker"],
                4.0,
                85,
                OverallRating::Good,
            ),
            (
                "placeholder-3",
                "Emily Rodriguez",
                "Austin, TX",
                &["JavaScript", "Vue.js", "CSS"],
                2.0,
                71,
                OverallRating::Fair,
            ),
        ];

        seeds
            .iter()
            .map(|(id, name, location, skills, years, score, rating)| {
                let analysis = ResumeAnalysis {
                    candidate_name: name.to_string(),
                    email: format!(
                        "{}@example.com",
                        name.to_lowercase().replace(' ', ".")
                    ),
                    phone: String::new(),
                    location: location.to_string(),
                    skills: skills.iter().map(|s| s.to_string()).collect(),
                    experience_years: *years,
                    education: vec!["B.S. Computer Science".to_string()],
                    match_score: *score,
                    highlights: vec![format!("{} years of relevant experience", years)],
                    concerns: Vec::new(),
                    overall_rating: *rating,
                };
                Candidate::from_analysis(id, &analysis)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_stable() {
        let first = Candidate::placeholders();
        let second = Candidate::placeholders();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].email, "sarah.johnson@example.com");
        assert!(first.iter().all(|c| !c.is_selected && !c.is_matched()));
    }

    #[test]
    fn test_fit_scores_flatten_into_candidate_json() {
        let mut candidate = Candidate::placeholders().remove(0);
        assert!(serde_json::to_value(&candidate).unwrap().get("cultureFit").is_none());

        candidate.fit = Some(FitScores {
            culture_fit: 80,
            technical_fit: 0,
            experience_fit: 75,
        });
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["cultureFit"], 80);
        assert_eq!(json["technicalFit"], 0);
        assert_eq!(json["isSelected"], false);
        assert!(json.get("finalDecision").is_none());

        let back: Candidate = serde_json::from_value(json).unwrap();
        assert_eq!(back.fit, candidate.fit);
        assert!(back.is_matched());
    }
}
