// src/types/response.rs
//! Backend request and response shapes

use serde::{Deserialize, Serialize};

use super::candidate::FitScores;
use super::interview::AiAnalysis;
use super::resume::{OverallRating, ResumeAnalysis};
use crate::error::{Result, WorkflowError};

/// `{success, data, error, processing_time}` envelope returned by the AI routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time: Option<f64>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_data(self, operation: &str) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(WorkflowError::transport(format!(
                "{} returned success without data",
                operation
            ))),
            (false, _) => Err(WorkflowError::transport(format!(
                "{} failed: {}",
                operation,
                self.error.unwrap_or_else(|| "unknown error".to_string())
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub google_id: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub profile_picture_url: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct GoogleCredentialRequest<'a> {
    pub credential: &'a str,
}

/// Body of `/ai/generate-job-description`.
#[derive(Debug, Serialize)]
pub struct GenerateJdRequest<'a> {
    pub hiring_request: HiringRequest<'a>,
    pub style: &'a str,
    pub include_ai_suggestions: bool,
}

#[derive(Debug, Serialize)]
pub struct HiringRequest<'a> {
    pub position: &'a str,
    pub department: &'a str,
    pub experience_years: Option<f32>,
    pub experience_level: &'a str,
    pub skills: &'a [String],
    pub education: &'a str,
    pub location: &'a str,
    pub salary_range: &'a str,
    pub work_type: String,
}

/// `data` of `/ai/generate-job-description`.
#[derive(Debug, Deserialize)]
pub struct GeneratedJd {
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub required_qualifications: Vec<String>,
    #[serde(default)]
    pub preferred_qualifications: Vec<String>,
    #[serde(default)]
    pub ai_generated: bool,
}

impl GeneratedJd {
    /// Flattens the structured description into display text.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n\n{}\n", self.title, self.overview);
        let sections = [
            ("Responsibilities", &self.responsibilities),
            ("Required Qualifications", &self.required_qualifications),
            ("Preferred Qualifications", &self.preferred_qualifications),
        ];
        for (heading, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{}:\n", heading));
            for item in items {
                out.push_str(&format!("- {}\n", item));
            }
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct ResumeAnalysisRequest<'a> {
    pub content: &'a str,
    pub job_requirements: Option<String>,
    pub analysis_type: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CandidateMatchRequest<'a, C: Serialize, J: Serialize> {
    pub candidate_profile: &'a C,
    pub job_requirements: &'a J,
    pub matching_criteria: [&'a str; 3],
}

#[derive(Debug, Serialize)]
pub struct InterviewAnalysisRequest<'a> {
    pub transcript: Option<&'a str>,
    pub analysis_type: &'a str,
}

#[derive(Debug, Serialize)]
pub struct QuestionGenerationRequest<'a> {
    pub context: String,
    pub question_type: &'a str,
    pub count: usize,
    pub difficulty_level: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedQuestions {
    pub questions: Vec<String>,
}

/// `data` of `/ai/analyze-resume`. Identity fields are optional on the wire.
#[derive(Debug, Deserialize)]
pub struct ResumeAnalysisData {
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: f32,
    #[serde(default)]
    pub education: Vec<String>,
    pub match_score: u8,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

impl ResumeAnalysisData {
    pub fn into_analysis(self, fallback_name: &str, rating: OverallRating) -> ResumeAnalysis {
        ResumeAnalysis {
            candidate_name: self
                .candidate_name
                .unwrap_or_else(|| fallback_name.to_string()),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            skills: self.skills,
            experience_years: self.experience_years,
            education: self.education,
            match_score: self.match_score.min(100),
            highlights: self.recommendations,
            concerns: self.concerns,
            overall_rating: rating,
        }
    }
}

/// `data` of `/ai/match-candidate`.
#[derive(Debug, Deserialize)]
pub struct CandidateMatchData {
    pub overall_score: u8,
    pub skills_match: u8,
    pub experience_match: u8,
    pub culture_fit: u8,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
}

impl CandidateMatchData {
    pub fn fit(&self) -> FitScores {
        FitScores {
            culture_fit: self.culture_fit.min(100),
            technical_fit: self.skills_match.min(100),
            experience_fit: self.experience_match.min(100),
        }
    }
}

/// `data` of `/ai/analyze-interview`.
#[derive(Debug, Deserialize)]
pub struct InterviewAnalysisData {
    pub communication_score: u8,
    pub technical_score: u8,
    pub confidence_score: u8,
    #[serde(default)]
    pub problem_solving_score: Option<u8>,
    #[serde(default)]
    pub culture_fit_score: Option<u8>,
    pub overall_score: u8,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl InterviewAnalysisData {
    /// The backend reports confidence rather than problem solving when the
    /// latter is absent; its overall score stands in for cultural fit.
    pub fn into_analysis(self) -> AiAnalysis {
        AiAnalysis::new(
            self.communication_score.min(100),
            self.technical_score.min(100),
            self.problem_solving_score
                .unwrap_or(self.confidence_score)
                .min(100),
            self.culture_fit_score.unwrap_or(self.overall_score).min(100),
            self.recommendations,
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_failure_surfaces_error_text() {
        let env: ApiEnvelope<String> = serde_json::from_str(
            r#"{"success":false,"data":null,"error":"model overloaded","processing_time":0.4}"#,
        )
        .unwrap();
        let err = env.into_data("analyze-resume").unwrap_err();
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn test_envelope_success_without_data_is_an_error() {
        let env: ApiEnvelope<String> =
            serde_json::from_str(r#"{"success":true,"data":null,"error":null,"processing_time":null}"#)
                .unwrap();
        assert!(env.into_data("match-candidate").is_err());
    }

    #[test]
    fn test_backend_resume_data_maps_to_analysis() {
        let data: ResumeAnalysisData = serde_json::from_str(
            r#"{"skills":["Python"],"experience_years":5.5,"education":["BSc"],"match_score":85,"recommendations":["Strong background"]}"#,
        )
        .unwrap();
        let analysis = data.into_analysis("jane_doe.pdf", OverallRating::Good);
        assert_eq!(analysis.candidate_name, "jane_doe.pdf");
        assert_eq!(analysis.match_score, 85);
        assert_eq!(analysis.highlights, vec!["Strong background"]);
        assert!(analysis.email.is_empty());
    }

    #[test]
    fn test_interview_data_overall_is_recomputed() {
        let data: InterviewAnalysisData = serde_json::from_str(
            r#"{"communication_score":87,"technical_score":92,"confidence_score":85,"overall_score":88}"#,
        )
        .unwrap();
        let analysis = data.into_analysis();
        assert_eq!(analysis.problem_solving, 85);
        assert_eq!(analysis.cultural_fit, 88);
        assert_eq!(analysis.overall_score, 88); // (87+92+85+88)/4 = 88
    }

    #[test]
    fn test_generated_jd_render_skips_empty_sections() {
        let jd: GeneratedJd = serde_json::from_str(
            r#"{"title":"Engineer","overview":"Join us.","responsibilities":["Ship code"]}"#,
        )
        .unwrap();
        let text = jd.render();
        assert!(text.starts_with("Engineer"));
        assert!(text.contains("- Ship code"));
        assert!(!text.contains("Preferred Qualifications"));
    }
}
