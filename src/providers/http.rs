// src/providers/http.rs
//! REST backend client. Uses JSON for every call and the backend's
//! `{success, data, error}` envelope for the AI routes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, trace};

use super::AnalysisProvider;
use crate::config::ServiceConfig;
use crate::error::{Result, WorkflowError};
use crate::policy::ScoringPolicy;
use crate::types::response::{
    ApiEnvelope, AuthResponse, CandidateMatchData, CandidateMatchRequest, GenerateJdRequest,
    GeneratedJd, GeneratedQuestions, GoogleCredentialRequest, HiringRequest, InterviewAnalysisData,
    InterviewAnalysisRequest, QuestionGenerationRequest, ResumeAnalysisData,
    ResumeAnalysisRequest,
};
use crate::types::{
    AiAnalysis, Candidate, FitScores, InterviewSession, InterviewType, JobRequirements,
    ResumeAnalysis, ResumeRecord,
};

const GENERATE_JD_ENDPOINT: &str = "/api/v1/ai/generate-job-description";
const ANALYZE_RESUME_ENDPOINT: &str = "/api/v1/ai/analyze-resume";
const MATCH_CANDIDATE_ENDPOINT: &str = "/api/v1/ai/match-candidate";
const ANALYZE_INTERVIEW_ENDPOINT: &str = "/api/v1/ai/analyze-interview";
const GENERATE_QUESTIONS_ENDPOINT: &str = "/api/v1/ai/generate-questions";
const GOOGLE_AUTH_ENDPOINT: &str = "/api/v1/auth/google";

pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    policy: ScoringPolicy,
}

impl HttpProvider {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
            policy: ScoringPolicy::default(),
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges a Google ID token for a backend session token.
    pub async fn login_with_google(&self, credential: &str) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .post(GOOGLE_AUTH_ENDPOINT, &GoogleCredentialRequest { credential })
            .await?;
        if !auth.success {
            return Err(WorkflowError::Network {
                status: 401,
                message: "Google sign-in was rejected".to_string(),
            });
        }
        info!("Signed in as {}", auth.user.email);
        Ok(auth)
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("Calling backend: {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        trace!("Response status: {}", status);

        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| {
                error!("Unexpected response from {}: {}", endpoint, e);
                WorkflowError::Network {
                    status: status.as_u16(),
                    message: format!("failed to parse response from {}: {}", endpoint, e),
                }
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Backend error from {}: {} {}", endpoint, status, error_text);
            Err(WorkflowError::Network {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }

    async fn post_enveloped<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let envelope: ApiEnvelope<T> = self.post(endpoint, body).await?;
        if let Some(seconds) = envelope.processing_time {
            trace!("{} processed in {:.2}s", endpoint, seconds);
        }
        envelope.into_data(endpoint)
    }
}

#[async_trait]
impl AnalysisProvider for HttpProvider {
    async fn generate_job_description(&self, requirements: &JobRequirements) -> Result<String> {
        let request = GenerateJdRequest {
            hiring_request: HiringRequest {
                position: &requirements.role,
                department: &requirements.department,
                experience_years: requirements.min_experience_years(),
                experience_level: &requirements.experience,
                skills: &requirements.skills,
                education: &requirements.education,
                location: &requirements.location,
                salary_range: &requirements.salary,
                work_type: requirements.work_type.to_string(),
            },
            style: "professional",
            include_ai_suggestions: true,
        };
        let jd: GeneratedJd = self.post_enveloped(GENERATE_JD_ENDPOINT, &request).await?;
        trace!("Generated '{}' (ai_generated: {})", jd.title, jd.ai_generated);
        Ok(jd.render())
    }

    async fn analyze_resume(
        &self,
        resume: &ResumeRecord,
        requirements: &JobRequirements,
    ) -> Result<ResumeAnalysis> {
        let content = resume.content.as_deref().ok_or_else(|| {
            WorkflowError::validation(format!(
                "resume {} has no extracted text to analyse",
                resume.file_name
            ))
        })?;
        let request = ResumeAnalysisRequest {
            content,
            job_requirements: serde_json::to_string(requirements).ok(),
            analysis_type: "comprehensive",
        };
        let data: ResumeAnalysisData = self
            .post_enveloped(ANALYZE_RESUME_ENDPOINT, &request)
            .await?;
        let rating = self.policy.rating(data.match_score.min(100));
        Ok(data.into_analysis(&resume.file_name, rating))
    }

    async fn match_candidate(
        &self,
        candidate: &Candidate,
        requirements: &JobRequirements,
    ) -> Result<FitScores> {
        let request = CandidateMatchRequest {
            candidate_profile: candidate,
            job_requirements: requirements,
            matching_criteria: ["skills", "experience", "culture_fit"],
        };
        let data: CandidateMatchData = self
            .post_enveloped(MATCH_CANDIDATE_ENDPOINT, &request)
            .await?;
        trace!(
            "Match for {}: overall {}, missing {:?}",
            candidate.id,
            data.overall_score,
            data.missing_skills
        );
        Ok(data.fit())
    }

    async fn analyze_interview(&self, session: &InterviewSession) -> Result<AiAnalysis> {
        let transcript = (!session.questions.is_empty()).then(|| session.questions.join("\n"));
        let request = InterviewAnalysisRequest {
            transcript: transcript.as_deref(),
            analysis_type: "multimodal",
        };
        let data: InterviewAnalysisData = self
            .post_enveloped(ANALYZE_INTERVIEW_ENDPOINT, &request)
            .await?;
        Ok(data.into_analysis())
    }

    async fn generate_interview_questions(
        &self,
        candidate: &Candidate,
        interview_type: InterviewType,
        count: usize,
    ) -> Result<Vec<String>> {
        let request = QuestionGenerationRequest {
            context: format!(
                "{} interview with {} ({} years; skills: {})",
                interview_type.as_str(),
                candidate.name,
                candidate.experience_years,
                candidate.skills.join(", ")
            ),
            question_type: interview_type.as_str(),
            count,
            difficulty_level: "adaptive",
        };
        // this route answers with `questions` at the top level, not in `data`
        let generated: GeneratedQuestions =
            self.post(GENERATE_QUESTIONS_ENDPOINT, &request).await?;
        Ok(generated.questions.into_iter().take(count).collect())
    }
}
