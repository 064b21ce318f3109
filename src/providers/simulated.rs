// src/providers/simulated.rs
//! Deterministic stand-in for the AI backend, scheduling and screening vendors.
//!
//! Every result is drawn from a `StdRng` seeded with the configured seed and the
//! id of the entity being processed, so the same input always yields the same
//! output.

use async_trait::async_trait;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tracing::debug;

use super::{AnalysisProvider, SchedulingProvider, VerificationProvider};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::policy::ScoringPolicy;
use crate::types::{
    AiAnalysis, Candidate, FitScores, InterviewSession, InterviewSlot, InterviewType,
    JobRequirements, ResultStatus, ResumeAnalysis, ResumeRecord, RiskLevel, VerificationResult,
    VerificationType,
};

const EXTRA_SKILLS: &[&str] = &[
    "TypeScript",
    "Python",
    "Docker",
    "Kubernetes",
    "PostgreSQL",
    "GraphQL",
    "AWS",
    "CI/CD",
];

const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "Seattle, WA",
    "Austin, TX",
    "New York, NY",
    "Remote",
];

const INTERVIEWERS: &[&str] = &["Alex Thompson", "Priya Patel", "Jordan Lee", "Maria Garcia"];

const STRENGTHS: &[&str] = &[
    "Clear, structured communication",
    "Strong system design fundamentals",
    "Asks good clarifying questions",
    "Solid debugging approach",
    "Good collaboration examples",
];

const IMPROVEMENTS: &[&str] = &[
    "Could go deeper on testing strategy",
    "Limited exposure to large-scale systems",
    "Answers occasionally lacked concrete examples",
    "Could improve time management on exercises",
];

const SLOT_TIMES: [&str; 2] = ["10:00", "14:00"];

#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    delay: Duration,
    seed: u64,
    policy: ScoringPolicy,
}

impl SimulatedProvider {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            seed: config.seed,
            policy: ScoringPolicy::default(),
        }
    }

    /// No artificial latency; useful in tests.
    pub fn instant(seed: u64) -> Self {
        Self {
            delay: Duration::ZERO,
            seed,
            policy: ScoringPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn rng(&self, entity: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        entity.hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// "jane_doe-cv.pdf" -> "Jane Doe Cv"
fn name_from_file(file_name: &str) -> String {
    let stem = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    stem.split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn skill_overlap(candidate_skills: &[String], requirements: &JobRequirements) -> f64 {
    if requirements.skills.is_empty() {
        return 1.0;
    }
    let matched = requirements
        .skills
        .iter()
        .filter(|s| candidate_skills.iter().any(|c| c.eq_ignore_ascii_case(s)))
        .count();
    matched as f64 / requirements.skills.len() as f64
}

fn next_business_day(mut date: NaiveDate) -> NaiveDate {
    loop {
        date += ChronoDuration::days(1);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return date;
        }
    }
}

#[async_trait]
impl AnalysisProvider for SimulatedProvider {
    async fn generate_job_description(&self, requirements: &JobRequirements) -> Result<String> {
        self.pause().await;
        let skills = if requirements.skills.is_empty() {
            "a modern engineering toolset".to_string()
        } else {
            requirements.skills.join(", ")
        };
        let location = if requirements.location.is_empty() {
            "our offices".to_string()
        } else {
            requirements.location.clone()
        };

        let mut text = format!(
            "{role}\n\nOur {department} team is looking for a {role} with {experience} years of \
             experience to join us in a {work_type} role based in {location}.\n\n\
             Responsibilities:\n\
             - Design, build and maintain features end to end\n\
             - Collaborate with product and design on requirements\n\
             - Review code and mentor teammates\n\n\
             Requirements:\n\
             - {experience} years of professional experience\n\
             - Hands-on experience with {skills}\n",
            role = requirements.role,
            department = requirements.department,
            experience = requirements.experience,
            work_type = requirements.work_type,
            location = location,
            skills = skills,
        );
        if !requirements.education.is_empty() {
            text.push_str(&format!("- {}\n", requirements.education));
        }
        if !requirements.salary.is_empty() {
            text.push_str(&format!("\nCompensation: {}\n", requirements.salary));
        }
        text.push_str("\nWe are an equal opportunity employer.\n");
        Ok(text)
    }

    async fn analyze_resume(
        &self,
        resume: &ResumeRecord,
        requirements: &JobRequirements,
    ) -> Result<ResumeAnalysis> {
        self.pause().await;
        let mut rng = self.rng(&resume.file_name);

        let mut skills: Vec<String> = requirements
            .skills
            .iter()
            .filter(|_| rng.gen_bool(0.75))
            .cloned()
            .collect();
        for extra in EXTRA_SKILLS.choose_multiple(&mut rng, 2) {
            if !skills.iter().any(|s| s.eq_ignore_ascii_case(extra)) {
                skills.push(extra.to_string());
            }
        }

        let experience_years = rng.gen_range(1..=12) as f32;
        let overlap = skill_overlap(&skills, requirements);
        let match_score = (55.0 + overlap * 30.0 + rng.gen_range(0.0..15.0))
            .round()
            .clamp(0.0, 100.0) as u8;

        let mut highlights = vec![format!("{} years of relevant experience", experience_years)];
        let mut concerns = Vec::new();
        if overlap >= 0.75 {
            highlights.push("Strong skill alignment with the role".to_string());
        } else {
            concerns.push("Missing some required skills".to_string());
        }
        if let Some(min) = requirements.min_experience_years() {
            if experience_years < min {
                concerns.push(format!("Below the {}+ years requested", min));
            }
        }

        let candidate_name = name_from_file(&resume.file_name);
        let email = format!("{}@example.com", candidate_name.to_lowercase().replace(' ', "."));
        debug!(
            "Simulated analysis for {}: match score {}",
            resume.file_name, match_score
        );

        Ok(ResumeAnalysis {
            candidate_name,
            email,
            phone: format!("+1 555 {:04}", rng.gen_range(0..10_000)),
            location: LOCATIONS
                .choose(&mut rng)
                .map(|l| l.to_string())
                .unwrap_or_default(),
            skills,
            experience_years,
            education: vec!["B.S. Computer Science".to_string()],
            match_score,
            highlights,
            concerns,
            overall_rating: self.policy.rating(match_score),
        })
    }

    async fn match_candidate(
        &self,
        candidate: &Candidate,
        requirements: &JobRequirements,
    ) -> Result<FitScores> {
        self.pause().await;
        let mut rng = self.rng(&format!("match-{}", candidate.id));

        let overlap = skill_overlap(&candidate.skills, requirements);
        let technical_fit = (60.0 + overlap * 30.0 + rng.gen_range(0.0..10.0)).round() as u8;

        let experience_fit = match requirements.min_experience_years() {
            Some(min) if candidate.experience_years < min => {
                (70.0 - (min - candidate.experience_years) as f64 * 8.0).max(40.0) as u8
            }
            _ => rng.gen_range(80..=98),
        };

        Ok(FitScores {
            culture_fit: rng.gen_range(70..=95),
            technical_fit: technical_fit.min(100),
            experience_fit,
        })
    }

    async fn analyze_interview(&self, session: &InterviewSession) -> Result<AiAnalysis> {
        self.pause().await;
        let mut rng = self.rng(&session.id);
        let strengths = STRENGTHS
            .choose_multiple(&mut rng, 2)
            .map(|s| s.to_string())
            .collect();
        let improvements = IMPROVEMENTS
            .choose_multiple(&mut rng, 1)
            .map(|s| s.to_string())
            .collect();
        Ok(AiAnalysis::new(
            rng.gen_range(65..=98),
            rng.gen_range(65..=98),
            rng.gen_range(65..=98),
            rng.gen_range(65..=98),
            strengths,
            improvements,
        ))
    }

    async fn generate_interview_questions(
        &self,
        candidate: &Candidate,
        interview_type: InterviewType,
        count: usize,
    ) -> Result<Vec<String>> {
        self.pause().await;
        let mut questions: Vec<String> = candidate
            .skills
            .iter()
            .map(|skill| format!("Walk me through a project where you relied on {}.", skill))
            .collect();
        match interview_type {
            InterviewType::Phone => {
                questions.push("What drew you to this role?".to_string());
                questions.push("What are your salary expectations?".to_string());
            }
            InterviewType::Video | InterviewType::Onsite => {
                questions.push("How would you optimize a slow database query?".to_string());
                questions.push("Describe a production incident you helped resolve.".to_string());
                questions.push("What's your approach to code review?".to_string());
            }
        }
        questions.truncate(count);
        Ok(questions)
    }
}

#[async_trait]
impl SchedulingProvider for SimulatedProvider {
    async fn available_slots(&self, candidates: &[Candidate]) -> Result<Vec<InterviewSlot>> {
        self.pause().await;
        let wanted = std::cmp::max(4, candidates.len() * 2);
        let types = [InterviewType::Video, InterviewType::Phone, InterviewType::Onsite];

        let mut date = Utc::now().date_naive();
        let mut slots = Vec::with_capacity(wanted);
        for n in 0..wanted {
            if n % SLOT_TIMES.len() == 0 {
                date = next_business_day(date);
            }
            slots.push(InterviewSlot::available(
                &format!("slot-{}", n + 1),
                date,
                SLOT_TIMES[n % SLOT_TIMES.len()],
                INTERVIEWERS[n % INTERVIEWERS.len()],
                types[n % types.len()],
            ));
        }
        Ok(slots)
    }
}

#[async_trait]
impl VerificationProvider for SimulatedProvider {
    async fn run_check(
        &self,
        candidate_id: &str,
        candidate_name: &str,
        kind: VerificationType,
    ) -> Result<VerificationResult> {
        self.pause().await;
        let mut rng = self.rng(&format!("{}-{}", candidate_id, kind.as_str()));
        let roll: f64 = rng.gen();

        let result = if roll < 0.7 {
            VerificationResult {
                status: ResultStatus::Verified,
                score: rng.gen_range(85..=100),
                findings: vec![format!("{} check passed", kind.as_str())],
                risk_level: RiskLevel::Low,
            }
        } else if roll < 0.9 {
            VerificationResult {
                status: ResultStatus::Discrepancy,
                score: rng.gen_range(60..=84),
                findings: vec![format!(
                    "Minor {} discrepancy for {}",
                    kind.as_str(),
                    candidate_name
                )],
                risk_level: RiskLevel::Medium,
            }
        } else {
            VerificationResult {
                status: ResultStatus::Unverifiable,
                score: rng.gen_range(30..=59),
                findings: vec![format!("Could not verify {} records", kind.as_str())],
                risk_level: RiskLevel::High,
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_file() {
        assert_eq!(name_from_file("jane_doe.pdf"), "Jane Doe");
        assert_eq!(name_from_file("JOHN-SMITH.docx"), "John Smith");
    }

    #[tokio::test]
    async fn test_same_seed_same_result() {
        let requirements = JobRequirements::new("Engineer", "Eng", "3-5").with_skills(["React"]);
        let resume = ResumeRecord::new("jane_doe.pdf").unwrap();

        let a = SimulatedProvider::instant(7)
            .analyze_resume(&resume, &requirements)
            .await
            .unwrap();
        let b = SimulatedProvider::instant(7)
            .analyze_resume(&resume, &requirements)
            .await
            .unwrap();
        assert_eq!(a, b);
        assert!(a.match_score <= 100);
        assert_eq!(a.candidate_name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_generated_description_mentions_role_and_skills() {
        let requirements = JobRequirements::new("Engineer", "Eng", "3-5").with_skills(["React"]);
        let text = SimulatedProvider::instant(1)
            .generate_job_description(&requirements)
            .await
            .unwrap();
        assert!(text.starts_with("Engineer"));
        assert!(text.contains("React"));
    }

    #[tokio::test]
    async fn test_slots_are_available_on_weekdays() {
        let slots = SimulatedProvider::instant(1)
            .available_slots(&Candidate::placeholders())
            .await
            .unwrap();
        assert_eq!(slots.len(), 6);
        assert!(slots
            .iter()
            .all(|s| !matches!(s.date.weekday(), Weekday::Sat | Weekday::Sun)));
        let ids: std::collections::HashSet<_> = slots.iter().map(|s| &s.id).collect();
        assert_eq!(ids.len(), slots.len());
    }

    #[tokio::test]
    async fn test_interview_overall_is_mean_of_subscores() {
        let slot = InterviewSlot::available(
            "slot-1",
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            "10:00",
            "Alex Thompson",
            InterviewType::Video,
        );
        let session = InterviewSession::for_slot(&slot, "c1", "Ada");
        let a = SimulatedProvider::instant(3)
            .analyze_interview(&session)
            .await
            .unwrap();
        let expected = crate::metrics::rounded_mean(&[
            a.communication as f64,
            a.technical as f64,
            a.problem_solving as f64,
            a.cultural_fit as f64,
        ]);
        assert_eq!(a.overall_score, expected);
    }

    #[tokio::test]
    async fn test_check_result_is_consistent_with_risk() {
        let provider = SimulatedProvider::instant(11);
        for kind in VerificationType::ALL {
            let result = provider.run_check("c1", "Ada", kind).await.unwrap();
            match result.status {
                ResultStatus::Verified => assert_eq!(result.risk_level, RiskLevel::Low),
                ResultStatus::Discrepancy => assert_eq!(result.risk_level, RiskLevel::Medium),
                ResultStatus::Unverifiable => assert_eq!(result.risk_level, RiskLevel::High),
            }
        }
    }
}
