// src/types/job.rs
//! Job requirements and the generated job description (step 1)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Remote,
    #[default]
    Hybrid,
    Onsite,
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkType::Remote => "remote",
            WorkType::Hybrid => "hybrid",
            WorkType::Onsite => "onsite",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobRequirements {
    pub role: String,
    pub department: String,
    /// Experience bracket such as "3-5".
    pub experience: String,
    pub skills: Vec<String>,
    pub education: String,
    pub location: String,
    pub salary: String,
    pub work_type: WorkType,
}

impl JobRequirements {
    pub fn new(role: &str, department: &str, experience: &str) -> Self {
        Self {
            role: role.to_string(),
            department: department.to_string(),
            experience: experience.to_string(),
            ..Default::default()
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for skill in skills {
            self.add_skill(skill.as_ref());
        }
        self
    }

    /// Adds a skill unless an equal one (ignoring case) is already present.
    /// Returns whether the set changed.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.has_skill(skill) {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills
            .retain(|s| !s.eq_ignore_ascii_case(skill.trim()));
        before != self.skills.len()
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s.eq_ignore_ascii_case(skill))
    }

    /// Lower bound of the experience bracket ("3-5" -> 3, "10+" -> 10).
    pub fn min_experience_years(&self) -> Option<f32> {
        let lower = self
            .experience
            .split(|c: char| c == '-' || c == '+' || c.is_whitespace())
            .next()?;
        lower.trim().parse().ok()
    }

    /// Requirements used when a step runs without a stored job description.
    pub fn placeholder() -> Self {
        Self {
            role: "Software Engineer".to_string(),
            department: "Engineering".to_string(),
            experience: "3-5".to_string(),
            skills: vec![
                "JavaScript".to_string(),
                "React".to_string(),
                "Node.js".to_string(),
            ],
            education: "Bachelor's degree in Computer Science or equivalent".to_string(),
            location: "San Francisco, CA".to_string(),
            salary: "$120,000 - $150,000".to_string(),
            work_type: WorkType::Hybrid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionPayload {
    pub requirements: JobRequirements,
    pub job_description: String,
    pub timestamp: DateTime<Utc>,
}
