// src/dashboard.rs
//! Agent tab state for the dashboard. Every update returns a new state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentTab {
    Overview,
    ResumeScanner,
    JdGenerator,
    InterviewScheduler,
    Screening,
    Shortlist,
    Analytics,
    HiringWorkflow,
    Settings,
}

impl AgentTab {
    pub const ALL: [AgentTab; 9] = [
        AgentTab::Overview,
        AgentTab::ResumeScanner,
        AgentTab::JdGenerator,
        AgentTab::InterviewScheduler,
        AgentTab::Screening,
        AgentTab::Shortlist,
        AgentTab::Analytics,
        AgentTab::HiringWorkflow,
        AgentTab::Settings,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AgentTab::Overview => "overview",
            AgentTab::ResumeScanner => "resume-scanner",
            AgentTab::JdGenerator => "jd-generator",
            AgentTab::InterviewScheduler => "interview-scheduler",
            AgentTab::Screening => "screening",
            AgentTab::Shortlist => "shortlist",
            AgentTab::Analytics => "analytics",
            AgentTab::HiringWorkflow => "hiring-workflow",
            AgentTab::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgentTab::Overview => "Overview",
            AgentTab::ResumeScanner => "Resume Scanner",
            AgentTab::JdGenerator => "JD Generator",
            AgentTab::InterviewScheduler => "Interview Scheduler",
            AgentTab::Screening => "Screening",
            AgentTab::Shortlist => "Shortlist",
            AgentTab::Analytics => "Analytics",
            AgentTab::HiringWorkflow => "Hiring Workflow",
            AgentTab::Settings => "Settings",
        }
    }
}

impl fmt::Display for AgentTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AgentTab {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentTab::ALL
            .into_iter()
            .find(|tab| tab.id() == s)
            .ok_or_else(|| WorkflowError::not_found("agent tab", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Active,
    Processing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEntry {
    pub tab: AgentTab,
    pub status: AgentStatus,
}

/// Snapshot of the nine tabs. Exactly one tab is `Active` at any time;
/// `Processing` tabs keep that status until explicitly changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    agents: Vec<AgentEntry>,
    active: AgentTab,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(AgentTab::Overview)
    }
}

impl DashboardState {
    pub fn new(active: AgentTab) -> Self {
        let agents = AgentTab::ALL
            .into_iter()
            .map(|tab| AgentEntry {
                tab,
                status: if tab == active {
                    AgentStatus::Active
                } else {
                    AgentStatus::Idle
                },
            })
            .collect();
        Self { agents, active }
    }

    pub fn active(&self) -> AgentTab {
        self.active
    }

    pub fn agents(&self) -> &[AgentEntry] {
        &self.agents
    }

    pub fn status(&self, tab: AgentTab) -> AgentStatus {
        self.agents
            .iter()
            .find(|a| a.tab == tab)
            .map(|a| a.status)
            .unwrap_or_default()
    }

    /// Makes `tab` the active tab. The previously active tab goes idle unless
    /// it is still processing.
    #[must_use]
    pub fn select(&self, tab: AgentTab) -> Self {
        let agents = self
            .agents
            .iter()
            .map(|a| {
                let status = if a.tab == tab {
                    AgentStatus::Active
                } else if a.status == AgentStatus::Active {
                    AgentStatus::Idle
                } else {
                    a.status
                };
                AgentEntry { tab: a.tab, status }
            })
            .collect();
        Self {
            agents,
            active: tab,
        }
    }

    /// Sets the status of a non-active tab. Marking a tab `Active` is the same
    /// as selecting it; the active tab only changes through `select`.
    #[must_use]
    pub fn with_status(&self, tab: AgentTab, status: AgentStatus) -> Self {
        if status == AgentStatus::Active {
            return self.select(tab);
        }
        if tab == self.active {
            return self.clone();
        }
        let agents = self
            .agents
            .iter()
            .map(|a| AgentEntry {
                tab: a.tab,
                status: if a.tab == tab { status } else { a.status },
            })
            .collect();
        Self {
            agents,
            active: self.active,
        }
    }

    pub fn processing(&self) -> impl Iterator<Item = AgentTab> + '_ {
        self.agents
            .iter()
            .filter(|a| a.status == AgentStatus::Processing)
            .map(|a| a.tab)
    }
}
