// src/lib.rs
//! Hiring workflow core: seven ordered steps from job description to final
//! decision, with pluggable analysis, scheduling and verification providers.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod providers;
pub mod session;
pub mod status;
pub mod tasks;
pub mod types;
pub mod workflow;

pub use config::ConfigManager;
pub use dashboard::{AgentStatus, AgentTab, DashboardState};
pub use error::{Result, WorkflowError};
pub use policy::{BiasLevel, ScoreBand, ScoringPolicy};
pub use providers::{
    AnalysisProvider, HttpProvider, SchedulingProvider, SimulatedProvider, VerificationProvider,
};
pub use session::{SessionStore, StoredSession};
pub use tasks::{OperationHandle, OperationTracker};
pub use workflow::{StepKey, StepPayload, WorkflowOrchestrator, WorkflowState, WorkflowStep};
