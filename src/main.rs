// src/main.rs
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use hireflow::policy::ScoringPolicy;
use hireflow::types::{
    AiRecommendation, CandidateEvaluation, CompensationOffer, Decision, FinalDecision,
    JobRequirements, ResumeRecord,
};
use hireflow::workflow::{
    BackgroundVerificationStep, BatchReport, CandidateMatchingStep, FinalDecisionStep,
    InterviewAssessmentStep, InterviewSchedulingStep, JobDescriptionStep, ResumeScanStep,
};
use hireflow::{
    AnalysisProvider, ConfigManager, HttpProvider, SessionStore, SimulatedProvider,
    WorkflowOrchestrator,
};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "/tmp/hireflow.log";
const QUESTIONS_PER_INTERVIEW: usize = 3;
const OFFER_START_DAYS: i64 = 30;

#[derive(Parser)]
#[command(name = "hireflow")]
#[command(about = "Run the seven-step hiring workflow")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every step end to end and print the collected workflow data
    Run(RunArgs),
    /// Show the recommendation and colour band for an overall score
    Recommend {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        score: u8,
    },
    /// Print the active scoring policy as YAML
    Policy,
    /// Manage the stored sign-in session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show who is signed in and until when
    Show,
    /// Exchange a Google credential for a backend session
    Login { credential: String },
    /// Forget the stored session
    Clear,
}

#[derive(clap::Args)]
struct RunArgs {
    #[arg(long, default_value = "Software Engineer")]
    role: String,

    #[arg(long, default_value = "Engineering")]
    department: String,

    #[arg(long, default_value = "3-5")]
    experience: String,

    #[arg(long, value_delimiter = ',', default_value = "JavaScript,React,Node.js")]
    skills: Vec<String>,

    /// Number of generated resumes when no files are given
    #[arg(long, default_value_t = 5)]
    resumes: usize,

    /// Plain-text resumes to analyse instead of generated ones
    #[arg(long = "resume-file")]
    resume_files: Vec<PathBuf>,

    /// How many top matches go on to interviews
    #[arg(long, default_value_t = 3)]
    shortlist: usize,

    /// Use the backend for analysis instead of the simulation. The backend
    /// needs resume text, so `--resume-file` is required.
    #[arg(long, requires = "resume_files")]
    remote: bool,

    #[arg(long)]
    export_csv: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvaluationRow<'a> {
    candidate: &'a str,
    resume_match: u8,
    technical: u8,
    culture: u8,
    experience: u8,
    verification: u8,
    overall: u8,
    recommendation: &'a str,
    decision: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = ConfigManager::load_for_cli()?;
    info!("Environment: {}", config.environment);

    match cli.command {
        Command::Run(args) => run_workflow(&config, args).await,
        Command::Recommend { score } => {
            let recommendation = config.policy.recommendation(score);
            let band = config.policy.score_band(score);
            println!("{} ({:?})", recommendation.as_str(), band);
            Ok(())
        }
        Command::Policy => {
            print!("{}", serde_yaml::to_string(&config.policy)?);
            Ok(())
        }
        Command::Session { action } => handle_session(&config, action).await,
    }
}

fn init_logging() -> Result<()> {
    let path = std::env::var("HIREFLOW_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .init();
    Ok(())
}

async fn handle_session(config: &ConfigManager, action: SessionAction) -> Result<()> {
    let store = SessionStore::new(&config.session);
    match action {
        SessionAction::Show => match store.load()? {
            Some(session) => {
                let expiry = DateTime::<Utc>::from_timestamp_millis(session.session_expiry)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| session.session_expiry.to_string());
                println!("Signed in as {} <{}>", session.user.name, session.user.email);
                println!("Expires: {}", expiry);
            }
            None => println!("Not signed in"),
        },
        SessionAction::Login { credential } => {
            let provider = HttpProvider::new(&config.service)?;
            let auth = provider.login_with_google(&credential).await?;
            let session = store.save(&auth)?;
            println!("Signed in as {}", session.user.email);
        }
        SessionAction::Clear => {
            store.clear()?;
            println!("Session cleared");
        }
    }
    Ok(())
}

fn analysis_provider(
    config: &ConfigManager,
    remote: bool,
    simulated: &SimulatedProvider,
) -> Result<Arc<dyn AnalysisProvider>> {
    if !remote {
        return Ok(Arc::new(simulated.clone()));
    }
    let mut provider = HttpProvider::new(&config.service)?.with_policy(config.policy.clone());
    match SessionStore::new(&config.session).load()? {
        Some(session) => provider = provider.with_token(session.auth_token),
        None => warn!("No stored session, calling the backend without a token"),
    }
    info!("Using backend at {}", provider.base_url());
    Ok(Arc::new(provider))
}

async fn run_workflow(config: &ConfigManager, args: RunArgs) -> Result<()> {
    let simulated = SimulatedProvider::new(&config.simulation).with_policy(config.policy.clone());
    let analysis = analysis_provider(config, args.remote, &simulated)?;
    let simulated = Arc::new(simulated);
    let mut flow = WorkflowOrchestrator::new(config.policy.clone());

    // step 1
    let mut jd: JobDescriptionStep = flow.open()?;
    jd.set_requirements(
        JobRequirements::new(&args.role, &args.department, &args.experience)
            .with_skills(&args.skills),
    );
    jd.generate(analysis.as_ref()).await?;
    flow.complete(jd)?;
    println!("[1/7] Job description generated for {}", args.role);

    // step 2
    let mut scan: ResumeScanStep = flow.open()?;
    if args.resume_files.is_empty() {
        for n in 1..=args.resumes {
            scan.add_file(&format!("candidate_{:02}.pdf", n))?;
        }
    } else {
        for path in &args.resume_files {
            scan.add_resume(read_resume(path)?);
        }
    }
    scan.upload_all();
    let report = scan.analyze_all(Arc::clone(&analysis)).await;
    print_failures("resume analysis", &report);
    println!(
        "[2/7] {} resumes analysed, average match {}",
        scan.analyzed_resumes().count(),
        scan.average_match_score()
    );
    flow.complete(scan)?;

    // step 3
    let mut matching: CandidateMatchingStep = flow.open()?;
    matching.run_matching(analysis.as_ref()).await?;
    matching.select_top(args.shortlist);
    let comparison = matching.comparison();
    println!(
        "[3/7] {} candidates matched (highest {}, lowest {}), {} shortlisted",
        comparison.total_candidates,
        comparison.highest_match_score,
        comparison.lowest_match_score,
        matching.selected().count()
    );
    flow.complete(matching)?;

    // step 4
    let mut scheduling: InterviewSchedulingStep = flow.open()?;
    scheduling.load_slots(simulated.as_ref()).await?;
    let waiting: Vec<String> = scheduling
        .unscheduled_candidates()
        .map(|c| c.id.clone())
        .collect();
    for candidate_id in waiting {
        let Some(slot_id) = scheduling.available_slots().next().map(|s| s.id.clone()) else {
            warn!("Ran out of interview slots");
            break;
        };
        scheduling.schedule(&slot_id, &candidate_id)?;
    }
    println!("[4/7] {} interviews scheduled", scheduling.scheduled().count());
    flow.complete(scheduling)?;

    // step 5
    let mut assessment: InterviewAssessmentStep = flow.open()?;
    let sessions: Vec<String> = assessment.sessions().iter().map(|s| s.id.clone()).collect();
    for id in &sessions {
        assessment
            .generate_questions(id, analysis.as_ref(), QUESTIONS_PER_INTERVIEW)
            .await?;
        assessment.start(id)?;
        assessment.finish(id)?;
        if let Err(e) = assessment.analyze(id, analysis.as_ref()).await {
            warn!("Interview {} left unanalysed: {}", id, e);
        }
    }
    println!(
        "[5/7] interviews assessed, average score {}",
        assessment.average_interview_score()
    );
    flow.complete(assessment)?;

    // step 6
    let mut verification: BackgroundVerificationStep = flow.open()?;
    let report = verification.run_all(simulated.clone()).await;
    print_failures("background check", &report);
    if !verification.all_terminal() {
        bail!("background checks did not finish");
    }
    for candidate in verification.candidates() {
        println!(
            "      {}: compliance {}, bias {}",
            candidate.name,
            verification.compliance_score(&candidate.id),
            verification.bias_level(&candidate.id)
        );
    }
    println!("[6/7] {} background checks complete", report.succeeded.len());
    flow.complete(verification)?;

    // step 7
    let mut decision: FinalDecisionStep = flow.open()?;
    let proposals: Vec<(String, AiRecommendation)> = decision
        .evaluations()
        .iter()
        .map(|e| (e.candidate_id.clone(), e.ai_recommendation))
        .collect();
    let salary = flow
        .state()
        .step1
        .as_ref()
        .map(|p| p.requirements.salary.clone())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "To be agreed".to_string());
    for (candidate_id, recommendation) in proposals {
        decision.decide(&candidate_id, decide_from(recommendation, &salary))?;
    }
    let hire_rate = decision.hire_rate();
    let evaluations = decision.evaluations().to_vec();
    flow.complete(decision)?;
    println!("[7/7] hiring round closed, hire rate {:.1}%", hire_rate);

    println!("{}", flow.snapshot_json()?);
    if let Some(path) = &args.export_csv {
        export_csv(path, &evaluations)?;
        println!("Evaluations written to {}", path.display());
    }
    print_summary(&evaluations, flow.policy());
    Ok(())
}

fn read_resume(path: &Path) -> Result<ResumeRecord> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid resume path {}", path.display()))?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read resume {}", path.display()))?;
    Ok(ResumeRecord::new(file_name)?.with_content(content))
}

fn decide_from(recommendation: AiRecommendation, salary: &str) -> Decision {
    match recommendation {
        AiRecommendation::StrongHire | AiRecommendation::Hire => Decision::Hire {
            offer: CompensationOffer {
                salary: salary.to_string(),
                start_date: (Utc::now() + Duration::days(OFFER_START_DAYS)).date_naive(),
                notes: String::new(),
            },
            reason: format!("AI recommendation: {}", recommendation.as_str()),
        },
        AiRecommendation::Consider | AiRecommendation::Reject => Decision::Reject {
            reason: format!("AI recommendation: {}", recommendation.as_str()),
        },
    }
}

fn print_failures(operation: &str, report: &BatchReport) {
    for (id, error) in &report.failed {
        println!("      {} {} failed: {}", operation, id, error);
    }
}

fn export_csv(path: &Path, evaluations: &[CandidateEvaluation]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for evaluation in evaluations {
        writer.serialize(EvaluationRow {
            candidate: &evaluation.candidate_name,
            resume_match: evaluation.scores.resume_match,
            technical: evaluation.scores.technical,
            culture: evaluation.scores.culture,
            experience: evaluation.scores.experience,
            verification: evaluation.scores.verification,
            overall: evaluation.overall_score,
            recommendation: evaluation.ai_recommendation.as_str(),
            decision: match evaluation.final_decision() {
                Some(FinalDecision::Hired) => "hired",
                Some(FinalDecision::Rejected) => "rejected",
                None => "pending",
            },
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(evaluations: &[CandidateEvaluation], policy: &ScoringPolicy) {
    println!();
    for evaluation in evaluations {
        println!(
            "{:<24} {:>3} {:<12} {:?}",
            evaluation.candidate_name,
            evaluation.overall_score,
            evaluation.ai_recommendation.as_str(),
            policy.score_band(evaluation.overall_score)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_run_requires_resume_files() {
        let err = Cli::try_parse_from(["hireflow", "run", "--remote"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli =
            Cli::try_parse_from(["hireflow", "run", "--remote", "--resume-file", "ada.txt"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert!(args.remote);
                assert_eq!(args.resume_files, vec![PathBuf::from("ada.txt")]);
            }
            _ => panic!("expected the run command"),
        }
    }

    #[test]
    fn test_simulated_run_needs_no_files() {
        let cli = Cli::try_parse_from(["hireflow", "run", "--skills", "Rust,Go"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert!(!args.remote);
                assert_eq!(args.skills, vec!["Rust", "Go"]);
                assert_eq!(args.resumes, 5);
            }
            _ => panic!("expected the run command"),
        }
    }
}
