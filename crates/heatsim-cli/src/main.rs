//! Heat-stress simulation driver.
//! `run` drives one session against a remote predictor; `step` prints the
//! offline trajectory of the step calculator.

mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use heat_core::{
    estimated_remaining_steps, format_elapsed, format_percent, format_readings, next_state,
    session_progress, should_continue, Direction, SubjectId, SubjectState, MAX_STEPS,
};
use heat_predictor::{HttpPredictionClient, PredictorConfig};
use heat_sim::{ObserverSet, SimulationConfig, SimulationController, StopReason, SubjectRoster};
use prometheus_bridge::SimulationMetrics;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::logging::LogObserver;

#[derive(Debug, Parser)]
#[command(name = "heatsim", version, about = "Heat-stress simulation loop")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one simulation session against a predictor.
    Run(RunArgs),
    /// Print the step trajectory without a predictor.
    Step(StepArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long)]
    pub direction: Direction,
    #[arg(long, default_value = "worker-001")]
    pub subject: String,
    /// Override the generated baseline temperature (°C).
    #[arg(long)]
    pub temperature: Option<f64>,
    /// Override the generated baseline humidity (% RH).
    #[arg(long)]
    pub humidity: Option<f64>,
    #[arg(long)]
    pub predictor_url: Option<String>,
    /// YAML simulation config; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Print the Prometheus exposition after the session.
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Debug, Args)]
pub struct StepArgs {
    #[arg(long)]
    pub direction: Direction,
    #[arg(long)]
    pub temperature: f64,
    #[arg(long)]
    pub humidity: f64,
    #[arg(long, default_value_t = MAX_STEPS)]
    pub steps: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args).await,
        Command::Step(args) => {
            for line in trajectory(&args) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

pub fn load_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut cfg = match &args.config {
        Some(path) => SimulationConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(ms) = args.interval_ms {
        cfg.tick_interval_ms = ms;
    }
    cfg.validate().context("invalid simulation config")?;
    Ok(cfg)
}

/// Generated baseline with the optional environment overrides applied.
pub fn seed_readings(cfg: &SimulationConfig, args: &RunArgs) -> SubjectState {
    let base = cfg.baseline.generate(&mut rand::thread_rng());
    base.with_environment(
        args.temperature.unwrap_or(base.temperature),
        args.humidity.unwrap_or(base.humidity),
    )
}

async fn run(args: RunArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let predictor_cfg = PredictorConfig {
        base_url: args
            .predictor_url
            .clone()
            .unwrap_or_else(|| PredictorConfig::default().base_url),
        request_timeout_ms: cfg.request_timeout_ms,
    };
    let predictor = HttpPredictionClient::new(&predictor_cfg).context("building predictor client")?;
    info!(endpoint = predictor.endpoint(), "using predictor");

    let id = SubjectId::new(args.subject.clone());
    let roster = Arc::new(SubjectRoster::new());
    let seed = seed_readings(&cfg, &args);
    seed.validate().with_context(|| format!("starting readings for {id}"))?;
    roster.insert(id.clone(), seed);

    let metrics = if args.metrics {
        Some(Arc::new(SimulationMetrics::new().context("registering metrics")?))
    } else {
        None
    };
    let mut observers = ObserverSet::new()
        .with(roster.clone())
        .with(Arc::new(LogObserver));
    if let Some(m) = &metrics {
        observers.push(m.clone());
    }

    let controller = SimulationController::new(cfg, Arc::new(predictor), roster.clone(), Arc::new(observers))
        .context("creating controller")?;
    controller.set_target(id.clone());
    if !controller.start(args.direction) {
        bail!("session for {id} did not start");
    }

    let started = Instant::now();
    let mut rx = controller.subscribe();
    tokio::select! {
        finished = rx.wait_for(|s| !s.active) => {
            finished.context("controller closed its snapshot channel")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for ctrl-c")?;
            controller.stop_with(StopReason::StoppedByCaller);
        }
    }
    info!(elapsed = %format_elapsed(started.elapsed()), "simulation ended");

    let snapshot = controller.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    if let Some(m) = &metrics {
        print!("{}", m.render().context("rendering metrics")?);
    }
    Ok(())
}

/// One line per step: the initial readings, then every stepped state until
/// the continuation policy or the step limit ends the run.
pub fn trajectory(args: &StepArgs) -> Vec<String> {
    let mut state = heat_core::fresh_baseline().with_environment(args.temperature, args.humidity);
    let mut lines = vec![describe(0, &state, args.direction)];
    let mut step = 0;
    while step < args.steps && should_continue(&state, args.direction, step) {
        state = next_state(&state, args.direction);
        step += 1;
        lines.push(describe(step, &state, args.direction));
    }
    lines
}

fn describe(step: u32, state: &SubjectState, direction: Direction) -> String {
    format!(
        "{step:>3}  {}  {} done, ~{} steps left",
        format_readings(state),
        format_percent(session_progress(state, direction)),
        estimated_remaining_steps(state, direction)
    )
}
