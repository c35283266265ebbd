//! Headless match runner.
//!
//! Plays scenarios in the simulated world and reports how every robot's
//! turns ended. Metrics go to stdout, logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run a built-in scenario
//! cargo run -p robo_headless -- run --builtin skirmish
//!
//! # Run a scenario file, JSON output
//! cargo run -p robo_headless -- run --scenario scenarios/chaos.ron --json
//!
//! # Sweep compute ceilings in parallel
//! cargo run -p robo_headless -- sweep --builtin chaos --start 200 --step 200 --count 8
//!
//! # Validate a scheduler config file
//! cargo run -p robo_headless -- check-config scheduler.ron
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use robo_core::config::SchedulerConfig;
use robo_core::role::RobotRole;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use robo_headless::{
    batch::{ceiling_steps, run_sweep},
    HostDriver, MatchMetrics, Scenario, ScenarioError,
};

#[derive(Parser)]
#[command(name = "robo_headless")]
#[command(about = "Headless match runner for the robot turn scheduler")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = false, multiple = false)]
struct ScenarioSource {
    /// Scenario file to load (RON)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Built-in scenario name (default: skirmish)
    #[arg(short, long)]
    builtin: Option<String>,
}

impl ScenarioSource {
    fn resolve(&self) -> Result<Scenario, ScenarioError> {
        match (&self.scenario, &self.builtin) {
            (Some(path), _) => Scenario::load(path),
            (None, Some(name)) => Scenario::builtin(name),
            (None, None) => Scenario::builtin("skirmish"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match
    Run {
        #[command(flatten)]
        source: ScenarioSource,

        /// Override the scenario's round limit
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play the same match under a range of compute ceilings, in parallel
    Sweep {
        #[command(flatten)]
        source: ScenarioSource,

        /// First ceiling
        #[arg(long, default_value = "200")]
        start: u32,

        /// Increment between ceilings
        #[arg(long, default_value = "200")]
        step: u32,

        /// Number of ceilings
        #[arg(short, long, default_value = "8")]
        count: u32,

        /// Write full results to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a scheduler config file
    CheckConfig {
        /// Config file (RON)
        file: PathBuf,
    },

    /// List built-in scenarios
    List,
}

fn main() {
    let cli = Cli::parse();

    // Logs on stderr; stdout is for results
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    // Strategy panics are reported as runtime faults
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(panic = %info, "panic inside robot turn");
    }));

    match cli.command {
        Commands::Run { source, rounds, json } => cmd_run(&source, rounds, json),
        Commands::Sweep {
            source,
            start,
            step,
            count,
            output,
        } => cmd_sweep(&source, start, step, count, output),
        Commands::CheckConfig { file } => cmd_check_config(file),
        Commands::List => cmd_list(),
    }
}

fn load_or_exit(source: &ScenarioSource) -> Scenario {
    match source.resolve() {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load scenario");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

/// Play one match
fn cmd_run(source: &ScenarioSource, rounds: Option<u32>, json: bool) {
    let mut scenario = load_or_exit(source);
    if let Some(rounds) = rounds {
        scenario.rounds = rounds.max(1);
    }

    let metrics = HostDriver::new(&scenario).run();

    if json {
        match serde_json::to_string_pretty(&metrics) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("FATAL: Failed to serialize metrics: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print_summary(&metrics);
    }

    if metrics.yield_violations > 0 {
        std::process::exit(2);
    }
}

/// Sweep compute ceilings
fn cmd_sweep(source: &ScenarioSource, start: u32, step: u32, count: u32, output: Option<PathBuf>) {
    let scenario = load_or_exit(source);
    let ceilings = ceiling_steps(start.max(1), step, count);
    let results = run_sweep(&scenario, &ceilings);

    println!("{:>10} {:>8} {:>8} {:>12} {:>8}", "ceiling", "turns", "faults", "terminations", "winner");
    for m in &results.matches {
        println!(
            "{:>10} {:>8} {:>8} {:>12} {:>8}",
            m.compute_ceiling,
            m.total_turns(),
            m.total_faults(),
            m.terminations.len(),
            m.winner.as_deref().unwrap_or("-"),
        );
    }

    if let Some(path) = output {
        if let Err(e) = results.save(&path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save results");
            eprintln!("FATAL: Failed to save results: {e}");
            std::process::exit(1);
        }
        tracing::info!(path = %path.display(), "Results saved");
    }

    if results.summary.yield_violations > 0 {
        std::process::exit(2);
    }
}

/// Validate a scheduler config
fn cmd_check_config(file: PathBuf) {
    match SchedulerConfig::load(&file) {
        Ok(config) => {
            println!("{}: ok", file.display());
            println!("  greeting:      {:?}", config.greeting);
            println!("  drift_policy:  {:?}", config.drift_policy);
            println!("  report_budget: {}", config.report_budget);
        }
        Err(e) => {
            eprintln!("{}: {e}", file.display());
            std::process::exit(1);
        }
    }
}

/// List built-in scenarios
fn cmd_list() {
    for name in Scenario::BUILTINS {
        if let Ok(scenario) = Scenario::builtin(name) {
            println!("{name:<10} {}", scenario.description);
        }
    }
}

fn print_summary(metrics: &MatchMetrics) {
    println!("{}", "=".repeat(64));
    println!(
        "{}: {} rounds, compute ceiling {}",
        metrics.scenario, metrics.rounds_played, metrics.compute_ceiling
    );
    println!("{}", "=".repeat(64));
    println!(
        "{:<14} {:>6} {:>9} {:>5} {:>7} {:>8} {:>7}",
        "role", "turns", "completed", "idle", "action", "runtime", "diags"
    );
    for role in RobotRole::ALL {
        if let Some(m) = metrics.role(role) {
            println!(
                "{:<14} {:>6} {:>9} {:>5} {:>7} {:>8} {:>7}",
                role.label(),
                m.turns,
                m.completed,
                m.idle,
                m.action_faults,
                m.runtime_faults,
                m.diagnostics
            );
        }
    }
    println!();
    for t in &metrics.terminations {
        println!(
            "terminated: robot {} ({} {}) in round {}: {}",
            t.robot, t.team, t.role, t.round, t.reason
        );
    }
    println!(
        "resigned: {}  destroyed: {}  yield violations: {}",
        metrics.resignations, metrics.destroyed, metrics.yield_violations
    );
    let survivors: Vec<String> = metrics.survivors.iter().map(|(team, n)| format!("{team}={n}")).collect();
    println!("survivors: {}", survivors.join(" "));
    println!("winner: {}", metrics.winner.as_deref().unwrap_or("none"));
}
