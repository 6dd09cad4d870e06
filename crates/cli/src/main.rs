//! Timetable CLI.
//!
//! Loads groups, subjects, lecturers and classrooms from CSV, runs the
//! genetic search and prints the best weekly timetable found.

mod loader;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sched_core::audit;
use solver_ga::{DataPolicy, GaConfig, GaRunner, SlotStrategy};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use types::{GridShape, Policy, QuotaMode, ScoringMode};

use crate::loader::{load_instance, InputPaths};

#[derive(Parser, Debug)]
#[command(name = "timetable")]
#[command(about = "Search for a weekly university timetable with a genetic algorithm")]
struct Cli {
    /// Directory holding group.csv, subjects.csv, lecturers.csv and classrooms.csv
    #[arg(long, default_value = "inputs")]
    inputs: PathBuf,

    /// Override the groups table
    #[arg(long)]
    groups: Option<PathBuf>,
    /// Override the subjects table
    #[arg(long)]
    subjects: Option<PathBuf>,
    /// Override the lecturers table
    #[arg(long)]
    lecturers: Option<PathBuf>,
    /// Override the classrooms table
    #[arg(long)]
    classrooms: Option<PathBuf>,

    #[arg(long, default_value = "10")]
    pop_size: usize,
    #[arg(long, default_value = "50")]
    generations: usize,
    /// Starting mutation probability
    #[arg(long, default_value = "0.2")]
    mutation_rate: f64,
    /// Non-improving generations before the population is rebuilt
    #[arg(long, default_value = "5")]
    stagnation: usize,
    #[arg(long, default_value = "3")]
    tournament: usize,
    #[arg(long, env = "TIMETABLE_SEED")]
    seed: Option<u64>,
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Stop once the best score reaches this value (0 means every quota met)
    #[arg(long, allow_hyphen_values = true)]
    target_score: Option<i64>,

    /// Teaching days per week, starting Monday (1-7)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(1..=7))]
    days: u8,
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u8).range(1..))]
    periods: u8,

    /// Take weekly quotas from the subjects' lecture/practice hours
    #[arg(long)]
    subject_hours: bool,
    /// Score by compactness (occupied periods minus windows) instead of quotas
    #[arg(long)]
    gap_scoring: bool,
    /// Fill days in grid order instead of least-loaded first
    #[arg(long)]
    first_fit: bool,
    /// Refuse to run when the input data cannot satisfy every requirement
    #[arg(long)]
    fail_fast: bool,
    /// Evaluate candidates on a single thread
    #[arg(long)]
    sequential: bool,

    /// Only check the input data and print the issues found
    #[arg(long)]
    check: bool,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
    /// Emit logs as JSON
    #[arg(long, env = "TIMETABLE_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn input_paths(&self) -> InputPaths {
        let defaults = InputPaths::in_dir(&self.inputs);
        InputPaths {
            groups: self.groups.clone().unwrap_or(defaults.groups),
            subjects: self.subjects.clone().unwrap_or(defaults.subjects),
            lecturers: self.lecturers.clone().unwrap_or(defaults.lecturers),
            classrooms: self.classrooms.clone().unwrap_or(defaults.classrooms),
        }
    }

    fn policy(&self) -> Policy {
        Policy {
            quota: if self.subject_hours {
                QuotaMode::SubjectHours
            } else {
                QuotaMode::Uniform
            },
            scoring: if self.gap_scoring {
                ScoringMode::Gaps
            } else {
                ScoringMode::Requirements
            },
            ..Policy::default()
        }
    }

    fn ga_config(&self) -> GaConfig {
        let mut config = GaConfig::default()
            .with_population_size(self.pop_size)
            .with_generations(self.generations)
            .with_mutation_rate(self.mutation_rate)
            .with_stagnation_threshold(self.stagnation)
            .with_tournament_size(self.tournament)
            .with_parallel(!self.sequential);
        if self.first_fit {
            config = config.with_slot_strategy(SlotStrategy::FirstFit);
        }
        if self.fail_fast {
            config = config.with_data_policy(DataPolicy::FailFast);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(ms) = self.time_limit_ms {
            config = config.with_time_limit_ms(ms);
        }
        if let Some(score) = self.target_score {
            config = config.with_target_score(score);
        }
        config
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let paths = cli.input_paths();
    let inst = load_instance(&paths)
        .with_context(|| format!("loading inputs from {}", cli.inputs.display()))?
        .with_grid(GridShape::weekdays(usize::from(cli.days), cli.periods))
        .with_policy(cli.policy());

    if cli.check {
        let issues = audit(&inst);
        println!("{}", serde_json::to_string_pretty(&issues)?);
        if !issues.is_empty() {
            bail!("{} data issue(s) found", issues.len());
        }
        return Ok(());
    }

    let config = cli.ga_config();
    info!(
        groups = inst.groups.len(),
        subjects = inst.subjects.len(),
        lecturers = inst.lecturers.len(),
        classrooms = inst.classrooms.len(),
        "instance loaded"
    );

    let outcome = GaRunner::run(&inst, &config).context("genetic search failed")?;
    let result = outcome.into_result(&inst);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render::render_timetable(&inst, &result.timetable));
        println!();
        print!("{}", render::render_summary(&result));
    }
    Ok(())
}
