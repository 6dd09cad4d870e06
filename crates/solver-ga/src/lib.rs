//! Genetic search for weekly university timetables.
//!
//! [`GaRunner`] seeds a population with [`build_timetable`], then evolves it
//! with tournament selection, per-day crossover and slot-toggling mutation.
//! The mutation rate adapts to progress and a stagnating population is
//! rebuilt from scratch while the best timetable found so far is kept.

mod catalog;
mod config;
mod construct;
mod error;
mod events;
mod operators;
mod runner;

pub use catalog::Catalog;
pub use config::{DataPolicy, GaConfig, MutationControl, SlotStrategy};
pub use construct::{build_timetable, find_classroom, find_lecturer, find_slot};
pub use error::{ConfigError, EngineError, SelectionError};
pub use events::{GaEvent, GenerationStats, Observer, Termination, TracingObserver};
pub use operators::{crossover, mutate, random_session, tournament, AdaptiveRate};
pub use runner::{GaOutcome, GaRunner};

use sched_core::Solver;
use types::{Instance, SolveResult};

/// [`Solver`] front for the GA.
#[derive(Debug, Clone, Default)]
pub struct GaSolver {
    pub config: GaConfig,
}

impl GaSolver {
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }
}

impl Solver for GaSolver {
    fn solve(&self, inst: &Instance) -> anyhow::Result<SolveResult> {
        let outcome = GaRunner::run(inst, &self.config)?;
        Ok(outcome.into_result(inst))
    }
}
