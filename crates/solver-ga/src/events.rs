use serde::Serialize;
use tracing::{debug, info};

/// Why the generation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Budget,
    TargetReached,
    TimeLimit,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_in_generation: i64,
    pub best_ever: i64,
    /// Rate after this generation's adjustment.
    pub mutation_rate: f64,
    pub stagnation: usize,
    /// Stagnation reached the threshold this generation.
    pub reset: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GaEvent {
    Started {
        population: usize,
        generations: usize,
        data_issues: usize,
    },
    ChampionImproved {
        generation: usize,
        score: i64,
    },
    Generation(GenerationStats),
    PopulationReset {
        generation: usize,
    },
    Finished {
        generations: usize,
        resets: usize,
        best_score: Option<i64>,
        termination: Termination,
    },
}

/// Receives progress events from the generation loop.
pub trait Observer {
    fn on_event(&self, event: &GaEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &GaEvent) {
        match event {
            GaEvent::Started {
                population,
                generations,
                data_issues,
            } => info!(population, generations, data_issues, "starting genetic search"),
            GaEvent::ChampionImproved { generation, score } => {
                info!(generation, score, "new best timetable")
            }
            GaEvent::Generation(s) => debug!(
                generation = s.generation,
                best = s.best_in_generation,
                best_ever = s.best_ever,
                mutation_rate = s.mutation_rate,
                stagnation = s.stagnation,
                "generation evaluated"
            ),
            GaEvent::PopulationReset { generation } => {
                info!(generation, "resetting population to escape local optimum")
            }
            GaEvent::Finished {
                generations,
                resets,
                best_score,
                termination,
            } => info!(
                generations,
                resets,
                best_score = ?best_score,
                termination = ?termination,
                "genetic search finished"
            ),
        }
    }
}
