//! The generation loop.
//!
//! Each generation is evaluated, the champion updated, and the mutation rate
//! adapted. A run of `stagnation_threshold` generations without a new best
//! throws the population away and rebuilds it with the constructor; any
//! other generation breeds the next one by elitism, tournament selection,
//! crossover and mutation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{audit, scoring, DataIssue, ValidationError};
use serde_json::json;
use tracing::warn;
use types::{Instance, SolveResult, SolveStatus, Timetable};

use crate::catalog::Catalog;
use crate::config::{DataPolicy, GaConfig};
use crate::construct::build_timetable;
use crate::error::{EngineError, SelectionError};
use crate::events::{GaEvent, GenerationStats, Observer, Termination, TracingObserver};
use crate::operators::{crossover, mutate, tournament, AdaptiveRate};

#[derive(Debug, Clone)]
pub struct GaOutcome {
    /// All-time best timetable. `None` only if no generation was evaluated.
    pub best: Option<Timetable>,
    pub best_score: Option<i64>,
    pub generations: usize,
    pub resets: usize,
    pub termination: Termination,
    pub final_mutation_rate: f64,
    pub history: Vec<GenerationStats>,
    /// Data issues found before the run (best-effort mode only).
    pub data_issues: Vec<DataIssue>,
}

impl GaOutcome {
    /// Scores the best timetable and packages it with the run statistics.
    pub fn into_result(self, inst: &Instance) -> SolveResult {
        let timetable = self.best.unwrap_or_else(|| Timetable::empty(&inst.grid));
        let scores = scoring::compute_scores(inst, &timetable);

        let status = if timetable.is_empty() {
            SolveStatus::Empty
        } else if scores.requirement_penalty == 0 {
            SolveStatus::Complete
        } else {
            SolveStatus::Partial
        };

        let stats = json!({
            "generations": self.generations,
            "resets": self.resets,
            "termination": self.termination,
            "final_mutation_rate": self.final_mutation_rate,
            "placed_sessions": scores.placed_sessions,
            "requirement_penalty": scores.requirement_penalty,
            "surplus_sessions": scores.surplus_sessions,
            "gap_score": scores.gap_score,
            "windows": scores.windows_total,
            "data_issues": self.data_issues,
            "history": self.history,
        });

        SolveResult {
            status,
            score: self.best_score.unwrap_or(scores.objective),
            timetable,
            unmet_sessions: scores.unmet_sessions,
            shortfalls: scores.shortfalls,
            stats,
        }
    }
}

/// Executes the GA.
///
/// ```ignore
/// let config = GaConfig::default().with_seed(42);
/// let outcome = GaRunner::run(&instance, &config)?;
/// println!("best score: {:?}", outcome.best_score);
/// ```
pub struct GaRunner;

impl GaRunner {
    pub fn run(inst: &Instance, config: &GaConfig) -> Result<GaOutcome, EngineError> {
        Self::run_with(inst, config, &TracingObserver, None)
    }

    /// Runs the GA, reporting to `observer`. Setting `cancel` stops the run
    /// before the next generation and returns the best timetable so far.
    pub fn run_with(
        inst: &Instance,
        config: &GaConfig,
        observer: &dyn Observer,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaOutcome, EngineError> {
        config.validate()?;

        let data_issues = audit(inst);
        if !data_issues.is_empty() {
            if config.data_policy == DataPolicy::FailFast {
                return Err(ValidationError::Issues(data_issues).into());
            }
            for issue in &data_issues {
                warn!(%issue, "configuration data issue; schedule will be partial");
            }
        }
        let strict = config.data_policy == DataPolicy::FailFast;

        let catalog = Catalog::new(inst);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let deadline = config
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        observer.on_event(&GaEvent::Started {
            population: config.population_size,
            generations: config.generations,
            data_issues: data_issues.len(),
        });

        let mut population = initialize_population(&catalog, config, &mut rng);
        let mut champion: Option<(i64, Timetable)> = None;
        let mut rate = AdaptiveRate::new(&config.mutation);
        let mut stagnation = 0usize;
        let mut resets = 0usize;
        let mut history: Vec<GenerationStats> = Vec::with_capacity(config.generations);
        let mut termination = Termination::Budget;

        for generation in 1..=config.generations {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                termination = Termination::Cancelled;
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                termination = Termination::TimeLimit;
                break;
            }

            let scores = evaluate(inst, &population, config.parallel);
            let Some(leader) = argmax(&scores) else {
                break;
            };
            let generation_best = scores[leader];

            let improved = champion
                .as_ref()
                .map_or(true, |(best, _)| generation_best > *best);
            if improved {
                champion = Some((generation_best, population[leader].clone()));
                observer.on_event(&GaEvent::ChampionImproved {
                    generation,
                    score: generation_best,
                });
            }
            let Some((best_ever, elite)) = champion.as_ref() else {
                break;
            };

            let mut reset = false;
            if improved {
                stagnation = 0;
                rate.lower();
            } else {
                stagnation += 1;
                if stagnation >= config.stagnation_threshold {
                    stagnation = 0;
                    reset = true;
                } else {
                    rate.raise();
                }
            }

            if reset {
                resets += 1;
                observer.on_event(&GaEvent::PopulationReset { generation });
            }

            let stats = GenerationStats {
                generation,
                best_in_generation: generation_best,
                best_ever: *best_ever,
                mutation_rate: rate.rate(),
                stagnation,
                reset,
            };
            observer.on_event(&GaEvent::Generation(stats.clone()));
            history.push(stats);

            if config.target_score.is_some_and(|t| *best_ever >= t) {
                termination = Termination::TargetReached;
                break;
            }
            if generation == config.generations {
                break;
            }

            if reset {
                population = initialize_population(&catalog, config, &mut rng);
                continue;
            }

            population = breed(
                &catalog,
                config,
                &population,
                &scores,
                elite,
                rate.rate(),
                strict,
                &mut rng,
            )?;
        }

        let best_score = champion.as_ref().map(|(s, _)| *s);
        observer.on_event(&GaEvent::Finished {
            generations: history.len(),
            resets,
            best_score,
            termination,
        });

        Ok(GaOutcome {
            best: champion.map(|(_, tt)| tt),
            best_score,
            generations: history.len(),
            resets,
            termination,
            final_mutation_rate: rate.rate(),
            history,
            data_issues,
        })
    }
}

/// Builds `population_size` timetables, each from its own seed drawn off
/// `rng`, so the result is the same with or without parallelism.
fn initialize_population<R: Rng>(
    catalog: &Catalog<'_>,
    config: &GaConfig,
    rng: &mut R,
) -> Vec<Timetable> {
    let seeds: Vec<u64> = (0..config.population_size).map(|_| rng.gen()).collect();
    par_map(&seeds, config.parallel, |&seed| {
        let mut local = ChaCha8Rng::seed_from_u64(seed);
        build_timetable(catalog, config.slot_strategy, &mut local)
    })
}

fn evaluate(inst: &Instance, population: &[Timetable], parallel: bool) -> Vec<i64> {
    par_map(population, parallel, |tt| scoring::score(inst, tt))
}

/// Index of the highest score; the first one on ties.
fn argmax(scores: &[i64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &s) in scores.iter().enumerate() {
        if best.map_or(true, |b| s > scores[b]) {
            best = Some(i);
        }
    }
    best
}

#[allow(clippy::too_many_arguments)]
fn breed<R: Rng>(
    catalog: &Catalog<'_>,
    config: &GaConfig,
    population: &[Timetable],
    scores: &[i64],
    elite: &Timetable,
    mutation_rate: f64,
    strict: bool,
    rng: &mut R,
) -> Result<Vec<Timetable>, SelectionError> {
    let mut next = Vec::with_capacity(config.population_size);
    next.push(elite.clone());

    while next.len() < config.population_size {
        let p1 = tournament(scores, config.tournament_size, rng)?;
        let p2 = tournament(scores, config.tournament_size, rng)?;
        let mut child = crossover(&population[p1], &population[p2], rng);
        if rng.gen_bool(mutation_rate) {
            child = mutate(&child, catalog, &config.mutation, strict, rng)?;
        }
        next.push(child);
    }
    Ok(next)
}

#[cfg(feature = "parallel")]
fn par_map<T, U, F>(items: &[T], parallel: bool, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    use rayon::prelude::*;
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn par_map<T, U, F>(items: &[T], _parallel: bool, f: F) -> Vec<U>
where
    F: Fn(&T) -> U,
{
    items.iter().map(f).collect()
}
