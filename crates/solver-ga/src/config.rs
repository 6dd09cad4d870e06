use std::ops::RangeInclusive;

use crate::error::ConfigError;

/// How the constructor picks a slot for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStrategy {
    #[default]
    Balanced,
    FirstFit,
}

/// What to do when the input data makes some requirement unschedulable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataPolicy {
    #[default]
    BestEffort,
    FailFast,
}

/// Mutation probability schedule and mutation size.
///
/// The rate starts at `base_rate`, rises by `step_up` on every stagnant
/// generation and falls by `step_down` on every improving one, staying in
/// `[min_rate, max_rate]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationControl {
    pub base_rate: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    pub step_up: f64,
    pub step_down: f64,
    pub min_steps: usize,
    pub max_steps: usize,
}

impl MutationControl {
    pub fn steps(&self) -> RangeInclusive<usize> {
        self.min_steps..=self.max_steps
    }
}

impl Default for MutationControl {
    fn default() -> Self {
        Self {
            base_rate: 0.2,
            min_rate: 0.1,
            max_rate: 1.0,
            step_up: 0.05,
            step_down: 0.02,
            min_steps: 1,
            max_steps: 3,
        }
    }
}

/// Configuration for the timetable GA.
///
/// # Builder Pattern
///
/// ```
/// use solver_ga::{GaConfig, SlotStrategy};
///
/// let config = GaConfig::default()
///     .with_population_size(40)
///     .with_generations(200)
///     .with_mutation_rate(0.3)
///     .with_slot_strategy(SlotStrategy::FirstFit)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GaConfig {
    pub population_size: usize,

    pub generations: usize,

    pub mutation: MutationControl,

    /// Consecutive non-improving generations before the population is
    /// rebuilt from scratch.
    pub stagnation_threshold: usize,

    /// Individuals sampled (without replacement) per tournament.
    pub tournament_size: usize,

    pub slot_strategy: SlotStrategy,

    pub data_policy: DataPolicy,

    /// Evaluate and construct candidates on the rayon pool. Results do not
    /// depend on this flag.
    pub parallel: bool,

    /// `None` draws a random seed.
    pub seed: Option<u64>,

    /// Wall-clock limit, checked at the start of each generation.
    pub time_limit_ms: Option<u64>,

    /// Stop as soon as the champion reaches this score.
    pub target_score: Option<i64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            generations: 50,
            mutation: MutationControl::default(),
            stagnation_threshold: 5,
            tournament_size: 3,
            slot_strategy: SlotStrategy::default(),
            data_policy: DataPolicy::default(),
            parallel: true,
            seed: None,
            time_limit_ms: None,
            target_score: None,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation.base_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the band the adaptive rate moves in.
    pub fn with_mutation_bounds(mut self, min: f64, max: f64) -> Self {
        self.mutation.min_rate = min.clamp(0.0, 1.0);
        self.mutation.max_rate = max.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_steps(mut self, up: f64, down: f64) -> Self {
        self.mutation.step_up = up.max(0.0);
        self.mutation.step_down = down.max(0.0);
        self
    }

    pub fn with_mutation_size(mut self, min_steps: usize, max_steps: usize) -> Self {
        self.mutation.min_steps = min_steps;
        self.mutation.max_steps = max_steps;
        self
    }

    pub fn with_stagnation_threshold(mut self, n: usize) -> Self {
        self.stagnation_threshold = n;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_slot_strategy(mut self, strategy: SlotStrategy) -> Self {
        self.slot_strategy = strategy;
        self
    }

    pub fn with_data_policy(mut self, policy: DataPolicy) -> Self {
        self.data_policy = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_target_score(mut self, score: i64) -> Self {
        self.target_score = Some(score);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if self.stagnation_threshold == 0 {
            return Err(ConfigError::ZeroStagnationThreshold);
        }
        let m = &self.mutation;
        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !in_unit(m.min_rate) || !in_unit(m.max_rate) || m.min_rate > m.max_rate {
            return Err(ConfigError::MutationBounds {
                min: m.min_rate,
                max: m.max_rate,
            });
        }
        if !(m.min_rate..=m.max_rate).contains(&m.base_rate) {
            return Err(ConfigError::BaseRateOutOfBounds(m.base_rate));
        }
        if m.step_up.is_nan() || m.step_down.is_nan() || m.step_up < 0.0 || m.step_down < 0.0 {
            return Err(ConfigError::NegativeStep);
        }
        if m.max_steps == 0 || m.min_steps > m.max_steps {
            return Err(ConfigError::MutationSize {
                min: m.min_steps,
                max: m.max_steps,
            });
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }
}
