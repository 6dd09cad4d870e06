use sched_core::ValidationError;
use thiserror::Error;
use types::{GroupId, SubjectId};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("population_size must be at least 1")]
    EmptyPopulation,
    #[error("tournament_size must be at least 1")]
    EmptyTournament,
    #[error("stagnation_threshold must be at least 1")]
    ZeroStagnationThreshold,
    #[error("mutation bounds [{min}, {max}] must lie within [0, 1] with min <= max")]
    MutationBounds { min: f64, max: f64 },
    #[error("base mutation rate {0} lies outside the mutation bounds")]
    BaseRateOutOfBounds(f64),
    #[error("mutation rate steps must be non-negative")]
    NegativeStep,
    #[error("mutation size {min}..={max} is empty")]
    MutationSize { min: usize, max: usize },
    #[error("time_limit_ms must be positive or None")]
    ZeroTimeLimit,
}

/// A random pick had nothing to pick from. Always a data problem: the
/// instance lacks a group, subject, lecturer or classroom somewhere.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("cannot select a parent from an empty population")]
    EmptyPopulation,
    #[error("instance has no groups")]
    NoGroups,
    #[error("grid has no slots")]
    EmptyGrid,
    #[error("group {0} has no subjects")]
    NoSubjects(GroupId),
    #[error("subject {0} has no qualified lecturer")]
    NoLecturer(SubjectId),
    #[error("no classroom seats group {group} ({headcount} students)")]
    NoClassroom { group: GroupId, headcount: u32 },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid GA configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}
