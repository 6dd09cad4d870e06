//! Selection, crossover and mutation over whole timetables.
//!
//! Every operator takes its parents by reference and returns a freshly owned
//! child; parents are never modified.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use tracing::trace;
use types::{Session, SessionKind, Timetable};

use crate::catalog::Catalog;
use crate::config::MutationControl;
use crate::error::SelectionError;

/// Tournament selection over a scored population.
///
/// Samples `k` distinct indices (all of them when `k` exceeds the population)
/// and returns the highest-scoring one; ties go to the first sampled.
pub fn tournament<R: Rng>(scores: &[i64], k: usize, rng: &mut R) -> Result<usize, SelectionError> {
    if scores.is_empty() {
        return Err(SelectionError::EmptyPopulation);
    }
    let k = k.clamp(1, scores.len());

    let mut best: Option<usize> = None;
    for i in index::sample(rng, scores.len(), k).iter() {
        if best.map_or(true, |b| scores[i] > scores[b]) {
            best = Some(i);
        }
    }
    best.ok_or(SelectionError::EmptyPopulation)
}

/// Per-day single-point crossover.
///
/// For every day a split `s` in `1..periods` is drawn; periods `<= s` copy
/// parent 1's cell, the rest copy parent 2's. Both parents must share a grid
/// shape.
pub fn crossover<R: Rng>(p1: &Timetable, p2: &Timetable, rng: &mut R) -> Timetable {
    debug_assert!(p1.same_shape(p2), "crossover parents differ in grid shape");

    let mut child = Timetable::empty(&p1.shape());
    let periods = p1.periods();
    for day in 0..p1.days().len() {
        let split = if periods > 1 {
            rng.gen_range(1..periods)
        } else {
            periods
        };
        for period in 1..=periods {
            let source = if period <= split { p1 } else { p2 };
            child.set_slot(day, period, source.slot(day, period).to_vec());
        }
    }
    child
}

/// A random session drawn without regard to the rest of the timetable.
///
/// Group and subject are uniform, the lecturer is any who teaches the
/// subject, and the classroom must seat the whole group. The recorded day and
/// period are drawn independently of where the session ends up. Lecturers
/// who can lecture always produce a lecture.
pub fn random_session<R: Rng>(catalog: &Catalog<'_>, rng: &mut R) -> Result<Session, SelectionError> {
    let inst = catalog.instance();
    let group = catalog.groups().choose(rng).ok_or(SelectionError::NoGroups)?;
    let subject = catalog
        .subjects_of(&group.id)
        .choose(rng)
        .copied()
        .ok_or_else(|| SelectionError::NoSubjects(group.id.clone()))?;
    let lecturer = catalog
        .lecturers_for(subject, None)
        .choose(rng)
        .copied()
        .ok_or_else(|| SelectionError::NoLecturer(subject.id.clone()))?;
    let classroom = catalog
        .classrooms_for(group.students)
        .choose(rng)
        .copied()
        .ok_or_else(|| SelectionError::NoClassroom {
            group: group.id.clone(),
            headcount: group.students,
        })?;
    if inst.grid.periods == 0 {
        return Err(SelectionError::EmptyGrid);
    }
    let day = inst.grid.days.choose(rng).copied().ok_or(SelectionError::EmptyGrid)?;
    let period = rng.gen_range(1..=inst.grid.periods);

    let kind = if lecturer.can_teach_lecture {
        SessionKind::Lecture
    } else {
        SessionKind::Practice
    };

    Ok(Session {
        group: group.id.clone(),
        subject: subject.id.clone(),
        lecturer: lecturer.id.clone(),
        classroom: classroom.id.clone(),
        day,
        period,
        kind,
    })
}

/// Toggles between `min_steps` and `max_steps` random slots of a copy of `tt`.
///
/// An occupied slot is cleared; an empty one receives a single
/// [`random_session`]. Conflicts with the rest of the grid are not checked.
/// When no session can be drawn the slot stays empty, unless `strict` is set,
/// in which case the selection error is returned.
pub fn mutate<R: Rng>(
    tt: &Timetable,
    catalog: &Catalog<'_>,
    control: &MutationControl,
    strict: bool,
    rng: &mut R,
) -> Result<Timetable, SelectionError> {
    let mut child = tt.clone();
    let days = child.days().len();
    let periods = child.periods();
    if days == 0 || periods == 0 {
        return Ok(child);
    }

    let steps = rng.gen_range(control.steps());
    for _ in 0..steps {
        let day = rng.gen_range(0..days);
        let period = rng.gen_range(1..=periods);
        if !child.slot(day, period).is_empty() {
            child.clear_slot(day, period);
            continue;
        }
        match random_session(catalog, rng) {
            Ok(session) => child.set_slot(day, period, vec![session]),
            Err(e) if strict => return Err(e),
            Err(e) => trace!(%e, day, period, "mutation left slot empty"),
        }
    }
    Ok(child)
}

/// Mutation probability that rises while the search stagnates and falls
/// while it improves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveRate {
    rate: f64,
    min: f64,
    max: f64,
    up: f64,
    down: f64,
}

impl AdaptiveRate {
    pub fn new(control: &MutationControl) -> Self {
        Self {
            rate: control.base_rate.clamp(control.min_rate, control.max_rate),
            min: control.min_rate,
            max: control.max_rate,
            up: control.step_up,
            down: control.step_down,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn raise(&mut self) {
        self.rate = (self.rate + self.up).min(self.max);
    }

    pub fn lower(&mut self) {
        self.rate = (self.rate - self.down).max(self.min);
    }
}
