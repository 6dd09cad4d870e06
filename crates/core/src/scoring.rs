use std::collections::HashMap;
use types::{GroupId, Instance, ScoringMode, SessionKind, Shortfall, SubjectId, Timetable};

#[derive(Clone, Debug, Default)]
pub struct Scores {
    pub placed_sessions: usize,
    pub requirement_penalty: i64,
    pub unmet_sessions: u32,
    pub surplus_sessions: u32,
    pub shortfalls: Vec<Shortfall>,
    pub gap_score: i64,
    pub windows_total: i64,
    /// The value the configured [`ScoringMode`] optimizes.
    pub objective: i64,
}

type Counts<'a> = HashMap<(&'a GroupId, &'a SubjectId, SessionKind), u32>;

fn placed_counts(tt: &Timetable) -> Counts<'_> {
    let mut counts: Counts<'_> = HashMap::new();
    for s in tt.sessions() {
        *counts.entry((&s.group, &s.subject, s.kind)).or_default() += 1;
    }
    counts
}

/// Fitness of `tt` under the instance's scoring mode. Higher is better.
pub fn score(inst: &Instance, tt: &Timetable) -> i64 {
    match inst.policy.scoring {
        ScoringMode::Requirements => -requirement_penalty(inst, tt),
        ScoringMode::Gaps => gap_score(tt).0,
    }
}

/// Sum over every (group, subject, kind) of `|placed - required|`.
pub fn requirement_penalty(inst: &Instance, tt: &Timetable) -> i64 {
    let counts = placed_counts(tt);
    let mut penalty = 0i64;
    for g in &inst.groups {
        for s in inst.subjects_of(&g.id) {
            for kind in SessionKind::ALL {
                let required = inst.policy.required(g, s, kind);
                let placed = counts.get(&(&g.id, &s.id, kind)).copied().unwrap_or(0);
                penalty += (i64::from(placed) - i64::from(required)).abs();
            }
        }
    }
    penalty
}

/// Returns `(occupied periods - windows, windows)` summed over days. A window
/// is an occupied period directly followed by an empty one.
pub fn gap_score(tt: &Timetable) -> (i64, i64) {
    let mut total = 0i64;
    let mut windows_total = 0i64;
    for day in 0..tt.days().len() {
        let occupied: Vec<bool> = (1..=tt.periods())
            .map(|p| !tt.slot(day, p).is_empty())
            .collect();
        let num_occupied = occupied.iter().filter(|&&o| o).count() as i64;
        let windows = occupied.windows(2).filter(|w| w[0] && !w[1]).count() as i64;
        total += num_occupied - windows;
        windows_total += windows;
    }
    (total, windows_total)
}

/// Full breakdown of `tt`: both scoring modes plus the per-requirement
/// shortfalls a caller needs to judge the schedule.
pub fn compute_scores(inst: &Instance, tt: &Timetable) -> Scores {
    let counts = placed_counts(tt);

    let mut penalty = 0i64;
    let mut unmet = 0u32;
    let mut surplus = 0u32;
    let mut shortfalls = Vec::new();

    for g in &inst.groups {
        for s in inst.subjects_of(&g.id) {
            for kind in SessionKind::ALL {
                let required = inst.policy.required(g, s, kind);
                let placed = counts.get(&(&g.id, &s.id, kind)).copied().unwrap_or(0);
                penalty += (i64::from(placed) - i64::from(required)).abs();
                if placed < required {
                    unmet += required - placed;
                    shortfalls.push(Shortfall {
                        group: g.id.clone(),
                        subject: s.id.clone(),
                        kind,
                        required,
                        placed,
                    });
                } else {
                    surplus += placed - required;
                }
            }
        }
    }

    let (gaps, windows_total) = gap_score(tt);
    let objective = match inst.policy.scoring {
        ScoringMode::Requirements => -penalty,
        ScoringMode::Gaps => gaps,
    };

    Scores {
        placed_sessions: tt.len(),
        requirement_penalty: penalty,
        unmet_sessions: unmet,
        surplus_sessions: surplus,
        shortfalls,
        gap_score: gaps,
        windows_total,
        objective,
    }
}
