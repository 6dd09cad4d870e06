use serde::{Deserialize, Serialize};

use crate::{ClassroomId, DayOfWeek, GroupId, LecturerId, Session};

/// Days of the teaching week and the number of periods per day.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridShape {
    pub days: Vec<DayOfWeek>,
    pub periods: u8,
}

impl GridShape {
    pub fn new(days: Vec<DayOfWeek>, periods: u8) -> Self {
        Self { days, periods }
    }

    /// The first `n` days starting from Monday, at most all seven.
    pub fn weekdays(n: usize, periods: u8) -> Self {
        Self::new(DayOfWeek::ALL.iter().copied().take(n).collect(), periods)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn slot_count(&self) -> usize {
        self.days.len() * self.periods as usize
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::weekdays(5, 4)
    }
}

/// Weekly grid of session lists, indexed by day position and 1-based period.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timetable {
    days: Vec<DayOfWeek>,
    periods: u8,
    cells: Vec<Vec<Vec<Session>>>,
}

impl Timetable {
    pub fn empty(shape: &GridShape) -> Self {
        Self {
            days: shape.days.clone(),
            periods: shape.periods,
            cells: vec![vec![Vec::new(); shape.periods as usize]; shape.days.len()],
        }
    }

    pub fn days(&self) -> &[DayOfWeek] {
        &self.days
    }

    pub fn periods(&self) -> u8 {
        self.periods
    }

    pub fn shape(&self) -> GridShape {
        GridShape::new(self.days.clone(), self.periods())
    }

    pub fn same_shape(&self, other: &Timetable) -> bool {
        self.days == other.days && self.periods() == other.periods()
    }

    /// Sessions in `(day, period)`. Panics when the slot is outside the grid.
    pub fn slot(&self, day: usize, period: u8) -> &[Session] {
        &self.cells[day][period as usize - 1]
    }

    pub fn get(&self, day: usize, period: u8) -> Option<&[Session]> {
        let p = (period as usize).checked_sub(1)?;
        self.cells.get(day)?.get(p).map(Vec::as_slice)
    }

    pub fn set_slot(&mut self, day: usize, period: u8, sessions: Vec<Session>) {
        self.cells[day][period as usize - 1] = sessions;
    }

    pub fn push(&mut self, day: usize, period: u8, session: Session) {
        self.cells[day][period as usize - 1].push(session);
    }

    pub fn clear_slot(&mut self, day: usize, period: u8) {
        self.cells[day][period as usize - 1].clear();
    }

    pub fn day_load(&self, day: usize) -> usize {
        self.cells[day].iter().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.cells.iter().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Vec::is_empty)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.cells.iter().flatten().flatten()
    }

    pub fn slots(&self) -> impl Iterator<Item = (usize, u8, &[Session])> {
        self.cells.iter().enumerate().flat_map(|(d, periods)| {
            periods
                .iter()
                .enumerate()
                .map(move |(p, s)| (d, p as u8 + 1, s.as_slice()))
        })
    }

    /// True when no session in the slot uses any of the three resources.
    pub fn is_free(
        &self,
        day: usize,
        period: u8,
        lecturer: &LecturerId,
        classroom: &ClassroomId,
        group: &GroupId,
    ) -> bool {
        self.slot(day, period).iter().all(|s| {
            &s.lecturer != lecturer && &s.classroom != classroom && &s.group != group
        })
    }
}
