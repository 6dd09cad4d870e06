mod timetable;

pub use timetable::{GridShape, Timetable};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(GroupId, String);
id_newtype!(LecturerId, String);
id_newtype!(ClassroomId, String);
id_newtype!(SubjectId, u32);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Monday",
            DayOfWeek::Tue => "Tuesday",
            DayOfWeek::Wed => "Wednesday",
            DayOfWeek::Thu => "Thursday",
            DayOfWeek::Fri => "Friday",
            DayOfWeek::Sat => "Saturday",
            DayOfWeek::Sun => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Lecture,
    Practice,
}

impl SessionKind {
    pub const ALL: [SessionKind; 2] = [SessionKind::Lecture, SessionKind::Practice];
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Lecture => f.write_str("lecture"),
            SessionKind::Practice => f.write_str("practice"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub students: u32,
    /// `0` and `1` both mean the group is not split.
    #[serde(default)]
    pub subgroups: u32,
}

impl Group {
    pub fn effective_subgroups(&self) -> u32 {
        self.subgroups.max(1)
    }

    /// Seats needed for one session of `kind`. A practice is held per
    /// subgroup; unsplit groups practice in halves. Rounds down.
    pub fn headcount(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Lecture => self.students,
            SessionKind::Practice if self.subgroups > 1 => self.students / self.subgroups,
            SessionKind::Practice => self.students / 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    pub group_id: GroupId,
    pub name: String,
    #[serde(default)]
    pub lecture_hours: u32,
    #[serde(default)]
    pub practice_hours: u32,
    #[serde(default)]
    pub requires_subgroups: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lecturer {
    pub id: LecturerId,
    pub name: String,
    #[serde(default)]
    pub subject_ids: BTreeSet<SubjectId>,
    #[serde(default)]
    pub can_teach_lecture: bool,
    #[serde(default)]
    pub can_teach_practice: bool,
}

impl Lecturer {
    pub fn teaches(&self, subject: &SubjectId) -> bool {
        self.subject_ids.contains(subject)
    }

    pub fn can_teach(&self, kind: SessionKind) -> bool {
        match kind {
            SessionKind::Lecture => self.can_teach_lecture,
            SessionKind::Practice => self.can_teach_practice,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classroom {
    pub id: ClassroomId,
    pub capacity: u32,
}

/// One placed teaching session. `day` and `period` are the coordinates the
/// session was generated with; the timetable cell holding it is authoritative
/// for occupancy.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub group: GroupId,
    pub subject: SubjectId,
    pub lecturer: LecturerId,
    pub classroom: ClassroomId,
    pub day: DayOfWeek,
    pub period: u8,
    pub kind: SessionKind,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session(Group: {}, Subject: {}, Lecturer: {}, Classroom: {}, Day: {}, Period: {}, Type: {})",
            self.group, self.subject, self.lecturer, self.classroom, self.day, self.period, self.kind
        )
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Negative absolute deviation from the weekly quotas.
    #[default]
    Requirements,
    /// Occupied periods minus windows, summed over days.
    Gaps,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuotaMode {
    #[default]
    Uniform,
    /// Quotas come from the subject's lecture and practice hours.
    SubjectHours,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    #[serde(default = "Policy::default_lectures")]
    pub lectures_per_week: u32,
    #[serde(default = "Policy::default_practices")]
    pub practices_per_subgroup: u32,
    #[serde(default)]
    pub quota: QuotaMode,
    #[serde(default)]
    pub scoring: ScoringMode,
}

impl Policy {
    fn default_lectures() -> u32 {
        2
    }

    fn default_practices() -> u32 {
        1
    }

    pub fn required(&self, group: &Group, subject: &Subject, kind: SessionKind) -> u32 {
        match (self.quota, kind) {
            (QuotaMode::Uniform, SessionKind::Lecture) => self.lectures_per_week,
            (QuotaMode::Uniform, SessionKind::Practice) => {
                self.practices_per_subgroup * group.effective_subgroups()
            }
            (QuotaMode::SubjectHours, SessionKind::Lecture) => subject.lecture_hours,
            (QuotaMode::SubjectHours, SessionKind::Practice) => {
                if subject.requires_subgroups {
                    subject.practice_hours * group.effective_subgroups()
                } else {
                    subject.practice_hours
                }
            }
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            lectures_per_week: Self::default_lectures(),
            practices_per_subgroup: Self::default_practices(),
            quota: QuotaMode::default(),
            scoring: ScoringMode::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    pub groups: Vec<Group>,
    pub subjects: Vec<Subject>,
    pub lecturers: Vec<Lecturer>,
    pub classrooms: Vec<Classroom>,
    #[serde(default)]
    pub grid: GridShape,
    #[serde(default)]
    pub policy: Policy,
}

impl Instance {
    pub fn new(
        groups: Vec<Group>,
        subjects: Vec<Subject>,
        lecturers: Vec<Lecturer>,
        classrooms: Vec<Classroom>,
    ) -> Self {
        Self {
            groups,
            subjects,
            lecturers,
            classrooms,
            grid: GridShape::default(),
            policy: Policy::default(),
        }
    }

    pub fn with_grid(mut self, grid: GridShape) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    pub fn lecturer(&self, id: &LecturerId) -> Option<&Lecturer> {
        self.lecturers.iter().find(|l| &l.id == id)
    }

    pub fn subjects_of<'a>(&'a self, group: &'a GroupId) -> impl Iterator<Item = &'a Subject> + 'a {
        self.subjects.iter().filter(move |s| &s.group_id == group)
    }
}

/// A (group, subject, kind) whose placed count fell short of its quota.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shortfall {
    pub group: GroupId,
    pub subject: SubjectId,
    pub kind: SessionKind,
    pub required: u32,
    pub placed: u32,
}

impl Shortfall {
    pub fn missing(&self) -> u32 {
        self.required.saturating_sub(self.placed)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Complete,
    Partial,
    Empty,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub score: i64,
    pub timetable: Timetable,
    pub unmet_sessions: u32,
    pub shortfalls: Vec<Shortfall>,
    pub stats: serde_json::Value,
}
