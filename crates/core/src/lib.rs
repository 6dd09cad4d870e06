pub mod scoring;

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

pub use types::{
    Classroom, Group, GroupId, Instance, Lecturer, Policy, Session, SessionKind, Shortfall,
    SolveResult, Subject, SubjectId, Timetable,
};

/// A problem in the input data that prevents some requirement from ever
/// being scheduled.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DataIssue {
    #[error("instance has no groups")]
    NoGroups,
    #[error("grid has no slots")]
    EmptyGrid,
    #[error("duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },
    #[error("subject {subject} references missing group {group}")]
    UnknownGroup { subject: SubjectId, group: GroupId },
    #[error("group {group} has no subjects")]
    GroupWithoutSubjects { group: GroupId },
    #[error("subject {subject} has no lecturer qualified for {kind}")]
    NoQualifiedLecturer { subject: SubjectId, kind: SessionKind },
    #[error("group {group} has no classroom seating {headcount} for {kind}")]
    NoClassroom {
        group: GroupId,
        kind: SessionKind,
        headcount: u32,
    },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid instance: {}", join_issues(.0))]
    Issues(Vec<DataIssue>),
}

fn join_issues(issues: &[DataIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Lists every data issue in `inst`. An empty list means every subject has
/// at least one lecturer and classroom for each session kind.
pub fn audit(inst: &Instance) -> Vec<DataIssue> {
    let mut issues: Vec<DataIssue> = Vec::new();

    if inst.groups.is_empty() {
        issues.push(DataIssue::NoGroups);
    }
    if inst.grid.is_empty() {
        issues.push(DataIssue::EmptyGrid);
    }

    fn chk_unique<I: ToString>(
        entity: &'static str,
        ids: impl Iterator<Item = I>,
        issues: &mut Vec<DataIssue>,
    ) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                issues.push(DataIssue::DuplicateId { entity, id: s });
            }
        }
    }
    chk_unique("group", inst.groups.iter().map(|x| &x.id), &mut issues);
    chk_unique("subject", inst.subjects.iter().map(|x| &x.id), &mut issues);
    chk_unique("lecturer", inst.lecturers.iter().map(|x| &x.id), &mut issues);
    chk_unique("classroom", inst.classrooms.iter().map(|x| &x.id), &mut issues);

    let groups: HashSet<&GroupId> = inst.groups.iter().map(|g| &g.id).collect();
    for s in &inst.subjects {
        if !groups.contains(&s.group_id) {
            issues.push(DataIssue::UnknownGroup {
                subject: s.id.clone(),
                group: s.group_id.clone(),
            });
        }
    }

    for g in &inst.groups {
        if inst.subjects_of(&g.id).next().is_none() {
            issues.push(DataIssue::GroupWithoutSubjects { group: g.id.clone() });
            continue;
        }
        for kind in SessionKind::ALL {
            let headcount = g.headcount(kind);
            if !inst.classrooms.iter().any(|c| c.capacity >= headcount) {
                issues.push(DataIssue::NoClassroom {
                    group: g.id.clone(),
                    kind,
                    headcount,
                });
            }
        }
    }

    for s in &inst.subjects {
        for kind in SessionKind::ALL {
            let qualified = inst
                .lecturers
                .iter()
                .any(|l| l.teaches(&s.id) && l.can_teach(kind));
            if !qualified {
                issues.push(DataIssue::NoQualifiedLecturer {
                    subject: s.id.clone(),
                    kind,
                });
            }
        }
    }

    issues
}

pub fn validate(inst: &Instance) -> Result<(), ValidationError> {
    let issues = audit(inst);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Issues(issues))
    }
}

pub trait Solver: Send + Sync + 'static {
    fn solve(&self, inst: &Instance) -> anyhow::Result<SolveResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ClassroomId, LecturerId};

    fn instance() -> Instance {
        Instance::new(
            vec![Group {
                id: GroupId("G1".into()),
                students: 30,
                subgroups: 1,
            }],
            vec![Subject {
                id: SubjectId(1),
                group_id: GroupId("G1".into()),
                name: "Databases".into(),
                lecture_hours: 2,
                practice_hours: 1,
                requires_subgroups: false,
            }],
            vec![Lecturer {
                id: LecturerId("L1".into()),
                name: "Koval".into(),
                subject_ids: [SubjectId(1)].into_iter().collect(),
                can_teach_lecture: true,
                can_teach_practice: true,
            }],
            vec![Classroom {
                id: ClassroomId("101".into()),
                capacity: 30,
            }],
        )
    }

    #[test]
    fn clean_instance_passes() {
        assert!(audit(&instance()).is_empty());
        assert!(validate(&instance()).is_ok());
    }

    #[test]
    fn missing_lecturer_kind_is_reported() {
        let mut inst = instance();
        inst.lecturers[0].can_teach_practice = false;
        assert_eq!(
            audit(&inst),
            vec![DataIssue::NoQualifiedLecturer {
                subject: SubjectId(1),
                kind: SessionKind::Practice,
            }]
        );
    }

    #[test]
    fn small_rooms_are_reported_per_kind() {
        let mut inst = instance();
        inst.classrooms[0].capacity = 20;
        let issues = audit(&inst);
        assert_eq!(
            issues,
            vec![DataIssue::NoClassroom {
                group: GroupId("G1".into()),
                kind: SessionKind::Lecture,
                headcount: 30,
            }]
        );
    }

    #[test]
    fn practice_seats_round_down() {
        let mut inst = instance();
        inst.groups[0].students = 31;
        inst.classrooms.push(Classroom {
            id: ClassroomId("205".into()),
            capacity: 15,
        });
        inst.classrooms[0].capacity = 31;
        assert!(audit(&inst).is_empty());

        inst.classrooms.remove(0);
        assert_eq!(
            audit(&inst),
            vec![DataIssue::NoClassroom {
                group: GroupId("G1".into()),
                kind: SessionKind::Lecture,
                headcount: 31,
            }]
        );
    }

    #[test]
    fn structural_issues_are_collected() {
        let mut inst = instance();
        inst.subjects.push(Subject {
            group_id: GroupId("G9".into()),
            ..inst.subjects[0].clone()
        });
        inst.groups.push(Group {
            id: GroupId("G2".into()),
            students: 10,
            subgroups: 0,
        });
        let issues = audit(&inst);
        assert!(issues.contains(&DataIssue::DuplicateId {
            entity: "subject",
            id: "1".into()
        }));
        assert!(issues.contains(&DataIssue::UnknownGroup {
            subject: SubjectId(1),
            group: GroupId("G9".into())
        }));
        assert!(issues.contains(&DataIssue::GroupWithoutSubjects {
            group: GroupId("G2".into())
        }));

        let err = validate(&inst).unwrap_err();
        assert!(err.to_string().contains("group G2 has no subjects"));
    }

    #[test]
    fn empty_instance_reports_no_groups() {
        let inst = Instance::new(vec![], vec![], vec![], vec![]);
        assert_eq!(audit(&inst), vec![DataIssue::NoGroups]);
    }
}
