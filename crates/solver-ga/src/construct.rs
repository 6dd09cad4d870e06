//! Greedy randomized construction of a single timetable.
//!
//! Each (group, subject) pair gets one attempt at a lecture and one at a
//! practice. Resources are drawn at random among those that qualify, and the
//! slot is the first one where lecturer, classroom and group are all free.
//! Nothing is backtracked: a pair that cannot be placed stays unplaced.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;
use types::{Classroom, Group, Lecturer, Session, SessionKind, Subject, Timetable};

use crate::catalog::Catalog;
use crate::config::SlotStrategy;

pub fn build_timetable<R: Rng>(catalog: &Catalog<'_>, strategy: SlotStrategy, rng: &mut R) -> Timetable {
    let inst = catalog.instance();
    let mut tt = Timetable::empty(&inst.grid);

    let mut groups: Vec<&Group> = catalog.groups().iter().collect();
    groups.shuffle(rng);

    for group in groups {
        let mut subjects = catalog.subjects_of(&group.id).to_vec();
        subjects.shuffle(rng);

        for subject in subjects {
            for kind in SessionKind::ALL {
                match place(catalog, &tt, group, subject, kind, strategy, rng) {
                    Some((day, session)) => {
                        trace!(%session, "scheduled");
                        tt.push(day, session.period, session);
                    }
                    None => trace!(
                        group = %group.id,
                        subject = %subject.id,
                        %kind,
                        "left unscheduled"
                    ),
                }
            }
        }
    }
    tt
}

fn place<R: Rng>(
    catalog: &Catalog<'_>,
    tt: &Timetable,
    group: &Group,
    subject: &Subject,
    kind: SessionKind,
    strategy: SlotStrategy,
    rng: &mut R,
) -> Option<(usize, Session)> {
    let lecturer = find_lecturer(catalog, subject, kind, rng)?;
    let classroom = find_classroom(catalog, group.headcount(kind), rng)?;
    let (day, period) = find_slot(tt, strategy, lecturer, classroom, group)?;
    Some((
        day,
        Session {
            group: group.id.clone(),
            subject: subject.id.clone(),
            lecturer: lecturer.id.clone(),
            classroom: classroom.id.clone(),
            day: tt.days()[day],
            period,
            kind,
        },
    ))
}

/// A random lecturer who teaches `subject` and can give a `kind` session.
pub fn find_lecturer<'a, R: Rng>(
    catalog: &Catalog<'a>,
    subject: &Subject,
    kind: SessionKind,
    rng: &mut R,
) -> Option<&'a Lecturer> {
    catalog
        .lecturers_for(subject, Some(kind))
        .choose(rng)
        .copied()
}

pub fn find_classroom<'a, R: Rng>(
    catalog: &Catalog<'a>,
    headcount: u32,
    rng: &mut R,
) -> Option<&'a Classroom> {
    catalog.classrooms_for(headcount).choose(rng).copied()
}

/// First `(day index, period)` where lecturer, classroom and group are all
/// free. Balanced scans days from least to most loaded, ties in grid order.
pub fn find_slot(
    tt: &Timetable,
    strategy: SlotStrategy,
    lecturer: &Lecturer,
    classroom: &Classroom,
    group: &Group,
) -> Option<(usize, u8)> {
    let mut days: Vec<usize> = (0..tt.days().len()).collect();
    if strategy == SlotStrategy::Balanced {
        days.sort_by_key(|&d| tt.day_load(d));
    }

    days.into_iter().find_map(|day| {
        (1..=tt.periods())
            .find(|&p| tt.is_free(day, p, &lecturer.id, &classroom.id, &group.id))
            .map(|p| (day, p))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;
    use types::{ClassroomId, DayOfWeek, GridShape, GroupId, Instance, LecturerId, SubjectId};

    fn single_pair(lecturers: Vec<Lecturer>) -> Instance {
        Instance::new(
            vec![Group {
                id: GroupId("G1".into()),
                students: 30,
                subgroups: 1,
            }],
            vec![Subject {
                id: SubjectId(1),
                group_id: GroupId("G1".into()),
                name: "Calculus".into(),
                lecture_hours: 2,
                practice_hours: 1,
                requires_subgroups: false,
            }],
            lecturers,
            vec![Classroom {
                id: ClassroomId("R30".into()),
                capacity: 30,
            }],
        )
    }

    fn versatile(id: &str, subjects: &[u32]) -> Lecturer {
        Lecturer {
            id: LecturerId(id.into()),
            name: id.to_lowercase(),
            subject_ids: subjects.iter().copied().map(SubjectId).collect(),
            can_teach_lecture: true,
            can_teach_practice: true,
        }
    }

    #[test]
    fn single_pair_places_one_lecture_and_one_practice() {
        let inst = single_pair(vec![versatile("L1", &[1])]);
        let catalog = Catalog::new(&inst);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tt = build_timetable(&catalog, SlotStrategy::Balanced, &mut rng);

            let placed: Vec<(usize, u8, &Session)> = tt
                .slots()
                .flat_map(|(d, p, s)| s.iter().map(move |x| (d, p, x)))
                .collect();
            assert_eq!(placed.len(), 2);
            let kinds: HashSet<SessionKind> = placed.iter().map(|(_, _, s)| s.kind).collect();
            assert_eq!(kinds.len(), 2);
            assert_ne!((placed[0].0, placed[0].1), (placed[1].0, placed[1].1));
            for (_, _, s) in &placed {
                assert_eq!(s.lecturer, LecturerId("L1".into()));
                assert_eq!(s.classroom, ClassroomId("R30".into()));
            }
        }
    }

    #[test]
    fn balanced_strategy_spreads_over_days() {
        let inst = single_pair(vec![versatile("L1", &[1])]);
        let catalog = Catalog::new(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tt = build_timetable(&catalog, SlotStrategy::Balanced, &mut rng);
        // Monday is loaded after the lecture, so the practice goes to Tuesday.
        assert_eq!(tt.slot(0, 1).len(), 1);
        assert_eq!(tt.slot(1, 1).len(), 1);
        assert_eq!(tt.slot(0, 1)[0].kind, SessionKind::Lecture);
        assert_eq!(tt.slot(1, 1)[0].day, DayOfWeek::Tue);
    }

    #[test]
    fn first_fit_packs_the_first_day() {
        let inst = single_pair(vec![versatile("L1", &[1])]);
        let catalog = Catalog::new(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tt = build_timetable(&catalog, SlotStrategy::FirstFit, &mut rng);
        assert_eq!(tt.day_load(0), 2);
        assert_eq!(tt.slot(0, 1).len(), 1);
        assert_eq!(tt.slot(0, 2).len(), 1);
    }

    #[test]
    fn unqualified_subject_is_left_empty() {
        let inst = single_pair(vec![versatile("L1", &[42])]);
        let catalog = Catalog::new(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let tt = build_timetable(&catalog, SlotStrategy::Balanced, &mut rng);
        assert!(tt.is_empty());
    }

    #[test]
    fn practice_only_lecturer_skips_lecture() {
        let mut l = versatile("L1", &[1]);
        l.can_teach_lecture = false;
        let inst = single_pair(vec![l]);
        let catalog = Catalog::new(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let tt = build_timetable(&catalog, SlotStrategy::Balanced, &mut rng);
        assert_eq!(tt.len(), 1);
        assert!(tt.sessions().all(|s| s.kind == SessionKind::Practice));
    }

    #[test]
    fn odd_group_practice_fits_half_size_room() {
        let mut l = versatile("L1", &[1]);
        l.can_teach_lecture = false;
        let mut inst = single_pair(vec![l]);
        inst.groups[0].students = 31;
        inst.classrooms[0].capacity = 15;
        let catalog = Catalog::new(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let tt = build_timetable(&catalog, SlotStrategy::Balanced, &mut rng);
        assert_eq!(tt.len(), 1);
        assert!(tt.sessions().all(|s| s.classroom == ClassroomId("R30".into())));
    }

    #[test]
    fn full_grid_leaves_sessions_unscheduled() {
        let inst = single_pair(vec![versatile("L1", &[1])]).with_grid(GridShape::weekdays(1, 1));
        let catalog = Catalog::new(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tt = build_timetable(&catalog, SlotStrategy::Balanced, &mut rng);
        // group, lecturer and room all collide in the only slot
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn find_slot_skips_busy_resources() {
        let inst = single_pair(vec![versatile("L1", &[1]), versatile("L2", &[1])]);
        let mut tt = Timetable::empty(&inst.grid);
        tt.push(
            0,
            1,
            Session {
                group: GroupId("other".into()),
                subject: SubjectId(9),
                lecturer: LecturerId("L1".into()),
                classroom: ClassroomId("elsewhere".into()),
                day: DayOfWeek::Mon,
                period: 1,
                kind: SessionKind::Lecture,
            },
        );
        let group = &inst.groups[0];
        let room = &inst.classrooms[0];

        let busy = find_slot(&tt, SlotStrategy::FirstFit, &inst.lecturers[0], room, group);
        assert_eq!(busy, Some((0, 2)));
        let free = find_slot(&tt, SlotStrategy::FirstFit, &inst.lecturers[1], room, group);
        assert_eq!(free, Some((0, 1)));
        let balanced = find_slot(&tt, SlotStrategy::Balanced, &inst.lecturers[1], room, group);
        assert_eq!(balanced, Some((1, 1)));
    }
}
