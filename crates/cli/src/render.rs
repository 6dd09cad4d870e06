use std::fmt::Write;

use types::{Instance, Session, SolveResult, Timetable};

/// Like `Session`'s `Display`, with subject and lecturer names looked up in
/// `inst`. Unknown ids are printed as-is.
fn describe(inst: &Instance, s: &Session) -> String {
    let subject = inst
        .subject(&s.subject)
        .map_or_else(|| s.subject.to_string(), |x| x.name.clone());
    let lecturer = inst
        .lecturer(&s.lecturer)
        .map_or_else(|| s.lecturer.to_string(), |x| x.name.clone());
    format!(
        "Session(Group: {}, Subject: {}, Lecturer: {}, Classroom: {}, Day: {}, Period: {}, Type: {})",
        s.group, subject, lecturer, s.classroom, s.day, s.period, s.kind
    )
}

pub fn render_timetable(inst: &Instance, tt: &Timetable) -> String {
    let mut out = String::new();
    for (d, day) in tt.days().iter().enumerate() {
        let _ = writeln!(out, "\n{day}");
        for period in 1..=tt.periods() {
            let sessions: Vec<String> = tt.slot(d, period).iter().map(|s| describe(inst, s)).collect();
            let _ = writeln!(out, "  Period {period}: [{}]", sessions.join(", "));
        }
    }
    out
}

pub fn render_summary(res: &SolveResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "status: {:?}  score: {}  sessions: {}  unmet: {}",
        res.status,
        res.score,
        res.timetable.len(),
        res.unmet_sessions
    );
    for s in &res.shortfalls {
        let _ = writeln!(
            out,
            "  missing {} {} for group {} subject {} ({} of {} placed)",
            s.missing(),
            s.kind,
            s.group,
            s.subject,
            s.placed,
            s.required
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{
        Classroom, ClassroomId, DayOfWeek, GridShape, Group, GroupId, Lecturer, LecturerId,
        SessionKind, Shortfall, SolveStatus, Subject, SubjectId,
    };

    fn instance() -> Instance {
        Instance::new(
            vec![Group {
                id: GroupId("KN-11".into()),
                students: 30,
                subgroups: 2,
            }],
            vec![Subject {
                id: SubjectId(3),
                group_id: GroupId("KN-11".into()),
                name: "Operating Systems".into(),
                lecture_hours: 2,
                practice_hours: 1,
                requires_subgroups: true,
            }],
            vec![Lecturer {
                id: LecturerId("L1".into()),
                name: "Hrytsenko".into(),
                subject_ids: [SubjectId(3)].into_iter().collect(),
                can_teach_lecture: true,
                can_teach_practice: true,
            }],
            vec![Classroom {
                id: ClassroomId("101".into()),
                capacity: 30,
            }],
        )
        .with_grid(GridShape::weekdays(2, 2))
    }

    fn lecture() -> Session {
        Session {
            group: GroupId("KN-11".into()),
            subject: SubjectId(3),
            lecturer: LecturerId("L1".into()),
            classroom: ClassroomId("101".into()),
            day: DayOfWeek::Tue,
            period: 2,
            kind: SessionKind::Lecture,
        }
    }

    #[test]
    fn lists_every_period_by_name() {
        let inst = instance();
        let mut tt = Timetable::empty(&inst.grid);
        tt.push(1, 2, lecture());
        let text = render_timetable(&inst, &tt);

        assert!(text.contains("\nMonday\n  Period 1: []\n  Period 2: []\n"));
        assert!(text.contains(
            "\nTuesday\n  Period 1: []\n  Period 2: [Session(Group: KN-11, \
             Subject: Operating Systems, Lecturer: Hrytsenko, Classroom: 101, \
             Day: Tuesday, Period: 2, Type: lecture)]\n"
        ));
    }

    #[test]
    fn unknown_ids_fall_back_to_display() {
        let mut inst = instance();
        inst.lecturers.clear();
        let mut tt = Timetable::empty(&inst.grid);
        tt.push(1, 2, lecture());
        let text = render_timetable(&inst, &tt);
        assert!(text.contains("Subject: Operating Systems, Lecturer: L1,"));
    }

    #[test]
    fn summary_lists_shortfalls() {
        let res = SolveResult {
            status: SolveStatus::Partial,
            score: -1,
            timetable: Timetable::empty(&GridShape::default()),
            unmet_sessions: 1,
            shortfalls: vec![Shortfall {
                group: GroupId("KN-11".into()),
                subject: SubjectId(3),
                kind: SessionKind::Practice,
                required: 2,
                placed: 1,
            }],
            stats: serde_json::Value::Null,
        };
        let text = render_summary(&res);
        assert!(text.starts_with("status: Partial  score: -1  sessions: 0  unmet: 1\n"));
        assert!(text.contains("missing 1 practice for group KN-11 subject 3 (1 of 2 placed)"));
    }
}
