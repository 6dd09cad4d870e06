use std::collections::HashMap;
use types::{Classroom, Group, GroupId, Instance, Lecturer, SessionKind, Subject};

/// Read-only lookups over an [`Instance`], built once per run and shared by
/// the constructor and the mutation operator.
pub struct Catalog<'a> {
    inst: &'a Instance,
    subjects_by_group: HashMap<&'a GroupId, Vec<&'a Subject>>,
}

impl<'a> Catalog<'a> {
    pub fn new(inst: &'a Instance) -> Self {
        let mut subjects_by_group: HashMap<&GroupId, Vec<&Subject>> = HashMap::new();
        for s in &inst.subjects {
            subjects_by_group.entry(&s.group_id).or_default().push(s);
        }
        Self {
            inst,
            subjects_by_group,
        }
    }

    pub fn instance(&self) -> &'a Instance {
        self.inst
    }

    pub fn groups(&self) -> &'a [Group] {
        &self.inst.groups
    }

    pub fn subjects_of(&self, group: &GroupId) -> &[&'a Subject] {
        self.subjects_by_group
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Lecturers who teach `subject`, restricted to those able to give a
    /// session of `kind` when one is given.
    pub fn lecturers_for(&self, subject: &Subject, kind: Option<SessionKind>) -> Vec<&'a Lecturer> {
        self.inst
            .lecturers
            .iter()
            .filter(|l| l.teaches(&subject.id))
            .filter(|l| kind.map_or(true, |k| l.can_teach(k)))
            .collect()
    }

    pub fn classrooms_for(&self, headcount: u32) -> Vec<&'a Classroom> {
        self.inst
            .classrooms
            .iter()
            .filter(|c| c.capacity >= headcount)
            .collect()
    }
}
