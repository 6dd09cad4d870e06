use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use types::{
    Classroom, ClassroomId, Group, GroupId, Instance, Lecturer, LecturerId, Subject, SubjectId,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub groups: PathBuf,
    pub subjects: PathBuf,
    pub lecturers: PathBuf,
    pub classrooms: PathBuf,
}

impl InputPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            groups: dir.join("group.csv"),
            subjects: dir.join("subjects.csv"),
            lecturers: dir.join("lecturers.csv"),
            classrooms: dir.join("classrooms.csv"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GroupRow {
    group_id: String,
    students: u32,
    subgroups: u32,
}

#[derive(Debug, Deserialize)]
struct SubjectRow {
    group_id: String,
    subject_id: u32,
    subject_name: String,
    lecture_hours: u32,
    practice_hours: u32,
    requires_subgroups: String,
}

#[derive(Debug, Deserialize)]
struct LecturerRow {
    lecturer_id: String,
    lecturer_name: String,
    subject_ids: String,
    can_teach_lecture: String,
    can_teach_practice: String,
}

#[derive(Debug, Deserialize)]
struct ClassroomRow {
    classroom_id: String,
    capacity: u32,
}

/// Extracts the numeric ids from a list such as `"[1, 2, 3]"`.
/// Brackets and whitespace are ignored, non-numeric tokens dropped.
pub fn parse_subject_ids(raw: &str) -> Vec<SubjectId> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']') && !c.is_whitespace())
        .collect();
    cleaned
        .split(',')
        .filter(|tok| !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|tok| tok.parse().ok())
        .map(SubjectId)
        .collect()
}

/// `yes` in any case is true; everything else is false.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("yes")
}

fn rows<T, R>(reader: R, table: &'static str) -> Result<Vec<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize::<T>()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| LoadError::Parse { table, source })
}

pub fn read_groups<R: Read>(reader: R) -> Result<Vec<Group>, LoadError> {
    Ok(rows::<GroupRow, _>(reader, "group")?
        .into_iter()
        .map(|r| Group {
            id: GroupId(r.group_id),
            students: r.students,
            subgroups: r.subgroups,
        })
        .collect())
}

pub fn read_subjects<R: Read>(reader: R) -> Result<Vec<Subject>, LoadError> {
    Ok(rows::<SubjectRow, _>(reader, "subjects")?
        .into_iter()
        .map(|r| Subject {
            id: SubjectId(r.subject_id),
            group_id: GroupId(r.group_id),
            name: r.subject_name,
            lecture_hours: r.lecture_hours,
            practice_hours: r.practice_hours,
            requires_subgroups: parse_flag(&r.requires_subgroups),
        })
        .collect())
}

pub fn read_lecturers<R: Read>(reader: R) -> Result<Vec<Lecturer>, LoadError> {
    Ok(rows::<LecturerRow, _>(reader, "lecturers")?
        .into_iter()
        .map(|r| Lecturer {
            id: LecturerId(r.lecturer_id),
            name: r.lecturer_name,
            subject_ids: parse_subject_ids(&r.subject_ids).into_iter().collect(),
            can_teach_lecture: parse_flag(&r.can_teach_lecture),
            can_teach_practice: parse_flag(&r.can_teach_practice),
        })
        .collect())
}

pub fn read_classrooms<R: Read>(reader: R) -> Result<Vec<Classroom>, LoadError> {
    Ok(rows::<ClassroomRow, _>(reader, "classrooms")?
        .into_iter()
        .map(|r| Classroom {
            id: ClassroomId(r.classroom_id),
            capacity: r.capacity,
        })
        .collect())
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads all four tables into an [`Instance`] with the default grid and policy.
pub fn load_instance(paths: &InputPaths) -> Result<Instance, LoadError> {
    let groups = read_groups(open(&paths.groups)?)?;
    let subjects = read_subjects(open(&paths.subjects)?)?;
    let lecturers = read_lecturers(open(&paths.lecturers)?)?;
    let classrooms = read_classrooms(open(&paths.classrooms)?)?;
    tracing::debug!(
        groups = groups.len(),
        subjects = subjects.len(),
        lecturers = lecturers.len(),
        classrooms = classrooms.len(),
        "input tables loaded"
    );
    Ok(Instance::new(groups, subjects, lecturers, classrooms))
}
