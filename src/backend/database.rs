use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::BackendError;
use crate::records::{format_mark, task_index, Student, TASK_COUNT};

const HEADERS: [&str; 4 + TASK_COUNT] = [
    "id",
    "Student",
    "Class",
    "EPA Score",
    "Task 1",
    "Task 2",
    "Task 3",
    "Task 4",
];

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: i64,
    #[serde(rename = "Student")]
    name: String,
    #[serde(rename = "Class")]
    class_id: i64,
    #[serde(rename = "EPA Score")]
    epa: f64,
    #[serde(rename = "Task 1", deserialize_with = "csv::invalid_option")]
    task_1: Option<f64>,
    #[serde(rename = "Task 2", deserialize_with = "csv::invalid_option")]
    task_2: Option<f64>,
    #[serde(rename = "Task 3", deserialize_with = "csv::invalid_option")]
    task_3: Option<f64>,
    #[serde(rename = "Task 4", deserialize_with = "csv::invalid_option")]
    task_4: Option<f64>,
}

impl From<CsvRow> for Student {
    fn from(row: CsvRow) -> Self {
        let tasks = [row.task_1, row.task_2, row.task_3, row.task_4]
            .map(|mark| mark.filter(|value| value.is_finite()));
        Student::new(row.id, row.name, row.class_id, row.epa, tasks)
    }
}

/// In-memory copy of the students CSV, kept sorted by id.
#[derive(Debug, Clone)]
pub struct CsvDatabase {
    path: PathBuf,
    students: Vec<Student>,
}

impl CsvDatabase {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BackendError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("data file {} does not exist", path.display()),
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut students = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            students.push(Student::from(row?));
        }

        Ok(Self::from_students(path, students))
    }

    pub fn from_students<P: Into<PathBuf>>(path: P, mut students: Vec<Student>) -> Self {
        students.sort_by_key(|student| student.id);
        Self {
            path: path.into(),
            students,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn into_students(self) -> Vec<Student> {
        self.students
    }

    pub fn get(&self, id: i64) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn with_missing_tasks(&self) -> Vec<Student> {
        self.students
            .iter()
            .filter(|student| student.has_empty_tasks())
            .cloned()
            .collect()
    }

    /// Largest id plus one, or 1 for an empty dataset.
    pub fn next_id(&self) -> i64 {
        self.students
            .iter()
            .map(|student| student.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Replace the row with the same id, or insert it. Negative ids get a fresh id first.
    pub fn upsert(&mut self, mut student: Student) -> Student {
        if student.is_new() {
            student.id = self.next_id();
        }
        match self.students.iter_mut().find(|row| row.id == student.id) {
            Some(existing) => *existing = student.clone(),
            None => {
                self.students.push(student.clone());
                self.students.sort_by_key(|row| row.id);
            }
        }
        student
    }

    pub fn set_mark(&mut self, id: i64, task_id: usize, mark: f64) -> Result<(), BackendError> {
        if task_index(task_id).is_none() {
            return Err(BackendError::InvalidTask(task_id));
        }
        let student = self
            .students
            .iter_mut()
            .find(|student| student.id == id)
            .ok_or(BackendError::StudentNotFound(id))?;
        student.set_task(task_id, Some(mark));
        Ok(())
    }

    pub fn save(&self) -> Result<(), BackendError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(HEADERS)?;

        for student in &self.students {
            let mut record = vec![
                student.id.to_string(),
                student.name.clone(),
                student.class_id.to_string(),
                student.epa.to_string(),
            ];
            record.extend(
                student
                    .tasks
                    .iter()
                    .map(|mark| mark.map(format_mark).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}
