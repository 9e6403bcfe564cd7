//! The records backend: CSV dataset, preference file and mark generation,
//! reachable only through the operation router.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::Value;

use crate::bridge::ops::CSV_PATH_KEY;
use crate::records::Student;

pub mod database;
pub mod error;
pub mod marks;
pub mod router;
pub mod store;

pub use database::CsvDatabase;
pub use error::BackendError;
pub use router::{handle_request, serve};
pub use store::PreferenceFile;

/// Backend state. The CSV is re-read for every call so edits made outside the
/// application are picked up.
#[derive(Debug, Clone)]
pub struct Backend {
    store: PreferenceFile,
}

impl Backend {
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, BackendError> {
        let store = PreferenceFile::open(data_dir)?;
        info!("Backend store at {}", store.path().display());
        Ok(Self { store })
    }

    pub fn store(&self) -> &PreferenceFile {
        &self.store
    }

    pub fn get_key(&self, key: &str) -> Value {
        self.store.get(key).unwrap_or(Value::Null)
    }

    pub fn set_key(&self, key: &str, value: Value) -> Result<(), BackendError> {
        self.store.set(key, value)
    }

    /// Stored CSV location; a missing, non-string or empty value means setup is incomplete.
    fn stored_csv_path(&self) -> Result<PathBuf, BackendError> {
        match self.store.get(CSV_PATH_KEY) {
            Some(Value::String(path)) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => Err(BackendError::NoDataFile),
        }
    }

    fn database(&self, csv_path: Option<&str>) -> Result<CsvDatabase, BackendError> {
        let path = match csv_path.filter(|path| !path.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => self.stored_csv_path()?,
        };
        debug!("Loading students from {}", path.display());
        CsvDatabase::load(path)
    }

    pub fn students(&self, csv_path: Option<&str>) -> Result<Vec<Student>, BackendError> {
        Ok(self.database(csv_path)?.into_students())
    }

    pub fn student(&self, id: i64) -> Result<Option<Student>, BackendError> {
        Ok(self.database(None)?.get(id).cloned())
    }

    pub fn set_mark(&self, id: i64, task_id: usize, mark: f64) -> Result<(), BackendError> {
        let mut db = self.database(None)?;
        db.set_mark(id, task_id, mark)?;
        db.save()?;
        info!("Stored mark {mark} for student {id}, task {task_id}");
        Ok(())
    }

    pub fn generate_mark(&self, id: i64, task_id: usize) -> Result<f64, BackendError> {
        let db = self.database(None)?;
        let mark = marks::generate_mark(db.students(), id, task_id)?;
        info!("Generated mark {mark} for student {id}, task {task_id}");
        Ok(mark)
    }

    /// Insert or replace a student. Negative ids are assigned the next free id.
    pub fn update_student(&self, student: Student) -> Result<Student, BackendError> {
        let mut db = self.database(None)?;
        let stored = db.upsert(student);
        db.save()?;
        info!("Saved student {} ({})", stored.id, stored.name);
        Ok(stored)
    }

    pub fn students_with_missing_tasks(&self) -> Result<Vec<Student>, BackendError> {
        Ok(self.database(None)?.with_missing_tasks())
    }
}
