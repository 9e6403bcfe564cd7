//! Typed data access over the bridge. One method per backend operation; no
//! caching and no validation beyond what the types enforce.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::bridge::{ops, Invoke};
use crate::error::{AppError, Result};
use crate::records::Student;

pub mod preferences;

pub use preferences::Preferences;

#[derive(Clone)]
pub struct StudentApi {
    bridge: Arc<dyn Invoke>,
}

impl StudentApi {
    pub fn new(bridge: Arc<dyn Invoke>) -> Self {
        Self { bridge }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(Arc::clone(&self.bridge))
    }

    async fn call<T: DeserializeOwned>(&self, operation: &str, params: Value) -> Result<T> {
        let value = self.bridge.invoke(operation, params).await?;
        serde_json::from_value(value).map_err(|err| {
            AppError::message(format!("Unexpected {operation} response: {err}"))
        })
    }

    pub async fn list_students(&self, csv_path: &str) -> Result<Vec<Student>> {
        self.call(ops::GET_STUDENTS, json!({ "csvPath": csv_path }))
            .await
    }

    /// `Ok(None)` when the backend has no student with this id.
    pub async fn get_student(&self, id: i64) -> Result<Option<Student>> {
        self.call(ops::GET_STUDENT_BY_ID, json!({ "student_id": id }))
            .await
    }

    pub async fn set_mark(&self, id: i64, task_id: usize, mark: f64) -> Result<()> {
        self.bridge
            .invoke(
                ops::SET_STUDENT_MARK,
                json!({ "student_id": id, "task_id": task_id, "mark": mark }),
            )
            .await?;
        Ok(())
    }

    pub async fn generate_mark(&self, id: i64, task_id: usize) -> Result<f64> {
        self.call(
            ops::GENERATE_MARK_FOR_TASK,
            json!({ "student_id": id, "task_id": task_id }),
        )
        .await
    }

    /// Save a student; a record carrying the new-student id is created.
    pub async fn update_student(&self, student: &Student) -> Result<()> {
        self.bridge
            .invoke(ops::UPDATE_STUDENT, json!({ "student": student }))
            .await?;
        Ok(())
    }

    pub async fn students_with_missing_tasks(&self) -> Result<Vec<Student>> {
        self.call(ops::CHECK_STUDENTS_WITH_MISSING_TASKS, json!({}))
            .await
    }

    /// Location of the backend's preference file.
    pub async fn store_path(&self) -> Result<String> {
        self.call(ops::GET_PATH, json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::RecordingBridge;
    use crate::records::{NEW_STUDENT_ID, TASK_COUNT};

    fn api(bridge: &RecordingBridge) -> StudentApi {
        StudentApi::new(Arc::new(bridge.clone()))
    }

    #[tokio::test]
    async fn empty_task_forms_collapse_to_none() {
        let bridge = RecordingBridge::new(|_, _| {
            Ok(json!([
                {"id": 1, "name": "A", "class_id": 1, "epa": 3.0, "tasks": [5, "", null]},
                {"id": 2, "name": "B", "class_id": 1, "epa": 2.0}
            ]))
        });
        let students = api(&bridge).list_students("/tmp/s.csv").await.unwrap();
        assert_eq!(students[0].tasks, [Some(5.0), None, None, None]);
        assert_eq!(students[1].tasks, [None; TASK_COUNT]);
        assert_eq!(
            bridge.calls_to(ops::GET_STUDENTS),
            vec![json!({"csvPath": "/tmp/s.csv"})]
        );
    }

    #[tokio::test]
    async fn missing_student_reads_as_none() {
        let bridge = RecordingBridge::new(|_, _| Ok(Value::Null));
        assert_eq!(api(&bridge).get_student(4).await.unwrap(), None);
        assert_eq!(
            bridge.calls_to(ops::GET_STUDENT_BY_ID),
            vec![json!({"student_id": 4})]
        );
    }

    #[tokio::test]
    async fn writes_use_fixed_parameter_names() {
        let bridge = RecordingBridge::new(|op, _| match op {
            ops::GENERATE_MARK_FOR_TASK => Ok(json!(7)),
            _ => Ok(Value::Null),
        });
        let api = api(&bridge);
        assert_eq!(api.generate_mark(3, 2).await.unwrap(), 7.0);
        api.set_mark(3, 2, 7.0).await.unwrap();
        api.update_student(&Student::new(NEW_STUDENT_ID, "C", 2, 4.5, [None; TASK_COUNT]))
            .await
            .unwrap();

        assert_eq!(
            bridge.calls_to(ops::SET_STUDENT_MARK),
            vec![json!({"student_id": 3, "task_id": 2, "mark": 7.0})]
        );
        let update = &bridge.calls_to(ops::UPDATE_STUDENT)[0];
        assert_eq!(update["student"]["id"], json!(-1));
    }

    #[tokio::test]
    async fn shape_mismatch_is_an_error() {
        let bridge = RecordingBridge::new(|_, _| Ok(json!("seven")));
        assert!(api(&bridge).generate_mark(1, 1).await.is_err());
    }

    #[tokio::test]
    async fn store_path_is_a_string() {
        let bridge = RecordingBridge::new(|op, _| match op {
            ops::GET_PATH => Ok(json!("/data/student-records/store.json")),
            other => Err(AppError::message(format!("unexpected {other}"))),
        });
        assert_eq!(
            api(&bridge).store_path().await.unwrap(),
            "/data/student-records/store.json"
        );
        assert_eq!(bridge.calls_to(ops::GET_PATH), vec![json!({})]);
    }
}
