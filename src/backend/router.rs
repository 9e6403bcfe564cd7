use std::io::{BufRead, Write};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::BackendError;
use super::Backend;
use crate::bridge::envelope::{Request, Response};
use crate::bridge::ops;
use crate::records::Student;

#[derive(Debug, Deserialize)]
struct KeyParams {
    key: String,
}

#[derive(Debug, Deserialize)]
struct SetKeyParams {
    key: String,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Default, Deserialize)]
struct StudentsParams {
    #[serde(default, rename = "csvPath")]
    csv_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StudentIdParams {
    student_id: i64,
}

#[derive(Debug, Deserialize)]
struct TaskParams {
    student_id: i64,
    task_id: usize,
}

#[derive(Debug, Deserialize)]
struct MarkParams {
    student_id: i64,
    task_id: usize,
    mark: f64,
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    student: Student,
}

fn params<T: DeserializeOwned>(value: Value) -> Result<T, BackendError> {
    // A missing params object reads as an empty one.
    let value = if value.is_null() { json!({}) } else { value };
    serde_json::from_value(value).map_err(|err| BackendError::BadParams(err.to_string()))
}

/// Answer one request. Never panics; every failure becomes an error envelope.
pub fn handle_request(backend: &Backend, req: Request) -> Response {
    debug!("handling {} #{}", req.method, req.id);
    match dispatch(backend, &req.method, req.params) {
        Ok(result) => Response::success(req.id, result),
        Err(err) => {
            warn!("{} #{} failed: {err}", req.method, req.id);
            Response::failure(Some(req.id), err.code(), err.to_string())
        }
    }
}

fn dispatch(backend: &Backend, method: &str, raw: Value) -> Result<Value, BackendError> {
    match method {
        ops::GET_DATA_KEY => {
            let p: KeyParams = params(raw)?;
            Ok(backend.get_key(&p.key))
        }
        ops::SET_DATA_KEY => {
            let p: SetKeyParams = params(raw)?;
            backend.set_key(&p.key, p.value)?;
            Ok(Value::Null)
        }
        ops::GET_STUDENTS => {
            let p: StudentsParams = params(raw)?;
            Ok(serde_json::to_value(backend.students(p.csv_path.as_deref())?)?)
        }
        ops::GET_STUDENT_BY_ID => {
            let p: StudentIdParams = params(raw)?;
            Ok(serde_json::to_value(backend.student(p.student_id)?)?)
        }
        ops::SET_STUDENT_MARK => {
            let p: MarkParams = params(raw)?;
            backend.set_mark(p.student_id, p.task_id, p.mark)?;
            Ok(Value::Null)
        }
        ops::GENERATE_MARK_FOR_TASK => {
            let p: TaskParams = params(raw)?;
            Ok(json!(backend.generate_mark(p.student_id, p.task_id)?))
        }
        ops::UPDATE_STUDENT => {
            let p: UpdateParams = params(raw)?;
            backend.update_student(p.student)?;
            Ok(Value::Null)
        }
        ops::CHECK_STUDENTS_WITH_MISSING_TASKS => {
            Ok(serde_json::to_value(backend.students_with_missing_tasks()?)?)
        }
        ops::GET_PATH => Ok(json!(backend.store().path().to_string_lossy())),
        other => Err(BackendError::UnknownMethod(other.to_string())),
    }
}

/// JSON-lines request loop: one request per input line, one response per output line.
/// Returns when the input closes.
pub fn serve<R: BufRead, W: Write>(backend: &Backend, input: R, mut output: W) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(req) => handle_request(backend, req),
            Err(err) => {
                warn!("unreadable request line: {err}");
                Response::failure(None, "bad_json", err.to_string())
            }
        };

        let text = serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"ok":false}"#.to_string());
        writeln!(output, "{text}")?;
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    fn backend() -> (tempfile::TempDir, Backend) {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("students.csv");
        fs::write(
            &csv,
            "id,Student,Class,EPA Score,Task 1,Task 2,Task 3,Task 4\n1,Abe,1,4.2,80,,90,88\n",
        )
        .unwrap();
        let backend = Backend::open(dir.path().join("store")).unwrap();
        backend
            .set_key(ops::CSV_PATH_KEY, json!(csv.to_string_lossy()))
            .unwrap();
        (dir, backend)
    }

    fn call(backend: &Backend, method: &str, params: Value) -> Response {
        handle_request(
            backend,
            Request {
                id: "1".to_string(),
                method: method.to_string(),
                params,
            },
        )
    }

    #[test]
    fn students_come_back_with_null_slots() {
        let (_dir, backend) = backend();
        let response = call(&backend, ops::GET_STUDENTS, json!({}));
        assert!(response.ok);
        let students = response.result.unwrap();
        assert_eq!(students[0]["tasks"], json!([80.0, null, 90.0, 88.0]));
    }

    #[test]
    fn error_codes_reach_the_envelope() {
        let (_dir, backend) = backend();
        let missing = call(&backend, ops::SET_STUDENT_MARK, json!({"student_id": 5, "task_id": 1, "mark": 3}));
        assert_eq!(missing.error.unwrap().code, "not_found");

        let bad = call(&backend, ops::GET_STUDENT_BY_ID, json!({"student_id": "x"}));
        assert_eq!(bad.error.unwrap().code, "bad_params");

        let unknown = call(&backend, "delete_student", Value::Null);
        assert_eq!(unknown.error.unwrap().code, "not_implemented");
    }

    #[test]
    fn serve_answers_every_line() {
        let (_dir, backend) = backend();
        let input = Cursor::new(
            "{\"id\":\"a\",\"method\":\"get_student_by_id\",\"params\":{\"student_id\":1}}\n\nnot json\n",
        );
        let mut output = Vec::new();
        serve(&backend, input, &mut output).unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], "a");
        assert_eq!(lines[0]["result"]["name"], "Abe");
        assert_eq!(lines[1]["error"]["code"], "bad_json");
        assert!(lines[1].get("id").is_none());
    }
}
