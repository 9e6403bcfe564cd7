mod test_support;

use std::sync::Arc;

use serde_json::json;
use student_records::api::StudentApi;
use student_records::bridge::{Invoke, ProcessBridge};
use student_records::records::{Student, NEW_STUDENT_ID};
use student_records::AppError;
use test_support::{backend_bin, workspace};

fn connect(data_dir: &std::path::Path) -> StudentApi {
    let args = vec![
        "--data-dir".to_string(),
        data_dir.to_string_lossy().to_string(),
    ];
    let bridge = ProcessBridge::spawn(backend_bin(), &args, None).expect("spawn bridge");
    StudentApi::new(Arc::new(bridge))
}

#[tokio::test]
async fn typed_calls_over_the_child_process() {
    let (dir, csv) = workspace();
    let api = connect(dir.path());
    let prefs = api.preferences();

    assert_eq!(prefs.csv_path().await.unwrap(), None);
    prefs.set_csv_path(&csv.to_string_lossy()).await.unwrap();
    assert_eq!(
        prefs.csv_path().await.unwrap().as_deref(),
        Some(&*csv.to_string_lossy())
    );

    let students = api.list_students(&csv.to_string_lossy()).await.unwrap();
    assert_eq!(students.len(), 3);
    assert!(students[0].has_empty_tasks());

    let mark = api.generate_mark(1, 4).await.unwrap();
    assert!(mark.fract() == 0.0);
    api.set_mark(1, 4, mark).await.unwrap();
    let ana = api.get_student(1).await.unwrap().unwrap();
    assert_eq!(ana.task(4), Some(mark));

    assert_eq!(api.get_student(99).await.unwrap(), None);

    let new = Student::new(NEW_STUDENT_ID, "Eli", 1, 2.5, [None; 4]);
    api.update_student(&new).await.unwrap();
    let missing = api.students_with_missing_tasks().await.unwrap();
    assert!(missing.iter().any(|s| s.name == "Eli" && s.id == 4));
}

#[tokio::test]
async fn backend_errors_carry_their_code() {
    let (dir, _csv) = workspace();
    let api = connect(dir.path());

    let err = api.list_students("").await.unwrap_err();
    assert_eq!(err.bridge_code(), Some("no_data_file"));

    let err = api.set_mark(1, 9, 50.0).await.unwrap_err();
    assert_eq!(err.bridge_code(), Some("no_data_file"));
}

#[tokio::test]
async fn concurrent_calls_get_their_own_answers() {
    let (dir, csv) = workspace();
    let api = connect(dir.path());
    api.preferences()
        .set_csv_path(&csv.to_string_lossy())
        .await
        .unwrap();

    let (cy, ana, ben) = tokio::join!(api.get_student(3), api.get_student(1), api.get_student(2));
    assert_eq!(cy.unwrap().unwrap().name, "Cy");
    assert_eq!(ana.unwrap().unwrap().name, "Ana");
    assert_eq!(ben.unwrap().unwrap().name, "Ben");
}

#[cfg(unix)]
#[tokio::test]
async fn answers_out_of_order_reach_the_right_caller() {
    // Reads both requests, then answers the second one first.
    let script = r#"read a; read b; echo '{"id":"2","ok":true,"result":"second"}'; echo '{"id":"1","ok":true,"result":"first"}'"#;
    let args = vec!["-c".to_string(), script.to_string()];
    let bridge = ProcessBridge::spawn("sh", &args, None).expect("spawn sh");

    let (first, second) = tokio::join!(
        bridge.invoke("echo", json!({})),
        bridge.invoke("echo", json!({}))
    );
    assert_eq!(first.unwrap(), json!("first"));
    assert_eq!(second.unwrap(), json!("second"));
}

#[cfg(unix)]
#[tokio::test]
async fn exited_backend_fails_pending_and_later_calls() {
    let bridge = ProcessBridge::spawn("true", &[], None).expect("spawn true");

    let pending = bridge.invoke("get_data_key", json!({ "key": "fileLocation" })).await;
    assert!(matches!(pending, Err(AppError::Transport(_))), "{pending:?}");

    let later = bridge.invoke("get_students", json!({})).await;
    assert!(matches!(later, Err(AppError::Transport(_))), "{later:?}");
}
