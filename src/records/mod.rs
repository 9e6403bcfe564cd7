use serde::{Deserialize, Deserializer, Serialize};

pub mod form;

pub use form::{parse_mark, NewStudentForm, StudentFormErrors};

/// Number of gradable task columns in the dataset.
pub const TASK_COUNT: usize = 4;

/// Identifier sent with a record that the backend should create rather than update.
pub const NEW_STUDENT_ID: i64 = -1;

/// One mark per task slot; `None` means the task has not been graded yet.
pub type TaskMarks = [Option<f64>; TASK_COUNT];

/// A student row as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub class_id: i64,
    pub epa: f64,
    #[serde(default, deserialize_with = "deserialize_tasks")]
    pub tasks: TaskMarks,
}

impl Student {
    pub fn new(id: i64, name: impl Into<String>, class_id: i64, epa: f64, tasks: TaskMarks) -> Self {
        Self {
            id,
            name: name.into(),
            class_id,
            epa,
            tasks,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id < 0
    }

    pub fn has_empty_tasks(&self) -> bool {
        self.tasks.iter().any(Option::is_none)
    }

    /// 1-based task ids that still need a mark.
    pub fn empty_task_ids(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, mark)| mark.is_none())
            .map(|(idx, _)| idx + 1)
            .collect()
    }

    pub fn task(&self, task_id: usize) -> Option<f64> {
        task_index(task_id).and_then(|idx| self.tasks[idx])
    }

    /// Overwrite the mark for `task_id`. Returns `false` when the id is out of range.
    pub fn set_task(&mut self, task_id: usize, mark: Option<f64>) -> bool {
        match task_index(task_id) {
            Some(idx) => {
                self.tasks[idx] = mark;
                true
            }
            None => false,
        }
    }

    /// Mean of the graded tasks, `None` when nothing is graded.
    pub fn average(&self) -> Option<f64> {
        let graded: Vec<f64> = self.tasks.iter().flatten().copied().collect();
        if graded.is_empty() {
            None
        } else {
            Some(graded.iter().sum::<f64>() / graded.len() as f64)
        }
    }

    pub fn average_label(&self) -> String {
        format!("{:.2}", self.average().unwrap_or(0.0))
    }
}

/// Map a 1-based task id onto an index into [`TaskMarks`].
pub fn task_index(task_id: usize) -> Option<usize> {
    (1..=TASK_COUNT).contains(&task_id).then(|| task_id - 1)
}

/// Render a mark without a trailing `.0` for whole numbers.
pub fn format_mark(mark: f64) -> String {
    if mark.fract() == 0.0 && mark.abs() < 1e15 {
        format!("{}", mark as i64)
    } else {
        format!("{}", mark)
    }
}

fn parse_task_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nan")
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|mark| mark.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTask {
    Number(f64),
    Text(String),
    Null,
}

fn deserialize_tasks<'de, D>(deserializer: D) -> Result<TaskMarks, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<RawTask>> = Option::deserialize(deserializer)?;
    let mut tasks: TaskMarks = [None; TASK_COUNT];
    for (slot, value) in tasks.iter_mut().zip(raw.unwrap_or_default()) {
        *slot = match value {
            RawTask::Number(mark) => Some(mark),
            RawTask::Text(text) => parse_task_text(&text),
            RawTask::Null => None,
        };
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_representations_collapse_to_none() {
        let student: Student = serde_json::from_value(json!({
            "id": 3,
            "name": "Ada",
            "class_id": 1,
            "epa": 3.2,
            "tasks": [7, "", null]
        }))
        .unwrap();

        assert_eq!(student.tasks, [Some(7.0), None, None, None]);
        assert!(student.has_empty_tasks());
        assert_eq!(student.empty_task_ids(), vec![2, 3, 4]);
    }

    #[test]
    fn text_placeholders_and_numeric_text() {
        let student: Student = serde_json::from_value(json!({
            "id": 4,
            "name": "Bea",
            "class_id": 1,
            "epa": 2.5,
            "tasks": ["None", " nan ", "12", 5]
        }))
        .unwrap();
        assert_eq!(student.tasks, [None, None, Some(12.0), Some(5.0)]);
    }

    #[test]
    fn missing_tasks_field_means_nothing_graded() {
        let student: Student = serde_json::from_value(json!({
            "id": 1, "name": "Bo", "class_id": 2, "epa": 1.0
        }))
        .unwrap();
        assert_eq!(student.tasks, [None; TASK_COUNT]);
    }

    #[test]
    fn serializes_empty_slots_as_null() {
        let student = Student::new(NEW_STUDENT_ID, "Cy", 2, 4.5, [Some(10.0), None, None, None]);
        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value["tasks"], json!([10.0, null, null, null]));
        assert_eq!(value["id"], json!(-1));
    }

    #[test]
    fn average_ignores_ungraded_tasks() {
        let student = Student::new(1, "Di", 1, 2.0, [Some(5.0), None, Some(3.0), Some(4.0)]);
        assert_eq!(student.average_label(), "4.00");

        let blank = Student::new(2, "Ed", 1, 2.0, [None; TASK_COUNT]);
        assert_eq!(blank.average_label(), "0.00");
    }

    #[test]
    fn task_ids_are_one_based() {
        let mut student = Student::new(1, "Fi", 1, 2.0, [None; TASK_COUNT]);
        assert!(student.set_task(4, Some(9.0)));
        assert_eq!(student.tasks[3], Some(9.0));
        assert!(!student.set_task(0, Some(1.0)));
        assert!(!student.set_task(5, Some(1.0)));
    }

    #[test]
    fn formats_whole_marks_without_fraction() {
        assert_eq!(format_mark(7.0), "7");
        assert_eq!(format_mark(4.5), "4.5");
    }
}
