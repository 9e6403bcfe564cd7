use super::{Student, TaskMarks, NEW_STUDENT_ID, TASK_COUNT};

/// Raw text typed into the add-student form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewStudentForm {
    pub name: String,
    pub class_id: String,
    pub epa: String,
    pub tasks: [String; TASK_COUNT],
}

/// Field-level validation messages; `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFormErrors {
    pub name: Option<String>,
    pub class_id: Option<String>,
    pub epa: Option<String>,
    pub tasks: [Option<String>; TASK_COUNT],
}

impl StudentFormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.class_id.is_none()
            && self.epa.is_none()
            && self.tasks.iter().all(Option::is_none)
    }
}

impl NewStudentForm {
    /// Build the record to submit, tagged with [`NEW_STUDENT_ID`] so the backend assigns an id.
    pub fn validate(&self) -> Result<Student, StudentFormErrors> {
        let mut errors = StudentFormErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.name = Some("Name is required".to_string());
        }

        let class_id = match self.class_id.trim() {
            "" => {
                errors.class_id = Some("Class is required".to_string());
                None
            }
            raw => match raw.parse::<i64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    errors.class_id = Some("Class must be a whole number".to_string());
                    None
                }
            },
        };

        let epa = match self.epa.trim() {
            "" => {
                errors.epa = Some("Score is required".to_string());
                None
            }
            raw => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => {
                    errors.epa = Some("Score must be a number".to_string());
                    None
                }
            },
        };

        let mut tasks: TaskMarks = [None; TASK_COUNT];
        for (idx, raw) in self.tasks.iter().enumerate() {
            match parse_mark(raw) {
                Ok(mark) => tasks[idx] = mark,
                Err(message) => errors.tasks[idx] = Some(message),
            }
        }

        match (class_id, epa) {
            (Some(class_id), Some(epa)) if errors.is_empty() => {
                Ok(Student::new(NEW_STUDENT_ID, name, class_id, epa, tasks))
            }
            _ => Err(errors),
        }
    }
}

/// Parse an optional mark: blank input is "not graded", anything else must be numeric.
pub fn parse_mark(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(mark) if mark.is_finite() => Ok(Some(mark)),
        _ => Err("Mark must be a number".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> NewStudentForm {
        NewStudentForm {
            name: "Grace".to_string(),
            class_id: "2".to_string(),
            epa: "4.5".to_string(),
            tasks: ["10".to_string(), String::new(), String::new(), String::new()],
        }
    }

    #[test]
    fn builds_new_record_from_text() {
        let student = filled().validate().expect("valid form");
        assert_eq!(student.id, NEW_STUDENT_ID);
        assert_eq!(student.class_id, 2);
        assert_eq!(student.epa, 4.5);
        assert_eq!(student.tasks, [Some(10.0), None, None, None]);
        assert_eq!(student.name, "Grace");
    }

    #[test]
    fn required_fields_are_reported_individually() {
        let errors = NewStudentForm::default().validate().unwrap_err();
        assert!(errors.name.is_some());
        assert!(errors.class_id.is_some());
        assert!(errors.epa.is_some());
        assert!(errors.tasks.iter().all(Option::is_none));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let mut form = filled();
        form.class_id = "two".to_string();
        form.tasks[2] = "abc".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.class_id.as_deref(), Some("Class must be a whole number"));
        assert!(errors.tasks[2].is_some());
        assert!(errors.name.is_none());
    }
}
