use crate::records::{NewStudentForm, Student, StudentFormErrors, TASK_COUNT};

const FIELD_COUNT: usize = 3 + TASK_COUNT;

/// Add-student form with one focused field at a time.
#[derive(Debug, Clone, Default)]
pub struct AddStudentView {
    form: NewStudentForm,
    errors: StudentFormErrors,
    focus: usize,
    submitting: bool,
}

impl AddStudentView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_count(&self) -> usize {
        FIELD_COUNT
    }

    pub fn label(&self, field: usize) -> String {
        match field {
            0 => "Name".to_string(),
            1 => "Class".to_string(),
            2 => "Score".to_string(),
            n => format!("Task {}", n - 2),
        }
    }

    pub fn value(&self, field: usize) -> &str {
        match field {
            0 => &self.form.name,
            1 => &self.form.class_id,
            2 => &self.form.epa,
            n => self.form.tasks.get(n - 3).map_or("", String::as_str),
        }
    }

    pub fn error(&self, field: usize) -> Option<&str> {
        match field {
            0 => self.errors.name.as_deref(),
            1 => self.errors.class_id.as_deref(),
            2 => self.errors.epa.as_deref(),
            n => self.errors.tasks.get(n - 3).and_then(|e| e.as_deref()),
        }
    }

    fn value_mut(&mut self, field: usize) -> Option<&mut String> {
        match field {
            0 => Some(&mut self.form.name),
            1 => Some(&mut self.form.class_id),
            2 => Some(&mut self.form.epa),
            n => self.form.tasks.get_mut(n - 3),
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FIELD_COUNT;
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    pub fn push_char(&mut self, ch: char) {
        let focus = self.focus;
        if let Some(value) = self.value_mut(focus) {
            value.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        let focus = self.focus;
        if let Some(value) = self.value_mut(focus) {
            value.pop();
        }
    }

    pub fn set_value(&mut self, field: usize, text: impl Into<String>) {
        if let Some(value) = self.value_mut(field) {
            *value = text.into();
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The record to save, or `None` with field messages filled in.
    pub fn submit(&mut self) -> Option<Student> {
        if self.submitting {
            return None;
        }
        match self.form.validate() {
            Ok(student) => {
                self.errors = StudentFormErrors::default();
                self.submitting = true;
                Some(student)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }
}
