use crate::records::{format_mark, parse_mark, task_index, Student, TASK_COUNT};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(Student),
    NotFound,
}

/// Blocking dialog around a generated mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkDialog {
    Generating { task_id: usize },
    Proposed { task_id: usize, mark: f64 },
    /// Confirmed; stays open until the backend stores the mark.
    Saving { task_id: usize, mark: f64 },
}

impl MarkDialog {
    pub fn task_id(&self) -> usize {
        match *self {
            MarkDialog::Generating { task_id }
            | MarkDialog::Proposed { task_id, .. }
            | MarkDialog::Saving { task_id, .. } => task_id,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MarkDialog::Generating { .. } => "Generating Marks...",
            MarkDialog::Proposed { .. } => "Marks Generated",
            MarkDialog::Saving { .. } => "Saving Mark...",
        }
    }
}

/// Inline editor for typing a mark by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkEditor {
    pub task_id: usize,
    pub input: String,
    pub error: Option<String>,
}

pub struct DetailView {
    student_id: i64,
    state: DetailState,
    dialog: Option<MarkDialog>,
    editor: Option<MarkEditor>,
    selected_task: usize,
}

impl DetailView {
    /// `None` when the route parameter is not a student id; the caller redirects.
    pub fn mount(param: &str) -> Option<Self> {
        let student_id = param.trim().parse::<i64>().ok()?;
        Some(Self {
            student_id,
            state: DetailState::Loading,
            dialog: None,
            editor: None,
            selected_task: 1,
        })
    }

    pub fn student_id(&self) -> i64 {
        self.student_id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn student(&self) -> Option<&Student> {
        match &self.state {
            DetailState::Loaded(student) => Some(student),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match &self.state {
            DetailState::Loading => "Loading student data...".to_string(),
            DetailState::Loaded(student) => student.name.clone(),
            DetailState::NotFound => format!("No student found with ID {}.", self.student_id),
        }
    }

    pub fn finish_load(&mut self, student: Option<Student>) {
        self.state = match student {
            Some(student) => DetailState::Loaded(student),
            None => DetailState::NotFound,
        };
    }

    /// Header pairs shown above the task table.
    pub fn summary(&self) -> Option<[(&'static str, String); 4]> {
        let student = self.student()?;
        Some([
            ("ID", self.student_id.to_string()),
            ("EPA", student.epa.to_string()),
            ("Average", student.average_label()),
            ("Class ID", student.class_id.to_string()),
        ])
    }

    /// Display text per task slot: the mark, or `None` where generation is offered.
    pub fn task_cells(&self) -> Vec<(usize, Option<String>)> {
        let Some(student) = self.student() else {
            return Vec::new();
        };
        (1..=TASK_COUNT)
            .map(|task_id| (task_id, student.task(task_id).map(format_mark)))
            .collect()
    }

    pub fn selected_task(&self) -> usize {
        self.selected_task
    }

    pub fn select_next(&mut self) {
        self.selected_task = self.selected_task % TASK_COUNT + 1;
    }

    pub fn select_prev(&mut self) {
        self.selected_task = if self.selected_task <= 1 {
            TASK_COUNT
        } else {
            self.selected_task - 1
        };
    }

    pub fn dialog(&self) -> Option<&MarkDialog> {
        self.dialog.as_ref()
    }

    /// Generation is offered for ungraded slots while no dialog is open.
    pub fn can_generate(&self, task_id: usize) -> bool {
        self.dialog.is_none()
            && task_index(task_id).is_some()
            && self
                .student()
                .is_some_and(|student| student.task(task_id).is_none())
    }

    pub fn open_generate(&mut self, task_id: usize) -> bool {
        if !self.can_generate(task_id) {
            return false;
        }
        self.editor = None;
        self.dialog = Some(MarkDialog::Generating { task_id });
        true
    }

    /// A proposal arriving after cancel is dropped.
    pub fn mark_generated(&mut self, task_id: usize, mark: f64) {
        if self.dialog == Some(MarkDialog::Generating { task_id }) {
            self.dialog = Some(MarkDialog::Proposed { task_id, mark });
        }
    }

    pub fn can_confirm(&self) -> bool {
        matches!(self.dialog, Some(MarkDialog::Proposed { .. }))
    }

    /// Move the proposal into `Saving` and hand back the mark to persist.
    pub fn confirm(&mut self) -> Option<(usize, f64)> {
        match self.dialog {
            Some(MarkDialog::Proposed { task_id, mark }) => {
                self.dialog = Some(MarkDialog::Saving { task_id, mark });
                Some((task_id, mark))
            }
            _ => None,
        }
    }

    /// Ignored while a confirmed mark is being saved.
    pub fn cancel_dialog(&mut self) {
        if !matches!(self.dialog, Some(MarkDialog::Saving { .. })) {
            self.dialog = None;
        }
    }

    /// Generation for `task_id` failed; a dialog opened for another task stays.
    pub fn generation_failed(&mut self, task_id: usize) {
        if self.dialog == Some(MarkDialog::Generating { task_id }) {
            self.dialog = None;
        }
    }

    /// The backend stored `mark`; show it until the refetch lands.
    pub fn mark_saved(&mut self, task_id: usize, mark: f64) {
        if let DetailState::Loaded(student) = &mut self.state {
            student.set_task(task_id, Some(mark));
        }
        self.close_saving(task_id);
    }

    pub fn save_failed(&mut self, task_id: usize) {
        self.close_saving(task_id);
    }

    fn close_saving(&mut self, task_id: usize) {
        if matches!(self.dialog, Some(MarkDialog::Saving { task_id: open, .. }) if open == task_id) {
            self.dialog = None;
        }
    }

    pub fn editor(&self) -> Option<&MarkEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut MarkEditor> {
        self.editor.as_mut()
    }

    pub fn start_edit(&mut self, task_id: usize) -> bool {
        if self.dialog.is_some() || task_index(task_id).is_none() {
            return false;
        }
        let Some(student) = self.student() else {
            return false;
        };
        let input = student.task(task_id).map(format_mark).unwrap_or_default();
        self.editor = Some(MarkEditor {
            task_id,
            input,
            error: None,
        });
        true
    }

    /// Parse the typed mark. On error the editor stays open with a message.
    pub fn submit_edit(&mut self) -> Option<(usize, f64)> {
        let editor = self.editor.as_mut()?;
        match parse_mark(&editor.input) {
            Ok(Some(mark)) => {
                let task_id = editor.task_id;
                self.editor = None;
                Some((task_id, mark))
            }
            Ok(None) => {
                editor.error = Some("Mark is required".to_string());
                None
            }
            Err(message) => {
                editor.error = Some(message);
                None
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor = None;
    }
}
