use std::path::{Path, PathBuf};

use crate::utils::{list_csv_files, FileEntry};

pub const INVALID_PATH_ALERT: &str =
    "The specified file path does not exist. Please select a valid CSV file.";

/// A path passes setup when it exists and names a `.csv` file.
pub fn validate_csv_path(path: &str) -> bool {
    !path.is_empty() && path.ends_with(".csv") && Path::new(path).exists()
}

/// `.csv` files of one directory, newest first.
#[derive(Debug, Clone)]
pub struct FilePicker {
    dir: PathBuf,
    entries: Vec<FileEntry>,
    selected: usize,
}

impl FilePicker {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let entries = list_csv_files(&dir);
        Self {
            dir,
            entries,
            selected: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn select_prev(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        if self.selected == 0 {
            self.selected = self.entries.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.entries.get(self.selected).map(|entry| entry.path.as_path())
    }
}

/// The gate shown while no CSV location is stored.
#[derive(Debug, Clone, Default)]
pub struct SetupState {
    input: String,
    alert: Option<String>,
    picker: Option<FilePicker>,
}

impl SetupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Blocking message; input is ignored until it is dismissed.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Browse the directory of the typed path, or `fallback` when it has none.
    pub fn open_picker(&mut self, fallback: &Path) {
        let typed = Path::new(self.input.trim());
        let dir = if typed.is_dir() {
            typed.to_path_buf()
        } else {
            typed
                .parent()
                .filter(|parent| parent.is_dir())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| fallback.to_path_buf())
        };
        self.picker = Some(FilePicker::open(dir));
    }

    pub fn picker(&self) -> Option<&FilePicker> {
        self.picker.as_ref()
    }

    pub fn picker_mut(&mut self) -> Option<&mut FilePicker> {
        self.picker.as_mut()
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Copy the highlighted file into the input and close the picker.
    pub fn choose_picked(&mut self) {
        if let Some(path) = self.picker.as_ref().and_then(FilePicker::selected_path) {
            self.input = path.to_string_lossy().to_string();
        }
        self.picker = None;
    }

    /// The path to persist, or `None` with the alert raised. Blank input is ignored.
    pub fn submit(&mut self) -> Option<String> {
        if self.alert.is_some() {
            return None;
        }
        let path = self.input.trim();
        if path.is_empty() {
            return None;
        }
        if validate_csv_path(path) {
            Some(path.to_string())
        } else {
            self.alert = Some(INVALID_PATH_ALERT.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn only_existing_csv_files_pass() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("students.csv");
        let txt = dir.path().join("students.txt");
        fs::write(&csv, "id\n").unwrap();
        fs::write(&txt, "id\n").unwrap();

        assert!(validate_csv_path(&csv.to_string_lossy()));
        assert!(!validate_csv_path(&txt.to_string_lossy()));
        assert!(!validate_csv_path(&dir.path().join("gone.csv").to_string_lossy()));
        assert!(!validate_csv_path(""));
    }

    #[test]
    fn failed_submit_blocks_until_dismissed() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("a.csv");
        fs::write(&csv, "id\n").unwrap();

        let mut setup = SetupState::new();
        assert_eq!(setup.submit(), None);
        assert_eq!(setup.alert(), None);

        setup.set_input("/definitely/missing.csv");
        assert_eq!(setup.submit(), None);
        assert_eq!(setup.alert(), Some(INVALID_PATH_ALERT));

        setup.set_input(csv.to_string_lossy());
        assert_eq!(setup.submit(), None);
        setup.dismiss_alert();
        assert_eq!(setup.submit().as_deref(), Some(&*csv.to_string_lossy()));
    }

    #[test]
    fn picker_fills_the_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("only.csv"), "id\n").unwrap();
        fs::write(dir.path().join("notes.md"), "x").unwrap();

        let mut setup = SetupState::new();
        setup.open_picker(dir.path());
        assert_eq!(setup.picker().unwrap().entries().len(), 1);
        setup.choose_picked();
        assert!(setup.input().ends_with("only.csv"));
        assert!(setup.picker().is_none());
    }
}
