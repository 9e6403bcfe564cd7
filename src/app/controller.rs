use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;

use crate::app::session::{Gate, Session};
use crate::error::Result;
use crate::ui::{self, TerminalGuard, UiState, POLL_INTERVAL};
use crate::views::{FilterField, Route};

/// Drives the session from keyboard input and redraws on every poll.
pub struct AppController {
    session: Session,
    ui: UiState,
    fallback_dir: std::path::PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerOutcome {
    Continue,
    Exit,
}

impl AppController {
    pub fn new(session: Session, fallback_dir: std::path::PathBuf) -> Self {
        Self {
            session,
            ui: UiState::default(),
            fallback_dir,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(mut self) -> Result<()> {
        let mut guard = TerminalGuard::new()?;
        self.session.start();

        loop {
            self.session.tick(Instant::now());
            let (session, ui_state) = (&self.session, &self.ui);
            guard.draw(|f| ui::draw(f, session, ui_state))?;

            if let Some(key) = guard.next_key(POLL_INTERVAL)? {
                if self.handle_key(key) == ControllerOutcome::Exit {
                    break;
                }
            }
            // Let spawned calls make progress between polls.
            tokio::task::yield_now().await;
        }

        guard.restore()?;
        info!("Exiting");
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ControllerOutcome {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return ControllerOutcome::Exit;
        }

        match self.session.gate() {
            Gate::Checking => ControllerOutcome::Continue,
            Gate::Setup(_) => {
                self.handle_setup_key(key);
                ControllerOutcome::Continue
            }
            Gate::Ready { .. } => {
                if self.session.add_form().is_some() {
                    self.handle_form_key(key);
                    return ControllerOutcome::Continue;
                }
                if key.code == KeyCode::Char('R') && !self.is_modal() {
                    self.session.reset_setup();
                    return ControllerOutcome::Continue;
                }
                match self.session.route().clone() {
                    Route::List => return self.handle_list_key(key),
                    Route::Student(_) => self.handle_detail_key(key),
                    Route::Test => match key.code {
                        KeyCode::Enter => self.session.navigate(Route::List),
                        KeyCode::Esc | KeyCode::Char('b') => {
                            self.session.back();
                        }
                        _ => {}
                    },
                    Route::Error => {
                        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('b')) {
                            if !self.session.back() {
                                self.session.navigate(Route::List);
                            }
                        }
                    }
                }
                ControllerOutcome::Continue
            }
        }
    }

    /// Text entry or a dialog owns the keyboard.
    fn is_modal(&self) -> bool {
        self.ui.editing_query
            || self
                .session
                .detail()
                .is_some_and(|detail| detail.dialog().is_some() || detail.editor().is_some())
    }

    fn handle_setup_key(&mut self, key: KeyEvent) {
        let fallback = self.fallback_dir.clone();
        let Some(setup) = self.session.setup_mut() else {
            return;
        };

        if setup.alert().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                setup.dismiss_alert();
            }
            return;
        }

        if let Some(picker) = setup.picker_mut() {
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => picker.select_next(),
                KeyCode::Up | KeyCode::Char('k') => picker.select_prev(),
                KeyCode::Enter => setup.choose_picked(),
                KeyCode::Esc => setup.close_picker(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.session.submit_setup(),
            KeyCode::Tab => setup.open_picker(&fallback),
            KeyCode::Backspace => setup.backspace(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                setup.push_char(ch)
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> ControllerOutcome {
        if self.ui.editing_query {
            let list = self.session.list_mut();
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.ui.editing_query = false,
                KeyCode::Backspace => list.pop_query_char(),
                KeyCode::Char(ch) => list.push_query_char(ch),
                _ => {}
            }
            return ControllerOutcome::Continue;
        }

        match key.code {
            KeyCode::Char('q') => return ControllerOutcome::Exit,
            KeyCode::Down | KeyCode::Char('j') => self.session.list_mut().table_mut().select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.session.list_mut().table_mut().select_prev(),
            KeyCode::Right | KeyCode::PageDown => {
                self.session.list_mut().table_mut().next_page();
            }
            KeyCode::Left | KeyCode::PageUp => {
                self.session.list_mut().table_mut().prev_page();
            }
            KeyCode::Enter => self.session.open_selected(),
            KeyCode::Char('/') => {
                if self.session.list().filter_field() == FilterField::HasEmptyTasks {
                    self.session.list_mut().cycle_flag_query();
                } else {
                    self.ui.editing_query = true;
                }
            }
            KeyCode::Char(' ') => {
                if self.session.list().filter_field() == FilterField::HasEmptyTasks {
                    self.session.list_mut().cycle_flag_query();
                }
            }
            KeyCode::Char('f') => self.session.list_mut().cycle_filter_field(),
            KeyCode::Char('s') => self.cycle_sort_column(),
            KeyCode::Char('d') => {
                let table = self.session.list_mut().table_mut();
                if let Some(sort) = table.sort() {
                    table.toggle_sort(sort.column);
                }
            }
            KeyCode::Char('a') => self.session.open_add_student(),
            KeyCode::Char('r') => self.session.reload_list(),
            KeyCode::Char('n') => self.session.invoke_notice_action(),
            KeyCode::Char('x') => self.session.notices_mut().dismiss_latest(),
            KeyCode::Char('t') => self.session.navigate(Route::Test),
            _ => {}
        }
        ControllerOutcome::Continue
    }

    /// Move the sort to the next column, ascending; past the last column sorting is cleared.
    fn cycle_sort_column(&mut self) {
        let table = self.session.list_mut().table_mut();
        let ids: Vec<&'static str> = table.columns().iter().map(|column| column.id).collect();
        let next = match table.sort() {
            None => ids.first().copied(),
            Some(sort) => ids
                .iter()
                .position(|id| *id == sort.column)
                .and_then(|idx| ids.get(idx + 1).copied()),
        };
        match next {
            Some(column) => table.toggle_sort(column),
            None => table.clear_sort(),
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(detail) = self.session.detail_mut() else {
            return;
        };

        if let Some(editor) = detail.editor_mut() {
            match key.code {
                KeyCode::Enter => self.session.submit_mark_edit(),
                KeyCode::Esc => detail.cancel_edit(),
                KeyCode::Backspace => {
                    editor.input.pop();
                }
                KeyCode::Char(ch) => editor.input.push(ch),
                _ => {}
            }
            return;
        }

        if detail.dialog().is_some() {
            match key.code {
                KeyCode::Enter | KeyCode::Char('y') => self.session.confirm_mark(),
                KeyCode::Esc | KeyCode::Char('c') => self.session.cancel_dialog(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => detail.select_next(),
            KeyCode::Up | KeyCode::Char('k') => detail.select_prev(),
            KeyCode::Char('g') | KeyCode::Enter => {
                let task_id = detail.selected_task();
                self.session.generate(task_id);
            }
            KeyCode::Char('e') => {
                let task_id = detail.selected_task();
                detail.start_edit(task_id);
            }
            KeyCode::Char('n') => self.session.invoke_notice_action(),
            KeyCode::Char('x') => self.session.notices_mut().dismiss_latest(),
            KeyCode::Esc | KeyCode::Char('b') => {
                if !self.session.back() {
                    self.session.navigate(Route::List);
                }
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.session.add_form_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.session.close_add_student(),
            KeyCode::Enter => self.session.submit_add_student(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => {}
        }
    }

    #[cfg(test)]
    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StudentApi;
    use crate::app::session::SessionSettings;
    use crate::bridge::{ops, testing::RecordingBridge};
    use crate::error::AppError;
    use crate::records::Student;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn bridge(stored: Value) -> RecordingBridge {
        RecordingBridge::new(move |op, params| match op {
            ops::GET_DATA_KEY => Ok(stored.clone()),
            ops::SET_DATA_KEY => Ok(Value::Null),
            ops::GET_STUDENTS => Ok(json!([
                Student::new(2, "Bea", 1, 3.5, [Some(70.0), Some(60.0), None, Some(80.0)]),
                Student::new(1, "Al", 2, 4.0, [Some(90.0); 4]),
            ])),
            ops::GET_STUDENT_BY_ID => {
                let id = params["student_id"].as_i64().unwrap_or(0);
                Ok(json!(Student::new(id, "Al", 2, 4.0, [Some(90.0), None, None, None])))
            }
            ops::GENERATE_MARK_FOR_TASK => Ok(json!(64)),
            ops::SET_STUDENT_MARK => Ok(Value::Null),
            other => Err(AppError::message(format!("unexpected {other}"))),
        })
    }

    async fn controller(bridge: &RecordingBridge) -> AppController {
        let api = StudentApi::new(Arc::new(bridge.clone()));
        let mut session = Session::new(api, SessionSettings::default());
        session.start();
        session.settle().await;
        AppController::new(session, std::env::temp_dir())
    }

    #[tokio::test]
    async fn setup_gate_takes_typed_path() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("class.csv");
        std::fs::write(&csv, "id\n").unwrap();

        let bridge = bridge(Value::Null);
        let mut app = controller(&bridge).await;
        assert!(matches!(app.session().gate(), Gate::Setup(_)));

        for ch in csv.to_string_lossy().chars() {
            app.handle_key(press(KeyCode::Char(ch)));
        }
        app.handle_key(press(KeyCode::Enter));
        app.session_mut().settle().await;

        assert!(matches!(app.session().gate(), Gate::Ready { .. }));
        let saved = bridge.calls_to(ops::SET_DATA_KEY);
        assert_eq!(saved[0]["value"], json!(csv.to_string_lossy()));
    }

    #[tokio::test]
    async fn list_keys_sort_and_quit() {
        let bridge = bridge(json!("/tmp/class.csv"));
        let mut app = controller(&bridge).await;

        app.handle_key(press(KeyCode::Char('s')));
        let first: Vec<i64> = app
            .session()
            .list()
            .table()
            .page_rows()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(first, vec![1, 2]);

        app.handle_key(press(KeyCode::Char('d')));
        let flipped = app.session().list().table().sort().unwrap();
        assert_eq!(flipped.direction, crate::table::SortDirection::Descending);

        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), ControllerOutcome::Exit);
    }

    #[tokio::test]
    async fn query_editing_swallows_command_keys() {
        let bridge = bridge(json!("/tmp/class.csv"));
        let mut app = controller(&bridge).await;

        app.handle_key(press(KeyCode::Char('f')));
        app.handle_key(press(KeyCode::Char('/')));
        app.handle_key(press(KeyCode::Char('q')));
        assert_eq!(app.session().list().query(), "q");
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ControllerOutcome::Exit
        );
    }

    #[tokio::test]
    async fn detail_generate_and_confirm() {
        let bridge = bridge(json!("/tmp/class.csv"));
        let mut app = controller(&bridge).await;

        app.session_mut().navigate(Route::student(1));
        app.session_mut().settle().await;
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Char('g')));
        app.session_mut().settle().await;
        app.handle_key(press(KeyCode::Char('y')));
        app.session_mut().settle().await;

        let saved = bridge.calls_to(ops::SET_STUDENT_MARK);
        assert_eq!(saved, vec![json!({"student_id": 1, "task_id": 2, "mark": 64.0})]);

        app.handle_key(press(KeyCode::Esc));
        app.session_mut().settle().await;
        assert_eq!(app.session().route(), &Route::List);
    }

    #[tokio::test]
    async fn reset_works_from_the_detail_page() {
        let bridge = bridge(json!("/tmp/class.csv"));
        let mut app = controller(&bridge).await;
        app.session_mut().navigate(Route::student(1));
        app.session_mut().settle().await;

        app.handle_key(press(KeyCode::Char('e')));
        app.handle_key(press(KeyCode::Char('R')));
        app.session_mut().settle().await;
        assert!(bridge.calls_to(ops::SET_DATA_KEY).is_empty());
        assert_eq!(app.session().detail().unwrap().editor().unwrap().input, "90R");

        app.handle_key(press(KeyCode::Esc));
        app.handle_key(press(KeyCode::Char('R')));
        app.session_mut().settle().await;
        assert_eq!(bridge.calls_to(ops::SET_DATA_KEY), vec![json!({"key": "fileLocation", "value": ""})]);
        assert!(matches!(app.session().gate(), Gate::Setup(_)));
    }
}
