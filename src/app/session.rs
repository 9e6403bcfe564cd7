use std::future::Future;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::api::{Preferences, StudentApi};
use crate::error::Result;
use crate::records::Student;
use crate::table::DEFAULT_PAGE_SIZE;
use crate::views::list::{missing_tasks_description, MISSING_TASKS_TITLE};
use crate::views::{
    AddStudentView, DetailView, ListView, Navigator, NoticeAction, NoticeKind, Notices, Route,
    SetupState, TestPage,
};

/// Whether the main views are unlocked.
#[derive(Debug, Clone)]
pub enum Gate {
    /// Waiting for the stored CSV path.
    Checking,
    Setup(SetupState),
    Ready { csv_path: String },
}

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub page_size: usize,
    pub notice_lifetime: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            notice_lifetime: Duration::from_secs(6),
        }
    }
}

/// Result of one backend call, delivered back to the UI loop.
enum Completion {
    PathLoaded(Result<Option<String>>),
    PathSaved(Result<String>),
    PathCleared(Result<()>),
    Students(Result<Vec<Student>>),
    Student {
        id: i64,
        result: Result<Option<Student>>,
    },
    Generated {
        id: i64,
        task_id: usize,
        result: Result<f64>,
    },
    MarkSaved {
        id: i64,
        task_id: usize,
        mark: f64,
        result: Result<()>,
    },
    StudentAdded(Result<()>),
    StorePath(Result<String>),
    IncompleteStudents(Result<Vec<Student>>),
}

/// Owns navigation, the views and every in-flight backend call.
///
/// Calls run as tokio tasks and report through a channel that the UI loop drains with
/// [`Session::tick`]; nothing is de-duplicated, so the last completion to arrive wins.
pub struct Session {
    api: StudentApi,
    prefs: Preferences,
    settings: SessionSettings,
    gate: Gate,
    navigator: Navigator,
    list: ListView,
    detail: Option<DetailView>,
    add_form: Option<AddStudentView>,
    test_page: Option<TestPage>,
    notices: Notices,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    pending: usize,
}

impl Session {
    pub fn new(api: StudentApi, settings: SessionSettings) -> Self {
        let (tx, rx) = unbounded_channel();
        let prefs = api.preferences();
        Self {
            api,
            prefs,
            settings,
            gate: Gate::Checking,
            navigator: Navigator::new(Route::List),
            list: ListView::new(settings.page_size),
            detail: None,
            add_form: None,
            test_page: None,
            notices: Notices::new(settings.notice_lifetime),
            tx,
            rx,
            pending: 0,
        }
    }

    /// Look up the stored CSV path. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        self.gate = Gate::Checking;
        let prefs = self.prefs.clone();
        self.spawn(async move { Completion::PathLoaded(prefs.csv_path().await) });
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    /// Apply finished calls and expire old notices. Never blocks.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
        }
        self.notices.expire(now);
    }

    /// Wait until every call issued so far (and any it triggers) has completed.
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            match self.rx.recv().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn csv_path(&self) -> Option<&str> {
        match &self.gate {
            Gate::Ready { csv_path } => Some(csv_path),
            _ => None,
        }
    }

    pub fn setup(&self) -> Option<&SetupState> {
        match &self.gate {
            Gate::Setup(setup) => Some(setup),
            _ => None,
        }
    }

    pub fn setup_mut(&mut self) -> Option<&mut SetupState> {
        match &mut self.gate {
            Gate::Setup(setup) => Some(setup),
            _ => None,
        }
    }

    pub fn route(&self) -> &Route {
        self.navigator.current()
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListView {
        &mut self.list
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn detail_mut(&mut self) -> Option<&mut DetailView> {
        self.detail.as_mut()
    }

    pub fn add_form(&self) -> Option<&AddStudentView> {
        self.add_form.as_ref()
    }

    pub fn add_form_mut(&mut self) -> Option<&mut AddStudentView> {
        self.add_form.as_mut()
    }

    pub fn test_page(&self) -> Option<&TestPage> {
        self.test_page.as_ref()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn submit_setup(&mut self) {
        let Some(path) = self.setup_mut().and_then(SetupState::submit) else {
            return;
        };
        let prefs = self.prefs.clone();
        self.spawn(async move {
            let result = prefs.set_csv_path(&path).await.map(|()| path);
            Completion::PathSaved(result)
        });
    }

    /// Forget the stored path and restart at the gate.
    pub fn reset_setup(&mut self) {
        let prefs = self.prefs.clone();
        self.spawn(async move { Completion::PathCleared(prefs.clear_csv_path().await) });
    }

    pub fn navigate(&mut self, route: Route) {
        debug!("navigate {route}");
        self.navigator.push(route);
        self.enter_route();
    }

    /// Returns `false` when there is no earlier entry.
    pub fn back(&mut self) -> bool {
        if !self.navigator.back() {
            return false;
        }
        self.enter_route();
        true
    }

    fn enter_route(&mut self) {
        self.add_form = None;
        self.test_page = None;
        match self.navigator.current().clone() {
            Route::List => {
                self.detail = None;
                self.reload_list();
            }
            Route::Student(param) => match DetailView::mount(&param) {
                Some(view) => {
                    let id = view.student_id();
                    self.detail = Some(view);
                    self.fetch_student(id);
                }
                None => {
                    warn!("Invalid student id {param:?}; redirecting");
                    self.detail = None;
                    self.navigator.replace(Route::Error);
                }
            },
            Route::Test => {
                self.detail = None;
                self.load_test_page();
            }
            Route::Error => self.detail = None,
        }
    }

    /// Ask the backend where it keeps preferences and who still has open tasks.
    fn load_test_page(&mut self) {
        self.test_page = Some(TestPage::new());
        let api = self.api.clone();
        self.spawn(async move { Completion::StorePath(api.store_path().await) });
        let api = self.api.clone();
        self.spawn(async move {
            Completion::IncompleteStudents(api.students_with_missing_tasks().await)
        });
    }

    pub fn reload_list(&mut self) {
        let Some(csv_path) = self.csv_path().map(str::to_string) else {
            return;
        };
        self.list.begin_load();
        let api = self.api.clone();
        self.spawn(async move { Completion::Students(api.list_students(&csv_path).await) });
    }

    fn fetch_student(&mut self, id: i64) {
        let api = self.api.clone();
        self.spawn(async move {
            Completion::Student {
                id,
                result: api.get_student(id).await,
            }
        });
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.list.selected_student_id() {
            self.navigate(Route::student(id));
        }
    }

    /// Run the newest notice's action, if it has one.
    pub fn invoke_notice_action(&mut self) {
        match self.notices.take_action() {
            Some(NoticeAction::ShowEmptyTasks) => self.list.show_empty_tasks(),
            None => {}
        }
    }

    pub fn open_add_student(&mut self) {
        self.add_form = Some(AddStudentView::new());
    }

    pub fn close_add_student(&mut self) {
        self.add_form = None;
    }

    pub fn submit_add_student(&mut self) {
        let Some(student) = self.add_form.as_mut().and_then(AddStudentView::submit) else {
            return;
        };
        let api = self.api.clone();
        self.spawn(async move { Completion::StudentAdded(api.update_student(&student).await) });
    }

    pub fn generate(&mut self, task_id: usize) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        if !detail.open_generate(task_id) {
            return;
        }
        let id = detail.student_id();
        let api = self.api.clone();
        self.spawn(async move {
            Completion::Generated {
                id,
                task_id,
                result: api.generate_mark(id, task_id).await,
            }
        });
    }

    pub fn confirm_mark(&mut self) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        let id = detail.student_id();
        if let Some((task_id, mark)) = detail.confirm() {
            self.save_mark(id, task_id, mark);
        }
    }

    pub fn cancel_dialog(&mut self) {
        if let Some(detail) = self.detail.as_mut() {
            detail.cancel_dialog();
        }
    }

    pub fn submit_mark_edit(&mut self) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        let id = detail.student_id();
        if let Some((task_id, mark)) = detail.submit_edit() {
            self.save_mark(id, task_id, mark);
        }
    }

    fn save_mark(&mut self, id: i64, task_id: usize, mark: f64) {
        let api = self.api.clone();
        self.spawn(async move {
            Completion::MarkSaved {
                id,
                task_id,
                mark,
                result: api.set_mark(id, task_id, mark).await,
            }
        });
    }

    fn detail_for(&mut self, id: i64) -> Option<&mut DetailView> {
        self.detail
            .as_mut()
            .filter(|detail| detail.student_id() == id)
    }

    fn apply(&mut self, completion: Completion) {
        self.pending = self.pending.saturating_sub(1);
        match completion {
            Completion::PathLoaded(Ok(Some(path))) => self.unlock(path),
            Completion::PathLoaded(Ok(None)) => self.gate = Gate::Setup(SetupState::new()),
            Completion::PathLoaded(Err(err)) => {
                warn!("Failed to read stored CSV path: {err}");
                self.notices.error("Failed to read settings", err.to_string());
                self.gate = Gate::Setup(SetupState::new());
            }
            Completion::PathSaved(Ok(path)) => {
                info!("CSV location set to {path}");
                self.unlock(path);
            }
            Completion::PathSaved(Err(err)) => {
                warn!("Failed to save CSV path: {err}");
                self.notices.error("Failed to save settings", err.to_string());
            }
            Completion::PathCleared(Ok(())) => {
                info!("Setup reset");
                self.detail = None;
                self.add_form = None;
                self.test_page = None;
                self.list = ListView::new(self.settings.page_size);
                self.navigator = Navigator::new(Route::List);
                self.gate = Gate::Setup(SetupState::new());
            }
            Completion::PathCleared(Err(err)) => {
                self.notices.error("Failed to reset setup", err.to_string());
            }
            Completion::Students(Ok(students)) => {
                debug!("Loaded {} students", students.len());
                let missing = self.list.finish_load(students);
                if missing > 0 {
                    self.notices.push(
                        NoticeKind::Info,
                        MISSING_TASKS_TITLE,
                        Some(missing_tasks_description(missing)),
                        Some(NoticeAction::ShowEmptyTasks),
                    );
                }
            }
            Completion::Students(Err(err)) => {
                warn!("Failed to load students: {err}");
                self.list.load_failed();
                self.notices.error("Failed to load students", err.to_string());
            }
            Completion::Student { id, result } => match result {
                Ok(student) => {
                    if let Some(detail) = self.detail_for(id) {
                        detail.finish_load(student);
                    }
                }
                Err(err) => {
                    warn!("Failed to load student {id}: {err}");
                    self.notices.error("Failed to load student", err.to_string());
                }
            },
            Completion::Generated {
                id,
                task_id,
                result,
            } => match result {
                Ok(mark) => {
                    if let Some(detail) = self.detail_for(id) {
                        detail.mark_generated(task_id, mark);
                    }
                }
                Err(err) => {
                    warn!("Mark generation failed for student {id}, task {task_id}: {err}");
                    if let Some(detail) = self.detail_for(id) {
                        detail.generation_failed(task_id);
                    }
                    self.notices.error("Failed to generate mark", err.to_string());
                }
            },
            Completion::MarkSaved {
                id,
                task_id,
                mark,
                result,
            } => match result {
                Ok(()) => {
                    if let Some(detail) = self.detail_for(id) {
                        detail.mark_saved(task_id, mark);
                    }
                    self.fetch_student(id);
                }
                Err(err) => {
                    warn!("Failed to save mark for student {id}, task {task_id}: {err}");
                    if let Some(detail) = self.detail_for(id) {
                        detail.save_failed(task_id);
                    }
                    self.notices.error("Failed to save mark", err.to_string());
                }
            },
            Completion::StudentAdded(Ok(())) => {
                self.add_form = None;
                self.notices.info("Student added");
                self.reload_list();
            }
            Completion::StudentAdded(Err(err)) => {
                warn!("Failed to add student: {err}");
                if let Some(form) = self.add_form.as_mut() {
                    form.submit_failed();
                }
                self.notices.error("Failed to add student", err.to_string());
            }
            Completion::StorePath(result) => match result {
                Ok(path) => {
                    if let Some(page) = self.test_page.as_mut() {
                        page.set_store_path(path);
                    }
                }
                Err(err) => {
                    warn!("Failed to read store path: {err}");
                    self.notices.error("Failed to read store path", err.to_string());
                }
            },
            Completion::IncompleteStudents(result) => match result {
                Ok(students) => {
                    if let Some(page) = self.test_page.as_mut() {
                        page.set_incomplete(students);
                    }
                }
                Err(err) => {
                    warn!("Failed to check missing tasks: {err}");
                    self.notices.error("Failed to check missing tasks", err.to_string());
                }
            },
        }
    }

    fn unlock(&mut self, csv_path: String) {
        self.gate = Gate::Ready { csv_path };
        self.navigator = Navigator::new(Route::List);
        self.enter_route();
    }
}
