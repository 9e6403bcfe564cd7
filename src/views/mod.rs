//! UI-independent view state. Each view is a small state machine driven by
//! user actions and backend completions; rendering lives in `ui`.

pub mod add_student;
pub mod detail;
pub mod list;
pub mod notice;
pub mod route;
pub mod setup;
pub mod test_page;

pub use add_student::AddStudentView;
pub use detail::{DetailState, DetailView, MarkDialog, MarkEditor};
pub use list::{FilterField, ListView, LoadState};
pub use notice::{Notice, NoticeAction, NoticeKind, Notices};
pub use route::{Navigator, Route};
pub use setup::{validate_csv_path, FilePicker, SetupState};
pub use test_page::TestPage;
