pub mod add_student;
pub mod detail;
pub mod list;
pub mod notices;
pub mod pages;
pub mod setup;

pub use add_student::render_add_student;
pub use detail::render_detail;
pub use list::{render_list, ListUi};
pub use notices::render_notices;
pub use pages::{render_error_page, render_test_page};
pub use setup::{render_alert, render_setup};
