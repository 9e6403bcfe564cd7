pub mod bootstrap;
pub mod controller;
pub mod session;

pub use bootstrap::run;
pub use controller::{AppController, ControllerOutcome};
pub use session::{Gate, Session, SessionSettings};
