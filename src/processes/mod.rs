pub mod event_handler;
pub mod periodic_task;
pub mod runner;

pub use event_handler::BotEventHandler;
pub use periodic_task::{PeriodicTask, TaskRegistry};
pub use runner::run_bot;
