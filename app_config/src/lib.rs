pub mod clap;
pub mod config;
pub mod log_level_wrapper;
pub mod secret_string;

pub use crate::clap::CLAP_ARGS;
pub use crate::config::{AppConfig, ReactionTarget};
