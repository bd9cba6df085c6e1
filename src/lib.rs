#![allow(async_fn_in_trait)]

pub mod admin_commands;
pub mod channel;
pub mod discord;
pub mod errors;
pub mod helper_methods;
pub mod live_status;
pub mod logging;
pub mod processes;
pub mod reactions;

#[cfg(test)]
pub mod testing_helper_methods;
