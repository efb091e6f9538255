//! homework-bot library crate.
//!
//! Polls the homework status API on a fixed interval and forwards status
//! changes to a Telegram chat.

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod interpreter;
pub mod logging;
pub mod notifier;
pub mod panic_hook;
pub mod poller;
pub mod shutdown;
pub mod startup;
pub mod utils;
pub mod validator;

pub use error::{Error, ErrorClass, Result};
