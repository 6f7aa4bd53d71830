//! StudyBell bot library.
//!
//! This crate wires the presence-session core to its I/O: configuration,
//! HTTP ingress, event dispatch, and the Discord notification sink.

mod cli;
mod config;
pub mod dispatch;
pub mod ingress;
pub mod notify;

pub use cli::Cli;
pub use config::{Config, MissingConfig};
