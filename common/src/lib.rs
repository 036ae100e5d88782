// Shared library for the slot availability watcher

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod notify;
pub mod retry;
pub mod scanner;
pub mod telemetry;
pub mod window;
