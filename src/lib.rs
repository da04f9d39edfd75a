pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exit;
pub mod logging;
pub mod mapping;
pub mod merge;
