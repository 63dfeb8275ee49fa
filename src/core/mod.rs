//! Core translation engine module

pub mod backend;
pub mod client;
pub mod config;
pub mod errors;
pub mod language;
pub mod models;
pub mod prompt;
pub mod retry;
pub mod schema;
