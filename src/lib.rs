//! Korean i18n batch translator
//!
//! Translates up to 15 Korean strings at once into 21 export languages and
//! generates a snake_case key per item, using a schema-constrained Gemini
//! completion with retry and exponential backoff.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    backend::{CompletionBackend, GeminiBackend},
    client::TranslationClient,
    config::{EchoCheck, TranslatorConfig},
    errors::TranslationError,
    language::Language,
    models::{RequestBatch, TranslationRecord, MAX_BATCH_ITEMS},
    retry::{RetryPolicy, Retryability},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
