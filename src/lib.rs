//! CODEX — a desktop assistant that assembles code-aware prompts and sends
//! them to the Anthropic Messages API.
//!
//! The crate is split into a small set of UI-free modules (scanner, segment
//! store, prompt builder, API client) driven by the egui shell in [`app`].

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod prompt;
pub mod scanner;
pub mod segment;
pub mod token_count;

pub use error::{Error, Result};
