//! Folio - artifact-aware agents that read uploaded documents
//!
//! This crate provides a small agent framework (agents, a runner loop, tools,
//! an artifact store, plugins) and the application built on it: a root agent
//! that accepts an uploaded document and a title extractor that sends the
//! document to Gemini and returns its title.
//!
//! Start from [`title::title_app`], or assemble your own [`app::App`].

pub mod agent;
pub mod app;
pub mod artifact;
pub mod chat;
pub mod context;
pub mod error;
pub mod llms;
pub mod memory;
pub mod message;
pub mod plugin;
pub mod prelude;
pub mod title;
pub mod tool;
pub mod tools;
pub mod usage;

pub use error::{ArtifactError, Error, LlmError, Result, ToolError};
