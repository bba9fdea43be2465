//! LLM backend implementations.
//!
//! # Available Backends
//!
//! - [`gemini`] - Google Gemini (Developer API and Vertex AI)
//! - [`mock`] - scripted provider for tests and offline runs

pub mod gemini;
pub mod mock;

pub use gemini::{Gemini, GeminiConfig, VertexTarget};
pub use mock::MockChatProvider;
