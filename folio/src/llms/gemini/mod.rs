//! Google Gemini API client.
//!
//! Speaks the non-streaming `generateContent` endpoint of either the Gemini
//! Developer API (API key) or Vertex AI (project, location and access token).
//! Inline document parts, function calling and usage metadata are supported.

mod chat;
mod client;
mod config;
mod types;

pub use client::Gemini;
pub use config::{GeminiConfig, VertexTarget};
