//! Folio CLI support library.
//!
//! Configuration loading and the error type shared by the `folio` binary.

pub mod config;
pub mod error;
