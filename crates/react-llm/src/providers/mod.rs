//! Concrete LLM gateway implementations
//!
//! This module contains implementations of the LlmGateway trait for
//! hosted model services.

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiGateway};
