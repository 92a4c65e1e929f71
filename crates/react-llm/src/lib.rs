//! LLM gateway abstraction layer for react-agent-rs
//!
//! This crate provides the provider-agnostic boundary between the reason+act
//! loop and a hosted model. It includes:
//!
//! - Request/response types for one model turn
//! - The [`LlmGateway`] trait implemented by every provider
//! - A Gemini gateway speaking the `generateContent` REST API (behind the
//!   `gemini` feature, on by default)
//! - A scripted in-memory gateway for tests (behind the `testing` feature)

pub mod error;
pub mod gateway;
pub mod request;

// Re-export main types
pub use error::{LLMError, Result};
pub use gateway::LlmGateway;
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, TokenUsage};

// Gateway implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;

#[cfg(any(test, feature = "testing"))]
pub mod scripted;
