//! Core data model for react-agent-rs
//!
//! This crate defines the types shared by every other crate in the workspace:
//! the conversation record passed to the model on each iteration, the schemas
//! that describe callable tools, and the error types raised while running
//! the reason+act loop.

pub mod conversation;
pub mod error;
pub mod schema;

pub use conversation::{ConversationState, ModelTurn, ToolCallRequest, ToolCallResult, Turn};
pub use error::{BoxError, Error, Result, ToolError};
pub use schema::{ParamType, Parameter, ToolSchema};
