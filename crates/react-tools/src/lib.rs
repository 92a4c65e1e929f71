//! Tool management and execution framework for react-agent-rs
//!
//! This crate provides the [`Tool`] trait, the immutable [`ToolRegistry`]
//! that maps tool names to implementations, and the arithmetic tools the
//! default agent ships with.

pub mod arithmetic;
pub mod registry;
pub mod tool;

pub use arithmetic::{MultiplyTwoNumbers, SumTwoNumbers};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use tool::Tool;

use react_core::ToolError;
use std::sync::Arc;

/// Build a registry holding the built-in arithmetic tools
pub fn default_registry() -> Result<ToolRegistry, ToolError> {
    Ok(ToolRegistry::builder()
        .register(Arc::new(SumTwoNumbers))?
        .register(Arc::new(MultiplyTwoNumbers))?
        .build())
}
