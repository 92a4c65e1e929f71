//! Reason+act loop runtime
//!
//! This crate provides the [`ReactLoop`] controller that drives a
//! conversation between an [`LlmGateway`](react_llm::LlmGateway) and a
//! [`ToolRegistry`](react_tools::ToolRegistry): it asks the model for a
//! turn, runs any requested tools, feeds the results back and stops at the
//! first turn without tool calls or when the iteration budget runs out.

pub mod compaction;
pub mod controller;
pub mod events;
pub mod outcome;

// Re-export key types
pub use compaction::{ContextCompactor, KeepRecentRounds, NoCompaction};
pub use controller::{LoopConfig, ReactLoop, ReactLoopBuilder};
pub use events::LoopEventHandler;
pub use outcome::{LoopResult, RunReport};
