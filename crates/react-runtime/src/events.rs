//! Run event callbacks

use async_trait::async_trait;
use react_core::{Error, ToolCallRequest};
use serde_json::Value;

/// Event handler for loop execution events
///
/// Implement this trait to observe a run as it happens, e.g. to stream tool
/// call status to a client. Every method has a no-op default. Handlers are
/// observers only: they cannot alter the conversation or the outcome.
#[async_trait]
pub trait LoopEventHandler: Send + Sync {
    /// Called before each gateway call
    async fn on_iteration_start(&self, _iteration: usize, _max_iterations: usize) {}

    /// Called when a tool execution starts
    async fn on_tool_start(&self, _iteration: usize, _request: &ToolCallRequest) {}

    /// Called when a tool execution completes
    async fn on_tool_done(
        &self,
        _iteration: usize,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// Called when the model produced a final answer
    async fn on_complete(&self, _answer: &str) {}

    /// Called when the iteration budget ran out
    async fn on_exhausted(&self, _iterations: usize) {}

    /// Called when the run fails
    async fn on_error(&self, _error: &Error) {}
}
