//! LLM gateway trait definition

use crate::{GenerateRequest, GenerateResponse, Result};
use async_trait::async_trait;

/// Trait for LLM gateways
///
/// A gateway takes the whole conversation plus the available tool schemas
/// and returns the model's next turn: text, tool-call requests, or both.
/// Retries, if any, are the gateway's own business; the loop controller
/// never retries a failed call.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Ask the model for its next turn
    ///
    /// # Arguments
    ///
    /// * `request` - Conversation, tool schemas, model identifier and sampling parameters
    ///
    /// # Returns
    ///
    /// The model turn and token usage
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Get the gateway name (e.g., "gemini")
    fn name(&self) -> &str;
}
