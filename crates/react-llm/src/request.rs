//! Generate request and response types

use react_core::{ConversationState, ModelTurn, ToolSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request for the model's next turn, carrying the full conversation
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Conversation so far, starting with the user query
    pub conversation: ConversationState,

    /// Tools the model may call, shared across iterations
    pub tools: Arc<[ToolSchema]>,

    /// Optional system instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<usize>,
}

/// Response from the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The model's turn
    pub turn: ModelTurn,

    /// Token usage statistics
    pub usage: TokenUsage,
}

impl GenerateResponse {
    /// Wrap a turn with zero usage
    pub fn from_turn(turn: ModelTurn) -> Self {
        Self {
            turn,
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: usize,

    /// Number of output tokens
    pub output_tokens: usize,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

impl GenerateRequest {
    /// Create a builder for generate requests
    pub fn builder(model: impl Into<String>, conversation: ConversationState) -> GenerateRequestBuilder {
        GenerateRequestBuilder::new(model, conversation)
    }
}

/// Builder for GenerateRequest
pub struct GenerateRequestBuilder {
    model: String,
    conversation: ConversationState,
    tools: Arc<[ToolSchema]>,
    system: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<usize>,
}

impl GenerateRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>, conversation: ConversationState) -> Self {
        Self {
            model: model.into(),
            conversation,
            tools: Arc::from(Vec::new()),
            system: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Set the available tools
    pub fn tools(mut self, tools: Arc<[ToolSchema]>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the system instruction
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum output tokens
    pub fn max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Build the generate request
    pub fn build(self) -> GenerateRequest {
        GenerateRequest {
            model: self.model,
            conversation: self.conversation,
            tools: self.tools,
            system: self.system,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use react_core::{ParamType, Parameter};

    #[test]
    fn test_builder() {
        let tools: Arc<[ToolSchema]> = Arc::from(vec![
            ToolSchema::new("sum_two_numbers", "Sum two numbers")
                .param(Parameter::required("x", ParamType::Integer, "first")),
        ]);
        let request = GenerateRequest::builder("gemini-2.5-flash", ConversationState::new("Hello"))
            .tools(tools.clone())
            .system("You are a calculator")
            .temperature(0.2)
            .build();

        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.conversation.len(), 1);
        assert_eq!(request.tools.len(), 1);
        assert!(Arc::ptr_eq(&request.tools, &tools));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_output_tokens, None);
    }

    #[test]
    fn test_token_usage() {
        let mut usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);

        usage += TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        };
        assert_eq!(usage.total(), 165);
    }
}
