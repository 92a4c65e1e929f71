//! Google Gemini gateway implementation
//!
//! This module implements the LlmGateway trait on top of the Gemini
//! `generateContent` REST endpoint with function calling.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Example
//!
//! ```no_run
//! use react_core::ConversationState;
//! use react_llm::providers::GeminiGateway;
//! use react_llm::{GenerateRequest, LlmGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY (and optionally GEMINI_API_BASE)
//!     let gateway = GeminiGateway::from_env()?;
//!
//!     let request =
//!         GenerateRequest::builder("gemini-2.5-flash", ConversationState::new("Hello!")).build();
//!
//!     let response = gateway.generate(request).await?;
//!     println!("{:?}", response.turn.text);
//!     Ok(())
//! }
//! ```

use crate::{GenerateRequest, GenerateResponse, LLMError, LlmGateway, Result, TokenUsage};
use async_trait::async_trait;
use react_core::{ModelTurn, ToolCallRequest, ToolCallResult, ToolSchema, Turn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini gateway
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL of the API (default: "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `GEMINI_API_KEY`.
    /// Optionally reads the base URL from `GEMINI_API_BASE` if set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("GEMINI_API_KEY environment variable not set".to_string())
        })?;

        let api_base = std::env::var("GEMINI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Gemini gateway
///
/// Works with any Gemini model that supports function calling, e.g.
/// - gemini-2.5-flash
/// - gemini-2.5-pro
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    /// Create a gateway with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Gemini API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a gateway with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a gateway from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(GeminiConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    #[instrument(skip(self, request), fields(model = %request.model, turns = request.conversation.len()))]
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        debug!("Sending request to Gemini API");

        let model = request.model.clone();
        let gemini_request = build_gemini_request(&request);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.api_base, model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        // Handle errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let usage = gemini_response
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let turn = parse_gemini_response(gemini_response)?;

        debug!(
            tool_calls = turn.tool_calls.len(),
            has_text = turn.text.is_some(),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Received Gemini response"
        );

        Ok(GenerateResponse { turn, usage })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ============================================================================
// Gemini-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    /// Set on thinking-model parts that carry reasoning, not answer text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
    /// Opaque token thinking models attach to a part; must be echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn build_gemini_request(request: &GenerateRequest) -> GeminiRequest {
    let contents = request
        .conversation
        .turns()
        .iter()
        .map(convert_turn)
        .collect();

    let system_instruction = request.system.as_ref().map(|text| Content {
        role: None,
        parts: vec![Part {
            text: Some(text.clone()),
            ..Part::default()
        }],
    });

    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![convert_tools(&request.tools)]
    };

    let generation_config = (request.temperature.is_some() || request.max_output_tokens.is_some())
        .then(|| GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        });

    GeminiRequest {
        contents,
        system_instruction,
        tools,
        generation_config,
    }
}

/// Convert one conversation turn into a Gemini content entry
///
/// Tool results are sent back with role "user", one functionResponse part
/// per result, in the same order as the calls.
fn convert_turn(turn: &Turn) -> Content {
    match turn {
        Turn::User { text } => Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.clone()),
                ..Part::default()
            }],
        },
        Turn::Model(model_turn) => {
            let mut parts = Vec::with_capacity(model_turn.tool_calls.len() + 1);
            if let Some(text) = model_turn.text.as_ref().filter(|t| !t.is_empty()) {
                parts.push(Part {
                    text: Some(text.clone()),
                    ..Part::default()
                });
            }
            parts.extend(model_turn.tool_calls.iter().map(|call| Part {
                function_call: Some(FunctionCall {
                    name: call.name.clone(),
                    args: Value::Object(call.arguments.clone()),
                }),
                thought_signature: call.signature.clone(),
                ..Part::default()
            }));
            Content {
                role: Some("model".to_string()),
                parts,
            }
        }
        Turn::Tool { results } => Content {
            role: Some("user".to_string()),
            parts: results.iter().map(convert_result).collect(),
        },
    }
}

fn convert_result(result: &ToolCallResult) -> Part {
    // functionResponse.response must be a JSON object
    let response = match &result.response {
        Value::Object(_) => result.response.clone(),
        other => json!({ "result": other }),
    };
    Part {
        function_response: Some(FunctionResponse {
            name: result.name.clone(),
            response,
        }),
        ..Part::default()
    }
}

fn convert_tools(tools: &[ToolSchema]) -> GeminiTool {
    GeminiTool {
        function_declarations: tools
            .iter()
            .map(|tool| FunctionDeclaration {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.json_schema(),
            })
            .collect(),
    }
}

/// Turn the first candidate into a model turn
///
/// Text parts are concatenated (thought parts skipped); function calls keep
/// the order in which the model emitted them, along with their signatures.
/// Content without any answer part becomes an empty turn, which the loop
/// treats as an empty final answer.
fn parse_gemini_response(response: GeminiResponse) -> Result<ModelTurn> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        LLMError::UnexpectedResponse("No candidates in response".to_string())
    })?;

    let content = candidate.content.ok_or_else(|| {
        LLMError::UnexpectedResponse(format!(
            "Candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for part in content.parts {
        if let Some(call) = part.function_call {
            let arguments = match call.args {
                Value::Object(map) => map,
                Value::Null => serde_json::Map::new(),
                other => {
                    return Err(LLMError::UnexpectedResponse(format!(
                        "Function call '{}' has non-object args: {other}",
                        call.name
                    )));
                }
            };
            tool_calls.push(ToolCallRequest {
                name: call.name,
                arguments,
                signature: part.thought_signature,
            });
        } else if let Some(part_text) = part.text {
            if part.thought != Some(true) {
                text.push_str(&part_text);
            }
        }
    }

    if text.is_empty() && tool_calls.is_empty() {
        debug!(
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Response contains neither text nor function calls"
        );
        return Ok(ModelTurn::default());
    }

    Ok(ModelTurn {
        text: (!text.is_empty()).then_some(text),
        tool_calls,
    })
}

// ============================================================================
// Tests
// ============================================================================
