//! Reason+act loop controller
//!
//! The [`ReactLoop`] implements the tool-calling loop:
//! 1. Send the conversation and the tool schemas to the gateway
//! 2. If the model requested tools, run them in order, append the results
//!    as one tool turn and loop back
//! 3. Otherwise the model's text is the answer
//!
//! The loop is bounded by `max_iterations`; running out of iterations is an
//! outcome ([`LoopResult::Exhausted`]), not an error. Any tool or gateway
//! failure ends the run with an [`Error`] carrying the iteration number.

use crate::compaction::{ContextCompactor, NoCompaction};
use crate::events::LoopEventHandler;
use crate::outcome::{LoopResult, RunReport};
use react_core::{ConversationState, Error, Result, ToolCallRequest, ToolCallResult, ToolSchema};
use react_llm::{GenerateRequest, GenerateResponse, LLMError, LlmGateway, TokenUsage};
use react_tools::ToolRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default iteration budget
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Configuration for a loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum number of gateway calls per run
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System instruction
    pub system_prompt: Option<String>,

    /// Temperature
    pub temperature: Option<f32>,

    /// Max tokens per model turn
    pub max_output_tokens: Option<usize>,

    /// Deadline for a single gateway call
    pub gateway_timeout: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            temperature: None,
            max_output_tokens: None,
            gateway_timeout: None,
        }
    }
}

impl LoopConfig {
    /// Check the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::Configuration(
                "max_iterations must be a positive integer".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("model must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Runs queries through the reason+act loop
///
/// A `ReactLoop` holds no per-run state: every call to [`ReactLoop::run`]
/// owns its own conversation, so one loop can serve concurrent runs. The
/// gateway and the registry are shared read-only.
pub struct ReactLoop {
    gateway: Arc<dyn LlmGateway>,
    registry: Arc<ToolRegistry>,
    config: LoopConfig,
    compactor: Arc<dyn ContextCompactor>,
    event_handler: Option<Arc<dyn LoopEventHandler>>,
}

impl ReactLoop {
    /// Create a loop with no compaction and no event handler
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        registry: Arc<ToolRegistry>,
        config: LoopConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gateway,
            registry,
            config,
            compactor: Arc::new(NoCompaction),
            event_handler: None,
        })
    }

    /// Create a builder
    pub fn builder() -> ReactLoopBuilder {
        ReactLoopBuilder::new()
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn LoopEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Set the compaction policy
    pub fn with_compactor(mut self, compactor: Arc<dyn ContextCompactor>) -> Self {
        self.compactor = compactor;
        self
    }

    /// The loop configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// The tool registry
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Answer a query
    ///
    /// # Returns
    ///
    /// The model's final answer, or [`LoopResult::Exhausted`] if the model
    /// was still requesting tools after `max_iterations` gateway calls
    pub async fn run(&self, query: impl Into<String>) -> Result<LoopResult> {
        self.run_with_report(query).await.map(|report| report.outcome)
    }

    /// Answer a query and return the full run report
    pub async fn run_with_report(&self, query: impl Into<String>) -> Result<RunReport> {
        let result = self.drive(query.into()).await;

        if let Err(err) = &result {
            warn!(
                iteration = ?err.iteration(),
                tool_name = ?err.tool(),
                error = %err,
                "ReAct run failed"
            );
            if let Some(handler) = &self.event_handler {
                handler.on_error(err).await;
            }
        }

        result
    }

    async fn drive(&self, query: String) -> Result<RunReport> {
        let max_iterations = self.config.max_iterations;
        let tools = self.registry.schemas();
        let mut state = ConversationState::new(query);
        let mut usage = TokenUsage::default();
        let mut tool_calls = 0;

        info!(
            model = %self.config.model,
            max_iterations,
            tool_count = tools.len(),
            query_preview = %preview(state.query(), 200),
            "ReAct run started"
        );

        for iteration in 1..=max_iterations {
            info!(iteration, max_iterations, "ReAct iteration started");
            if let Some(handler) = &self.event_handler {
                handler.on_iteration_start(iteration, max_iterations).await;
            }

            let view = self.compactor.compact(&state)?;
            if view.len() < state.len() {
                debug!(
                    iteration,
                    turns = state.len(),
                    sent_turns = view.len(),
                    "Conversation compacted"
                );
            }

            let response = self.generate(iteration, view, &tools).await?;
            usage += response.usage;
            let turn = response.turn;

            info!(
                iteration,
                tool_call_count = turn.tool_calls.len(),
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Model turn received"
            );

            if !turn.has_tool_calls() {
                let answer = turn.text.unwrap_or_default();
                info!(
                    iteration,
                    answer_length = answer.len(),
                    answer_preview = %preview(&answer, 300),
                    "ReAct run completed"
                );
                if let Some(handler) = &self.event_handler {
                    handler.on_complete(&answer).await;
                }

                return Ok(RunReport {
                    outcome: LoopResult::Answer(answer),
                    conversation: state,
                    iterations: iteration,
                    gateway_calls: iteration,
                    tool_calls,
                    usage,
                });
            }

            if let Some(text) = turn.text.as_deref() {
                debug!(iteration, text_preview = %preview(text, 300), "Ignoring text alongside tool calls");
            }

            let requests = turn.tool_calls.clone();
            state = state.with_model_turn(turn)?;

            let results = self.execute_tools(iteration, &requests).await?;
            tool_calls += results.len();
            state = state.with_tool_results(results)?;
        }

        let message =
            format!("Maximum iterations ({max_iterations}) reached without getting a final answer.");
        warn!(max_iterations, tool_calls, "Iteration budget exhausted");
        if let Some(handler) = &self.event_handler {
            handler.on_exhausted(max_iterations).await;
        }

        Ok(RunReport {
            outcome: LoopResult::Exhausted {
                iterations: max_iterations,
                message,
            },
            conversation: state,
            iterations: max_iterations,
            gateway_calls: max_iterations,
            tool_calls,
            usage,
        })
    }

    /// Ask the gateway for the next model turn, applying the call deadline
    #[instrument(
        skip(self, conversation, tools),
        fields(gateway = %self.gateway.name(), model = %self.config.model, turns = conversation.len())
    )]
    async fn generate(
        &self,
        iteration: usize,
        conversation: ConversationState,
        tools: &Arc<[ToolSchema]>,
    ) -> Result<GenerateResponse> {
        let mut builder = GenerateRequest::builder(&self.config.model, conversation)
            .tools(Arc::clone(tools));
        if let Some(system) = &self.config.system_prompt {
            builder = builder.system(system.clone());
        }
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_output_tokens) = self.config.max_output_tokens {
            builder = builder.max_output_tokens(max_output_tokens);
        }

        let start = Instant::now();
        let call = self.gateway.generate(builder.build());
        let response = match self.config.gateway_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(LLMError::Timeout(limit))),
            None => call.await,
        };
        debug!(duration_ms = elapsed_ms(start), "Gateway call finished");

        response.map_err(|source| Error::Gateway {
            iteration,
            source: Box::new(source),
        })
    }

    /// Run the requested tools in order, stopping at the first failure
    async fn execute_tools(
        &self,
        iteration: usize,
        requests: &[ToolCallRequest],
    ) -> Result<Vec<ToolCallResult>> {
        let mut results = Vec::with_capacity(requests.len());

        for request in requests {
            let input = serde_json::to_string(&request.arguments).unwrap_or_default();
            info!(
                iteration,
                tool_name = %request.name,
                input_preview = %preview(&input, 500),
                "Executing tool"
            );
            if let Some(handler) = &self.event_handler {
                handler.on_tool_start(iteration, request).await;
            }

            let start = Instant::now();
            match self.registry.invoke(request).await {
                Ok(result) => {
                    let duration_ms = elapsed_ms(start);
                    let output = result.response.to_string();
                    info!(
                        iteration,
                        tool_name = %request.name,
                        duration_ms,
                        result_preview = %preview(&output, 500),
                        "Tool execution succeeded"
                    );
                    if let Some(handler) = &self.event_handler {
                        handler
                            .on_tool_done(iteration, &request.name, Ok(&result.response), duration_ms)
                            .await;
                    }
                    results.push(result);
                }
                Err(err) => {
                    let duration_ms = elapsed_ms(start);
                    let message = err.to_string();
                    warn!(
                        iteration,
                        tool_name = %request.name,
                        duration_ms,
                        error = %message,
                        "Tool execution failed"
                    );
                    if let Some(handler) = &self.event_handler {
                        handler
                            .on_tool_done(iteration, &request.name, Err(&message), duration_ms)
                            .await;
                    }
                    return Err(err.at_iteration(iteration));
                }
            }
        }

        Ok(results)
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Builder for ReactLoop
pub struct ReactLoopBuilder {
    gateway: Option<Arc<dyn LlmGateway>>,
    registry: Option<Arc<ToolRegistry>>,
    config: LoopConfig,
    compactor: Arc<dyn ContextCompactor>,
    event_handler: Option<Arc<dyn LoopEventHandler>>,
}

impl ReactLoopBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            gateway: None,
            registry: None,
            config: LoopConfig::default(),
            compactor: Arc::new(NoCompaction),
            event_handler: None,
        }
    }

    /// Set the LLM gateway
    pub fn gateway(mut self, gateway: Arc<dyn LlmGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the tool registry
    pub fn registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set max output tokens
    pub fn max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.config.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Set the per-call gateway deadline
    pub fn gateway_timeout(mut self, timeout: Duration) -> Self {
        self.config.gateway_timeout = Some(timeout);
        self
    }

    /// Set the compaction policy
    pub fn compactor(mut self, compactor: Arc<dyn ContextCompactor>) -> Self {
        self.compactor = compactor;
        self
    }

    /// Set the event handler
    pub fn event_handler(mut self, handler: Arc<dyn LoopEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the loop
    ///
    /// Without a registry the loop runs with no tools.
    pub fn build(self) -> Result<ReactLoop> {
        let gateway = self
            .gateway
            .ok_or_else(|| Error::Configuration("gateway not set".to_string()))?;
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ToolRegistry::builder().build()));

        let mut react_loop = ReactLoop::new(gateway, registry, self.config)?;
        react_loop.compactor = self.compactor;
        react_loop.event_handler = self.event_handler;
        Ok(react_loop)
    }
}

impl Default for ReactLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
