//! Scripted in-memory gateway for tests
//!
//! [`ScriptedGateway`] replays a queue of prepared turns (or errors) and
//! records every request it receives, so tests can drive the loop controller
//! deterministically and inspect exactly what the model would have seen.

use crate::{GenerateRequest, GenerateResponse, LLMError, LlmGateway, Result};
use async_trait::async_trait;
use react_core::ModelTurn;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Gateway that answers from a script
///
/// Once the queue is empty the `repeat` turn (if any) is returned forever;
/// otherwise the call fails with [`LLMError::UnexpectedResponse`].
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<ModelTurn>>>,
    repeat: Option<ModelTurn>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGateway {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a turn
    pub fn then_turn(self, turn: ModelTurn) -> Self {
        self.lock_script().push_back(Ok(turn));
        self
    }

    /// Queue a failure
    pub fn then_error(self, error: LLMError) -> Self {
        self.lock_script().push_back(Err(error));
        self
    }

    /// Answer with this turn once the queue runs dry
    pub fn repeating(mut self, turn: ModelTurn) -> Self {
        self.repeat = Some(turn);
        self
    }

    /// Sleep before every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of generate calls received
    pub fn calls(&self) -> usize {
        self.lock_requests().len()
    }

    /// Copies of every request received, oldest first
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.lock_requests().clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<ModelTurn>>> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<GenerateRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.lock_requests().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.lock_script().pop_front();
        match next {
            Some(result) => result.map(GenerateResponse::from_turn),
            None => self
                .repeat
                .clone()
                .map(GenerateResponse::from_turn)
                .ok_or_else(|| LLMError::UnexpectedResponse("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
