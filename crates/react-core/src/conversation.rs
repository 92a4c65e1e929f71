//! Conversation state for a single reason+act run
//!
//! The conversation is an append-only sequence of [`Turn`]s. It starts with
//! the user's query and grows by one model turn per iteration, followed by a
//! tool turn whenever that model turn requested tool calls.
//!
//! Appends go through [`ConversationState::with_model_turn`] and
//! [`ConversationState::with_tool_results`], which take the state by value
//! and return the updated state. Both check the pairing rule: a tool turn
//! only ever directly follows the model turn whose requests it answers, with
//! exactly one result per request, in request order.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the tool to call
    pub name: String,

    /// Keyword arguments
    #[serde(default)]
    pub arguments: Map<String, Value>,

    /// Opaque provider token attached to the call, sent back unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ToolCallRequest {
    /// Create a request from a name and a JSON object of arguments
    ///
    /// Non-object values are treated as "no arguments".
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            arguments,
            signature: None,
        }
    }

    /// Attach a provider signature
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// The value a tool returned for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Name of the tool that produced the response
    pub name: String,

    /// Structured tool output
    pub response: Value,
}

impl ToolCallResult {
    /// Create a result
    pub fn new(name: impl Into<String>, response: Value) -> Self {
        Self {
            name: name.into(),
            response,
        }
    }
}

/// One turn produced by the model
///
/// When `tool_calls` is non-empty the turn is a request for tool execution
/// and `text` is not used as an answer, even if present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelTurn {
    /// Natural-language content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Requested tool invocations, in the order the model emitted them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelTurn {
    /// A turn carrying only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A turn carrying only tool-call requests
    pub fn tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }

    /// Attach text to the turn
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether the model asked for any tool to run
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One entry in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    /// The user's query
    User {
        /// Query text
        text: String,
    },

    /// Output of the model
    Model(ModelTurn),

    /// Results for every request of the preceding model turn
    Tool {
        /// One result per request, in request order
        results: Vec<ToolCallResult>,
    },
}

impl Turn {
    /// Role label ("user", "model", or "tool")
    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Model(_) => "model",
            Self::Tool { .. } => "tool",
        }
    }

    /// Tool-call requests carried by a model turn
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Self::Model(turn) => &turn.tool_calls,
            _ => &[],
        }
    }
}

/// Ordered, append-only record of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Start a conversation with the user's query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::User { text: query.into() }],
        }
    }

    /// Rebuild a conversation from turns, checking the pairing rule
    ///
    /// Used by context compaction to produce a shortened view.
    pub fn from_turns(turns: Vec<Turn>) -> Result<Self> {
        let Some(Turn::User { .. }) = turns.first() else {
            return Err(Error::InvalidTurn(
                "conversation must start with a user turn".to_string(),
            ));
        };

        let mut state = Self {
            turns: Vec::with_capacity(turns.len()),
        };
        for turn in turns {
            state.check_append(&turn)?;
            state.turns.push(turn);
        }
        Ok(state)
    }

    /// Append a model turn
    pub fn with_model_turn(mut self, turn: ModelTurn) -> Result<Self> {
        let turn = Turn::Model(turn);
        self.check_append(&turn)?;
        self.turns.push(turn);
        Ok(self)
    }

    /// Append the results for the pending tool-call requests as one turn
    pub fn with_tool_results(mut self, results: Vec<ToolCallResult>) -> Result<Self> {
        let turn = Turn::Tool { results };
        self.check_append(&turn)?;
        self.turns.push(turn);
        Ok(self)
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: a conversation holds at least the user turn
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The original user query
    pub fn query(&self) -> &str {
        match self.turns.first() {
            Some(Turn::User { text }) => text,
            _ => "",
        }
    }

    /// Requests of the last model turn that still await a tool turn
    pub fn pending_requests(&self) -> Option<&[ToolCallRequest]> {
        match self.turns.last() {
            Some(Turn::Model(turn)) if turn.has_tool_calls() => Some(&turn.tool_calls),
            _ => None,
        }
    }

    /// Number of model/tool round trips recorded so far
    pub fn rounds(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| matches!(turn, Turn::Tool { .. }))
            .count()
    }

    fn check_append(&self, turn: &Turn) -> Result<()> {
        let pending = self.pending_requests();
        match (turn, pending) {
            (Turn::Tool { results }, Some(requests)) => {
                if results.len() != requests.len() {
                    return Err(Error::InvalidTurn(format!(
                        "expected {} tool result(s), got {}",
                        requests.len(),
                        results.len()
                    )));
                }
                if let Some((request, result)) = requests
                    .iter()
                    .zip(results)
                    .find(|(request, result)| request.name != result.name)
                {
                    return Err(Error::InvalidTurn(format!(
                        "tool result '{}' does not answer request '{}'",
                        result.name, request.name
                    )));
                }
                Ok(())
            }
            (Turn::Tool { .. }, None) => Err(Error::InvalidTurn(
                "tool turn must follow a model turn with tool calls".to_string(),
            )),
            (_, Some(requests)) => Err(Error::InvalidTurn(format!(
                "{} turn cannot follow a model turn with {} unanswered tool call(s)",
                turn.role(),
                requests.len()
            ))),
            (_, None) => Ok(()),
        }
    }
}
