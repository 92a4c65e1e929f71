//! Run outcomes

use react_core::ConversationState;
use react_llm::TokenUsage;

/// How a run ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopResult {
    /// The model answered without requesting tools
    Answer(String),

    /// The iteration budget ran out while the model kept requesting tools
    Exhausted {
        /// Number of iterations performed
        iterations: usize,
        /// Human-readable explanation
        message: String,
    },
}

impl LoopResult {
    /// Whether the run produced an answer
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer(_))
    }

    /// The answer, or the exhaustion message
    pub fn text(&self) -> &str {
        match self {
            Self::Answer(text) | Self::Exhausted { message: text, .. } => text,
        }
    }

    /// Take the answer, if there is one
    pub fn into_answer(self) -> Option<String> {
        match self {
            Self::Answer(text) => Some(text),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Answer or exhaustion
    pub outcome: LoopResult,

    /// The conversation as it stood when the run ended
    ///
    /// The final answer is carried by `outcome` and not appended, so this
    /// always holds the user turn followed by complete model/tool pairs.
    pub conversation: ConversationState,

    /// Iterations performed
    pub iterations: usize,

    /// Gateway calls made
    pub gateway_calls: usize,

    /// Tool invocations made
    pub tool_calls: usize,

    /// Token usage summed over all gateway calls
    pub usage: TokenUsage,
}
