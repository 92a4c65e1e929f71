//! Context compaction policies
//!
//! A [`ContextCompactor`] decides what the model sees on each iteration. It
//! produces a view of the conversation for one gateway call; the run's own
//! conversation is never shortened, so a run report always carries every
//! turn.

use react_core::{ConversationState, Result, Turn};

/// Policy applied to the conversation before every gateway call
pub trait ContextCompactor: Send + Sync {
    /// Build the view of `state` to send to the model
    ///
    /// The returned state must itself satisfy the pairing rule, which
    /// [`ConversationState::from_turns`] checks.
    fn compact(&self, state: &ConversationState) -> Result<ConversationState>;
}

/// Send the whole conversation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompaction;

impl ContextCompactor for NoCompaction {
    fn compact(&self, state: &ConversationState) -> Result<ConversationState> {
        Ok(state.clone())
    }
}

/// Keep the user query plus the most recent model/tool rounds
///
/// Rounds are dropped whole: a tool turn never reaches the model without
/// the model turn that requested it. Turns after the last tool turn are
/// always kept.
#[derive(Debug, Clone, Copy)]
pub struct KeepRecentRounds {
    /// Number of model/tool pairs to keep
    pub rounds: usize,
}

impl KeepRecentRounds {
    /// Keep the last `rounds` rounds
    pub fn new(rounds: usize) -> Self {
        Self { rounds }
    }
}

impl ContextCompactor for KeepRecentRounds {
    fn compact(&self, state: &ConversationState) -> Result<ConversationState> {
        let turns = state.turns();
        if state.rounds() <= self.rounds {
            return Ok(state.clone());
        }

        // Index of the first turn to keep after the user turn: just past the
        // newest tool turn that falls outside the window.
        let mut seen = 0;
        let mut keep_from = 1;
        for (idx, turn) in turns.iter().enumerate().skip(1).rev() {
            if matches!(turn, Turn::Tool { .. }) {
                if seen == self.rounds {
                    keep_from = idx + 1;
                    break;
                }
                seen += 1;
            }
        }

        let view = turns
            .first()
            .into_iter()
            .chain(&turns[keep_from..])
            .cloned()
            .collect();
        ConversationState::from_turns(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use react_core::{ModelTurn, ToolCallRequest, ToolCallResult};
    use serde_json::json;

    fn conversation(rounds: i64) -> ConversationState {
        (0..rounds).fold(ConversationState::new("q"), |state, n| {
            state
                .with_model_turn(ModelTurn::tool_calls(vec![ToolCallRequest::new(
                    "sum_two_numbers",
                    json!({"x": n, "y": 1}),
                )]))
                .unwrap()
                .with_tool_results(vec![ToolCallResult::new(
                    "sum_two_numbers",
                    json!({"result": n + 1}),
                )])
                .unwrap()
        })
    }

    #[test]
    fn test_no_compaction_is_identity() {
        let state = conversation(3);
        assert_eq!(NoCompaction.compact(&state).unwrap(), state);
    }

    #[test]
    fn test_keep_recent_rounds_drops_oldest_pairs() {
        let state = conversation(4);
        let view = KeepRecentRounds::new(2).compact(&state).unwrap();

        assert_eq!(view.len(), 5);
        assert_eq!(view.rounds(), 2);
        assert_eq!(view.query(), "q");
        match &view.turns()[2] {
            Turn::Tool { results } => assert_eq!(results[0].response, json!({"result": 3})),
            other => panic!("expected tool turn, got {other:?}"),
        }
        // The canonical state is untouched
        assert_eq!(state.len(), 9);
    }

    #[test]
    fn test_keep_recent_rounds_short_conversation_unchanged() {
        let state = conversation(1);
        assert_eq!(KeepRecentRounds::new(3).compact(&state).unwrap(), state);
    }

    #[test]
    fn test_keep_zero_rounds_keeps_trailing_turns() {
        let state = conversation(2)
            .with_model_turn(ModelTurn::tool_calls(vec![ToolCallRequest::new(
                "sum_two_numbers",
                json!({"x": 9, "y": 9}),
            )]))
            .unwrap();
        let view = KeepRecentRounds::new(0).compact(&state).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.pending_requests().is_some());
    }
}
