//! Error types for react-core

use thiserror::Error;

/// Boxed error used to carry the original cause of a tool or gateway failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for react-core
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the tool registry and by tool invocation
///
/// These carry no loop context. The loop controller attaches the iteration
/// number with [`ToolError::at_iteration`] before surfacing them.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A tool with this name is already registered
    #[error("Tool already registered: {0}")]
    Duplicate(String),

    /// No tool with this name is registered
    #[error("Unknown tool: {0}")]
    Unknown(String),

    /// Arguments do not match the tool's declared parameters
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// What was wrong with the arguments
        reason: String,
    },

    /// The tool itself failed
    #[error("Tool '{tool}' failed: {source}")]
    Execution {
        /// Tool name
        tool: String,
        /// Original cause
        #[source]
        source: BoxError,
    },
}

impl ToolError {
    /// Name of the tool this error refers to
    pub fn tool(&self) -> &str {
        match self {
            Self::Duplicate(name) | Self::Unknown(name) => name,
            Self::InvalidArguments { tool, .. } | Self::Execution { tool, .. } => tool,
        }
    }

    /// Attach the loop iteration in which the error happened
    pub fn at_iteration(self, iteration: usize) -> Error {
        match self {
            Self::Duplicate(name) => Error::DuplicateTool(name),
            Self::Unknown(tool) => Error::UnknownTool { iteration, tool },
            Self::InvalidArguments { tool, reason } => Error::InvalidArguments {
                iteration,
                tool,
                reason,
            },
            Self::Execution { tool, source } => Error::ToolExecution {
                iteration,
                tool,
                source,
            },
        }
    }
}

/// Error type for a reason+act run
///
/// Every variant raised during a run carries the iteration number (1-based)
/// so it can be logged without re-deriving loop state.
#[derive(Error, Debug)]
pub enum Error {
    /// The model requested a tool that is not registered
    #[error("iteration {iteration}: model requested unknown tool '{tool}'")]
    UnknownTool {
        /// Iteration in which the request was made
        iteration: usize,
        /// Requested tool name
        tool: String,
    },

    /// The model supplied arguments that do not bind to the tool's parameters
    #[error("iteration {iteration}: invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments {
        /// Iteration in which the request was made
        iteration: usize,
        /// Tool name
        tool: String,
        /// What was wrong with the arguments
        reason: String,
    },

    /// A tool raised an error while executing
    #[error("iteration {iteration}: tool '{tool}' failed: {source}")]
    ToolExecution {
        /// Iteration in which the tool ran
        iteration: usize,
        /// Tool name
        tool: String,
        /// Original cause
        #[source]
        source: BoxError,
    },

    /// The LLM gateway call failed or returned a malformed turn
    #[error("iteration {iteration}: gateway call failed: {source}")]
    Gateway {
        /// Iteration in which the call was made
        iteration: usize,
        /// Original cause
        #[source]
        source: BoxError,
    },

    /// A tool name was registered twice
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// An append would break the request/result pairing of the conversation
    #[error("Invalid conversation turn: {0}")]
    InvalidTurn(String),

    /// Invalid loop configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Iteration in which the error happened, if it was raised during a run
    pub fn iteration(&self) -> Option<usize> {
        match self {
            Self::UnknownTool { iteration, .. }
            | Self::InvalidArguments { iteration, .. }
            | Self::ToolExecution { iteration, .. }
            | Self::Gateway { iteration, .. } => Some(*iteration),
            Self::DuplicateTool(_) | Self::InvalidTurn(_) | Self::Configuration(_) => None,
        }
    }

    /// Offending tool name, if the error is tool related
    pub fn tool(&self) -> Option<&str> {
        match self {
            Self::UnknownTool { tool, .. }
            | Self::InvalidArguments { tool, .. }
            | Self::ToolExecution { tool, .. }
            | Self::DuplicateTool(tool) => Some(tool),
            Self::Gateway { .. } | Self::InvalidTurn(_) | Self::Configuration(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_at_iteration_keeps_tool_name() {
        let err = ToolError::Unknown("divide".to_string()).at_iteration(3);
        assert!(matches!(err, Error::UnknownTool { iteration: 3, .. }));
        assert_eq!(err.iteration(), Some(3));
        assert_eq!(err.tool(), Some("divide"));
        assert_eq!(
            err.to_string(),
            "iteration 3: model requested unknown tool 'divide'"
        );
    }

    #[test]
    fn test_execution_error_keeps_source() {
        let cause = std::io::Error::other("disk on fire");
        let err = ToolError::Execution {
            tool: "sum_two_numbers".to_string(),
            source: Box::new(cause),
        }
        .at_iteration(1);

        assert_eq!(err.tool(), Some("sum_two_numbers"));
        assert_eq!(
            err.source().map(|e| e.to_string()).as_deref(),
            Some("disk on fire")
        );
    }

    #[test]
    fn test_configuration_error_has_no_context() {
        let err = Error::Configuration("max_iterations must be positive".to_string());
        assert_eq!(err.iteration(), None);
        assert_eq!(err.tool(), None);
    }
}
