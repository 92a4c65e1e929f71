//! Tool trait definition

use async_trait::async_trait;
use react_core::ToolSchema;
use serde_json::{Map, Value};

/// Trait for tools the model can call
///
/// Tools are functions the model asks the agent to run on its behalf. Each
/// tool describes itself with a [`ToolSchema`]; the registry binds the
/// model's arguments against that schema before [`Tool::call`] runs, so an
/// implementation only ever sees declared keys with correctly typed values.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Describe the tool
    ///
    /// Called once, at registration. The schema name is the key the model
    /// uses to request the tool and must be unique within a registry.
    fn schema(&self) -> ToolSchema;

    /// Run the tool
    ///
    /// # Arguments
    ///
    /// * `arguments` - Bound keyword arguments (validated against the schema)
    ///
    /// # Returns
    ///
    /// A structured JSON result, e.g. `{"result": 38}`
    async fn call(&self, arguments: Map<String, Value>) -> anyhow::Result<Value>;
}
