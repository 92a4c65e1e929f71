//! Tool registry mapping tool names to implementations

use crate::Tool;
use react_core::{ToolCallRequest, ToolCallResult, ToolError, ToolSchema};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct Entry {
    tool: Arc<dyn Tool>,
    schema_index: usize,
}

/// Immutable registry of tools
///
/// Built once with [`ToolRegistryBuilder`] and never mutated afterwards, so
/// it can be shared behind an `Arc` by any number of concurrent runs
/// without locking.
pub struct ToolRegistry {
    tools: HashMap<String, Entry>,
    schemas: Arc<[ToolSchema]>,
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Get a tool by name
    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn Tool>, ToolError> {
        self.entry(name).map(|entry| &entry.tool)
    }

    fn entry(&self, name: &str) -> Result<&Entry, ToolError> {
        self.tools
            .get(name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))
    }

    /// Get a tool's schema by name
    pub fn schema(&self, name: &str) -> Option<&ToolSchema> {
        self.tools
            .get(name)
            .map(|entry| &self.schemas[entry.schema_index])
    }

    /// All schemas, in registration order
    ///
    /// The slice is built once at [`ToolRegistryBuilder::build`]; cloning the
    /// returned `Arc` is cheap.
    pub fn schemas(&self) -> Arc<[ToolSchema]> {
        Arc::clone(&self.schemas)
    }

    /// Resolve, bind and run one tool-call request
    pub async fn invoke(&self, request: &ToolCallRequest) -> Result<ToolCallResult, ToolError> {
        let entry = self.entry(&request.name)?;
        let schema = &self.schemas[entry.schema_index];

        let arguments = schema.bind(request.arguments.clone())?;
        debug!(tool_name = %request.name, ?arguments, "Invoking tool");

        let response = entry
            .tool
            .call(arguments)
            .await
            .map_err(|source| ToolError::Execution {
                tool: request.name.clone(),
                source: source.into(),
            })?;

        Ok(ToolCallResult::new(request.name.clone(), response))
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builder for ToolRegistry
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, Entry>,
    schemas: Vec<ToolSchema>,
}

impl ToolRegistryBuilder {
    /// Register a tool under its schema name
    ///
    /// Fails with [`ToolError::Duplicate`] if the name is taken.
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Result<Self, ToolError> {
        let schema = tool.schema();
        if self.tools.contains_key(&schema.name) {
            return Err(ToolError::Duplicate(schema.name));
        }

        self.tools.insert(
            schema.name.clone(),
            Entry {
                tool,
                schema_index: self.schemas.len(),
            },
        );
        self.schemas.push(schema);
        Ok(self)
    }

    /// Freeze the registry
    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools,
            schemas: Arc::from(self.schemas),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use react_core::{ParamType, Parameter};
    use serde_json::{Map, Value, json};

    mock! {
        pub Echo {}

        #[async_trait]
        impl Tool for Echo {
            fn schema(&self) -> ToolSchema;
            async fn call(&self, arguments: Map<String, Value>) -> anyhow::Result<Value>;
        }
    }

    fn echo_schema(name: &str) -> ToolSchema {
        ToolSchema::new(name, "Echo the text back")
            .param(Parameter::required("text", ParamType::String, "Text to echo"))
    }

    fn echo(name: &'static str) -> MockEcho {
        let mut tool = MockEcho::new();
        tool.expect_schema().returning(move || echo_schema(name));
        tool
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let err = ToolRegistry::builder()
            .register(Arc::new(echo("echo")))
            .unwrap()
            .register(Arc::new(echo("echo")))
            .err()
            .unwrap();
        assert!(matches!(err, ToolError::Duplicate(name) if name == "echo"));
    }

    #[test]
    fn test_schemas_keep_registration_order() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(echo("zeta")))
            .unwrap()
            .register(Arc::new(echo("alpha")))
            .unwrap()
            .build();

        let names: Vec<_> = registry.schemas().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.schema("alpha").is_some());
    }

    #[test]
    fn test_resolve_unknown_tool() {
        let registry = ToolRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.resolve("nope"),
            Err(ToolError::Unknown(name)) if name == "nope"
        ));
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(echo("echo")))
            .unwrap()
            .build();

        let err = registry
            .invoke(&ToolCallRequest::new("divide_two_numbers", json!({"x": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Unknown(name) if name == "divide_two_numbers"));
    }

    #[tokio::test]
    async fn test_invoke_binds_and_calls() {
        let mut tool = echo("echo");
        tool.expect_call()
            .times(1)
            .returning(|args| Ok(json!({ "echo": args["text"] })));
        let registry = ToolRegistry::builder()
            .register(Arc::new(tool))
            .unwrap()
            .build();

        let result = registry
            .invoke(&ToolCallRequest::new("echo", json!({"text": "hi"})))
            .await
            .unwrap();
        assert_eq!(result.name, "echo");
        assert_eq!(result.response, json!({"echo": "hi"}));
    }

    #[tokio::test]
    async fn test_invoke_rejects_bad_arguments_without_calling() {
        let mut tool = echo("echo");
        tool.expect_call().never();
        let registry = ToolRegistry::builder()
            .register(Arc::new(tool))
            .unwrap()
            .build();

        let err = registry
            .invoke(&ToolCallRequest::new("echo", json!({"text": "hi", "extra": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_invoke_wraps_tool_failure() {
        let mut tool = echo("echo");
        tool.expect_call()
            .returning(|_| Err(anyhow::anyhow!("echo chamber collapsed")));
        let registry = ToolRegistry::builder()
            .register(Arc::new(tool))
            .unwrap()
            .build();

        let err = registry
            .invoke(&ToolCallRequest::new("echo", json!({"text": "hi"})))
            .await
            .unwrap_err();
        assert_eq!(err.tool(), "echo");
        assert!(err.to_string().contains("echo chamber collapsed"));
    }
}
