//! Built-in arithmetic tools

use crate::Tool;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use react_core::{ParamType, Parameter, ToolSchema};
use serde_json::{Map, Value, json};

fn integer_pair(name: &str, description: &str) -> ToolSchema {
    ToolSchema::new(name, description)
        .param(Parameter::required("x", ParamType::Integer, "The first number"))
        .param(Parameter::required("y", ParamType::Integer, "The second number"))
}

fn integer_arg(arguments: &Map<String, Value>, key: &str) -> anyhow::Result<i64> {
    arguments
        .get(key)
        .and_then(Value::as_i64)
        .with_context(|| format!("argument '{key}' is not a 64-bit integer"))
}

/// Adds two integers
#[derive(Debug, Clone, Copy, Default)]
pub struct SumTwoNumbers;

#[async_trait]
impl Tool for SumTwoNumbers {
    fn schema(&self) -> ToolSchema {
        integer_pair("sum_two_numbers", "Use this function to sum two numbers.")
    }

    async fn call(&self, arguments: Map<String, Value>) -> anyhow::Result<Value> {
        let x = integer_arg(&arguments, "x")?;
        let y = integer_arg(&arguments, "y")?;
        let result = x
            .checked_add(y)
            .ok_or_else(|| anyhow!("{x} + {y} overflows a 64-bit integer"))?;
        Ok(json!({ "result": result }))
    }
}

/// Multiplies two integers
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplyTwoNumbers;

#[async_trait]
impl Tool for MultiplyTwoNumbers {
    fn schema(&self) -> ToolSchema {
        integer_pair(
            "multiply_two_numbers",
            "Use this function to multiply two numbers.",
        )
    }

    async fn call(&self, arguments: Map<String, Value>) -> anyhow::Result<Value> {
        let x = integer_arg(&arguments, "x")?;
        let y = integer_arg(&arguments, "y")?;
        let result = x
            .checked_mul(y)
            .ok_or_else(|| anyhow!("{x} * {y} overflows a 64-bit integer"))?;
        Ok(json!({ "result": result }))
    }
}
