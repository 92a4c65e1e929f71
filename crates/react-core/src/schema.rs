//! Tool schema types
//!
//! A [`ToolSchema`] describes a callable tool to the model: its name, what it
//! does, and the named parameters it accepts. The same schema is used to bind
//! the arguments the model sends back before the tool is invoked.

use crate::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Whole number
    Integer,
    /// Any number
    Number,
    /// Text
    String,
    /// true / false
    Boolean,
    /// JSON array
    Array,
    /// JSON object
    Object,
}

impl ParamType {
    /// JSON Schema name of the type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Check a value against this type, normalizing integral floats to integers
    ///
    /// Models frequently emit `5.0` for integer parameters, so an `Integer`
    /// parameter accepts any float without a fractional part and rewrites it
    /// as an integer.
    fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (Self::Integer, Value::Number(n)) => {
                if n.is_i64() || n.is_u64() {
                    Some(Value::Number(n))
                } else {
                    let f = n.as_f64()?;
                    (f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15)
                        .then(|| json!(f as i64))
                }
            }
            (Self::Number, v @ Value::Number(_))
            | (Self::String, v @ Value::String(_))
            | (Self::Boolean, v @ Value::Bool(_))
            | (Self::Array, v @ Value::Array(_))
            | (Self::Object, v @ Value::Object(_)) => Some(v),
            _ => None,
        }
    }
}

/// A single named parameter of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (the keyword the model must use)
    pub name: String,

    /// Expected JSON type
    #[serde(rename = "type")]
    pub ty: ParamType,

    /// Description shown to the model
    pub description: String,

    /// Whether the model must supply this parameter
    pub required: bool,
}

impl Parameter {
    /// A parameter the model must supply
    pub fn required(name: impl Into<String>, ty: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            description: description.into(),
            required: true,
        }
    }

    /// A parameter the model may omit
    pub fn optional(name: impl Into<String>, ty: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty, description)
        }
    }
}

/// Machine-readable description of a tool
///
/// # Example
///
/// ```
/// use react_core::{ParamType, Parameter, ToolSchema};
///
/// let schema = ToolSchema::new("sum_two_numbers", "Use this function to sum two numbers.")
///     .param(Parameter::required("x", ParamType::Integer, "The first number"))
///     .param(Parameter::required("y", ParamType::Integer, "The second number"));
///
/// assert_eq!(schema.required_names().collect::<Vec<_>>(), vec!["x", "y"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name, unique within a registry
    pub name: String,

    /// What the tool does, used by the model to decide when to call it
    pub description: String,

    /// Declared parameters, in declaration order
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl ToolSchema {
    /// Create a schema with no parameters
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Look up a declared parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of the required parameters, in declaration order
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    /// Render the parameters as a JSON Schema object
    ///
    /// This is the `parameters` document providers expect in function
    /// declarations.
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({
                        "type": p.ty.as_str(),
                        "description": p.description,
                    }),
                )
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_names().collect::<Vec<_>>(),
        })
    }

    /// Bind model-supplied arguments to the declared parameters
    ///
    /// Every key must name a declared parameter, every required parameter must
    /// be present, and every value must match its declared type. Returns the
    /// arguments with integer parameters normalized.
    pub fn bind(&self, arguments: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        let invalid = |reason: String| ToolError::InvalidArguments {
            tool: self.name.clone(),
            reason,
        };

        let missing: Vec<&str> = self
            .required_names()
            .filter(|name| !arguments.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(invalid(format!(
                "missing required parameter(s): {}",
                missing.join(", ")
            )));
        }

        let mut bound = Map::with_capacity(arguments.len());
        for (key, value) in arguments {
            let Some(parameter) = self.parameter(&key) else {
                return Err(invalid(format!("unexpected parameter '{key}'")));
            };
            let found = json_kind(&value);
            let value = parameter.ty.coerce(value).ok_or_else(|| {
                invalid(format!(
                    "parameter '{key}' must be {}, got {found}",
                    parameter.ty.as_str()
                ))
            })?;
            bound.insert(key, value);
        }

        Ok(bound)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_schema() -> ToolSchema {
        ToolSchema::new("sum_two_numbers", "Use this function to sum two numbers.")
            .param(Parameter::required("x", ParamType::Integer, "The first number"))
            .param(Parameter::required("y", ParamType::Integer, "The second number"))
            .param(Parameter::optional("note", ParamType::String, "Free text"))
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = pair_schema().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["x"]["type"], "integer");
        assert_eq!(schema["properties"]["x"]["description"], "The first number");
        assert_eq!(schema["required"], json!(["x", "y"]));
    }

    #[test]
    fn test_bind_accepts_declared_arguments() {
        let bound = pair_schema()
            .bind(args(json!({"x": 5, "y": 33, "note": "hi"})))
            .unwrap();
        assert_eq!(bound["x"], json!(5));
        assert_eq!(bound["note"], json!("hi"));
    }

    #[test]
    fn test_bind_normalizes_integral_floats() {
        let bound = pair_schema().bind(args(json!({"x": 5.0, "y": 33}))).unwrap();
        assert_eq!(bound["x"].as_i64(), Some(5));
    }

    #[test]
    fn test_bind_rejects_fractional_integer() {
        let err = pair_schema().bind(args(json!({"x": 5.5, "y": 1}))).unwrap_err();
        assert!(err.to_string().contains("parameter 'x' must be integer"));
    }

    #[test]
    fn test_bind_rejects_missing_required() {
        let err = pair_schema().bind(args(json!({"x": 1}))).unwrap_err();
        match err {
            ToolError::InvalidArguments { tool, reason } => {
                assert_eq!(tool, "sum_two_numbers");
                assert!(reason.contains('y'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bind_rejects_extra_keys() {
        let err = pair_schema()
            .bind(args(json!({"x": 1, "y": 2, "z": 3})))
            .unwrap_err();
        assert!(err.to_string().contains("unexpected parameter 'z'"));
    }

    #[test]
    fn test_bind_rejects_wrong_type() {
        let err = pair_schema()
            .bind(args(json!({"x": "five", "y": 2})))
            .unwrap_err();
        assert!(err.to_string().contains("got string"));
    }

    #[test]
    fn test_schema_serialization_uses_type_key() {
        let value = serde_json::to_value(pair_schema()).unwrap();
        assert_eq!(value["parameters"][0]["type"], "integer");
        assert_eq!(value["parameters"][2]["required"], false);
    }
}
