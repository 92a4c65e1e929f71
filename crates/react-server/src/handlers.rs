//! Route handlers

use crate::SharedState;
use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use react_core::ToolCallRequest;
use react_runtime::LoopResult;
use serde_json::{Map, Value, json};
use tracing::{error, info};

type ApiResult = Result<Json<Value>, ApiError>;

/// Parse a body as a JSON object; anything else counts as "no fields"
fn json_object(body: &Bytes) -> Map<String, Value> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "ReAct agent API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn query(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    let fields = json_object(&body);
    let query = match fields.get("query") {
        None => return Err(ApiError::BadRequest("Missing required field: query".to_string())),
        Some(Value::String(query)) => query.clone(),
        Some(_) => return Err(ApiError::BadRequest("query must be a string".to_string())),
    };
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".to_string()));
    }

    info!(query = %query, "Processing query");
    match state.agent.run(query.as_str()).await {
        Ok(LoopResult::Answer(result)) => Ok(Json(json!({
            "query": query,
            "result": result,
            "status": "success",
        }))),
        Ok(LoopResult::Exhausted { message, .. }) => Ok(Json(json!({
            "query": query,
            "result": message,
            "status": "exhausted",
        }))),
        Err(err) => {
            error!(error = %err, "Error processing query");
            Err(ApiError::Internal(err.to_string()))
        }
    }
}

pub(crate) async fn sum(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    arithmetic(&state, "sum", "sum_two_numbers", &body).await
}

pub(crate) async fn multiply(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    arithmetic(&state, "multiply", "multiply_two_numbers", &body).await
}

/// Call an arithmetic tool directly, bypassing the model
async fn arithmetic(
    state: &SharedState,
    operation: &str,
    tool: &str,
    body: &Bytes,
) -> ApiResult {
    let fields = json_object(body);
    let (Some(x), Some(y)) = (fields.get("x"), fields.get("y")) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: x and y".to_string(),
        ));
    };
    let (Some(xi), Some(yi)) = (truncate(x), truncate(y)) else {
        return Err(ApiError::BadRequest("x and y must be numbers".to_string()));
    };

    let request = ToolCallRequest::new(tool, json!({ "x": xi, "y": yi }));
    let result = state.agent.registry().invoke(&request).await.map_err(|err| {
        error!(operation, error = %err, "Error in arithmetic operation");
        ApiError::Internal(err.to_string())
    })?;

    Ok(Json(json!({
        "operation": operation,
        "x": x,
        "y": y,
        "result": result.response["result"],
        "status": "success",
    })))
}

/// Numbers are truncated toward zero; anything else is rejected
fn truncate(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

pub(crate) async fn functions(State(state): State<SharedState>) -> Json<Value> {
    let functions: Vec<Value> = state
        .agent
        .registry()
        .schemas()
        .iter()
        .map(|schema| {
            json!({
                "name": schema.name,
                "description": schema.description,
                "parameters": schema.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
                "schema": schema.json_schema(),
            })
        })
        .collect();

    Json(json!({
        "functions": functions,
        "endpoints": [
            {
                "path": "/api/query",
                "method": "POST",
                "description": "Query the ReAct agent with natural language",
            },
            {
                "path": "/api/sum",
                "method": "POST",
                "description": "Direct sum operation",
            },
            {
                "path": "/api/multiply",
                "method": "POST",
                "description": "Direct multiply operation",
            },
        ],
    }))
}

pub(crate) async fn not_found() -> ApiError {
    ApiError::NotFound
}
