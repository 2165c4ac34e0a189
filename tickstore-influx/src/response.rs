//! Decoding of `/query` response bodies into backend rows.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tickstore_core::{Row, Scalar};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Why a response body could not be turned into rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    /// The body is not a query response document.
    #[error("unreadable response: {0}")]
    Body(String),
    /// The server reported an error for the request.
    #[error("server error: {0}")]
    Server(String),
    /// The server reported an error for the statement.
    #[error("statement error: {0}")]
    Statement(String),
}

/// Rows of the first series of the first statement.
///
/// A statement that matched nothing carries no series and yields no rows.
pub fn rows_from_body(body: &str) -> Result<Vec<Row>, ResponseError> {
    let resp: QueryResponse =
        serde_json::from_str(body).map_err(|e| ResponseError::Body(e.to_string()))?;
    if let Some(e) = resp.error {
        return Err(ResponseError::Server(e));
    }
    let Some(statement) = resp.results.into_iter().next() else {
        return Ok(Vec::new());
    };
    if let Some(e) = statement.error {
        return Err(ResponseError::Statement(e));
    }
    Ok(statement
        .series
        .into_iter()
        .next()
        .map(|s| s.values.into_iter().map(to_row).collect())
        .unwrap_or_default())
}

/// Message carried by an error body, or the raw body when it is not JSON.
pub fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn to_row(values: Vec<Value>) -> Row {
    values.into_iter().map(to_scalar).collect()
}

fn to_scalar(v: Value) -> Scalar {
    match v {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(b),
        Value::Number(n) => Scalar::Number(n.to_string()),
        Value::String(s) => Scalar::Text(s),
        other @ (Value::Array(_) | Value::Object(_)) => Scalar::Text(other.to_string()),
    }
}
