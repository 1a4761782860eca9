//! JSON-RPC 2.0 envelope for one `textDocument/codeAction` round trip.

use serde::{
  Deserialize,
  Serialize,
};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const CODE_ACTION_METHOD: &str = "textDocument/codeAction";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
  Number(u64),
  String(String),
  Null,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
  jsonrpc:    &'static str,
  pub id:     RequestId,
  pub method: String,
  pub params: Value,
}

impl Request {
  pub fn code_action(id: u64, params: Value) -> Self {
    Self {
      jsonrpc: "2.0",
      id: RequestId::Number(id),
      method: CODE_ACTION_METHOD.into(),
      params,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Error)]
#[error("language server error {code}: {message}")]
pub struct ServerError {
  pub code:    i64,
  pub message: String,
  #[serde(default)]
  pub data:    Option<Value>,
}

#[derive(Debug, Error)]
pub enum ReplyError {
  #[error(transparent)]
  Server(#[from] ServerError),
  #[error("expected a response, got a `{0}` message")]
  NotAResponse(String),
  #[error("malformed json-rpc response: {0}")]
  Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ResponsePayload {
  id:     RequestId,
  #[serde(default)]
  result: Option<Value>,
  #[serde(default)]
  error:  Option<ServerError>,
}

/// Result carried by a server reply.
///
/// Objects are decoded as a response envelope. Anything else is taken to be
/// a bare result, as recorded from a client log.
pub fn reply_result(value: Value) -> Result<Option<Value>, ReplyError> {
  let Some(object) = value.as_object() else {
    return Ok(Some(value));
  };
  if let Some(method) = object.get("method").and_then(Value::as_str) {
    return Err(ReplyError::NotAResponse(method.to_owned()));
  }

  let response: ResponsePayload = serde_json::from_value(value)?;
  debug!(id = ?response.id, failed = response.error.is_some(), "decoded reply");
  match response.error {
    Some(error) => Err(error.into()),
    None => Ok(response.result),
  }
}
