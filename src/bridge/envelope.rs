use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// One request line sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub code: String,
    pub message: String,
}

/// One response line from the backend. `id` is absent only when the request itself was unreadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl Response {
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: Some(id.into()),
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(WireError {
                code: code.to_string(),
                message: message.into(),
            }),
        }
    }

    /// Unwrap the envelope into the payload, or a [`AppError::Bridge`] naming the operation.
    pub fn into_result(self, operation: &str) -> Result<Value> {
        if self.ok {
            return Ok(self.result.unwrap_or(Value::Null));
        }
        let error = self.error.unwrap_or_else(|| WireError {
            code: "unknown".to_string(),
            message: "backend reported failure without details".to_string(),
        });
        Err(AppError::Bridge {
            operation: operation.to_string(),
            code: error.code,
            message: error.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_result_reads_as_null() {
        let response: Response = serde_json::from_str(r#"{"id":"1","ok":true,"result":null}"#).unwrap();
        assert_eq!(response.into_result("set_data_key").unwrap(), Value::Null);
    }

    #[test]
    fn failure_names_the_operation() {
        let response = Response::failure(Some("4".into()), "not_found", "student 9 not found");
        let err = response.into_result("get_student_by_id").unwrap_err();
        assert_eq!(err.bridge_code(), Some("not_found"));
        assert!(err.to_string().contains("get_student_by_id"));
    }

    #[test]
    fn success_line_shape() {
        let line = serde_json::to_value(Response::success("7", json!([1, 2]))).unwrap();
        assert_eq!(line, json!({"id": "7", "ok": true, "result": [1, 2]}));
    }
}
