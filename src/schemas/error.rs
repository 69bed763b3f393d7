use crate::schemas::{Reason, Schema, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), message: None, code: None }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl Schema for ErrorResponse {
    fn read(v: &mut Validator, value: &Value) -> Option<Self> {
        let obj = v.object(value)?;

        let error = v.required::<String>(obj, "error");
        let message = v.optional::<String>(obj, "message");
        let code = v.optional::<String>(obj, "code");

        let error = match error {
            Some(e) if e.is_empty() => {
                v.report_field("error", Reason::Empty);
                None
            }
            other => other,
        };

        Some(Self { error: error?, message: message?, code: code? })
    }
}
