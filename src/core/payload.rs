use serde_json::Value;

/// Inbound event body as handed over by a transport.
///
/// Producers either send structured JSON or a JSON document encoded as a
/// string; decoders normalize both before looking at any record.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Text(String),
    Json(Value),
}

impl RawPayload {
    /// Parse string-encoded bodies into a JSON value.
    ///
    /// A JSON string value is treated the same as `Text`, since some
    /// transports wrap string-encoded documents in their own JSON framing.
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            RawPayload::Text(text) | RawPayload::Json(Value::String(text)) => {
                serde_json::from_str(&text)
            }
            RawPayload::Json(value) => Ok(value),
        }
    }

    pub fn empty() -> Self {
        RawPayload::Json(Value::Null)
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        RawPayload::Json(value)
    }
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        RawPayload::Text(text)
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        RawPayload::Text(text.to_string())
    }
}
