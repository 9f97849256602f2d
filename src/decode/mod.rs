pub mod prediction_decoder;
pub mod sample_decoder;
pub mod warning;

pub use prediction_decoder::PredictionDecoder;
pub use sample_decoder::SampleDecoder;
pub use warning::{DecodeWarning, Decoded};

use serde::Deserialize;
use serde_json::{Map, Value};
use crate::core::RawPayload;

/// Either shape a producer may send: one record or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Many(Vec<Value>),
    One(Map<String, Value>),
}

/// Normalize a payload into its ordered list of raw records.
///
/// Array elements are returned as-is; callers reject non-object elements
/// individually so one bad element does not cost the whole batch.
pub(crate) fn split_records(raw: RawPayload) -> Result<Vec<Value>, DecodeWarning> {
    let value = raw.into_value().map_err(|e| DecodeWarning::Unparseable {
        reason: e.to_string(),
    })?;

    let found = json_kind(&value);
    match serde_json::from_value::<Envelope>(value) {
        Ok(Envelope::Many(records)) => Ok(records),
        Ok(Envelope::One(record)) => Ok(vec![Value::Object(record)]),
        Err(_) => Err(DecodeWarning::UnexpectedShape { found }),
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
