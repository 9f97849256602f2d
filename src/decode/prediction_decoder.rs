use serde::Deserialize;
use serde_json::Value;
use crate::core::{Confidences, Label, PredictionRecord, RawPayload};
use super::{split_records, DecodeWarning, Decoded};

#[derive(Deserialize)]
struct WirePrediction {
    prediction: String,
    good: f64,
    neutral: f64,
    bad: f64,
    #[serde(default)]
    index: Option<u64>,
}

/// Turns `output_data` payloads into prediction records
#[derive(Debug, Clone, Default)]
pub struct PredictionDecoder;

impl PredictionDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, raw: RawPayload) -> Decoded<PredictionRecord> {
        let records = match split_records(raw) {
            Ok(records) => records,
            Err(warning) => return Decoded::rejected(warning),
        };

        let mut out = Decoded::empty();
        for (index, record) in records.into_iter().enumerate() {
            match Self::decode_record(record) {
                Ok(prediction) => out.records.push(prediction),
                Err(reason) => out.warnings.push(DecodeWarning::MalformedPrediction {
                    record: index,
                    reason,
                }),
            }
        }
        out
    }

    fn decode_record(record: Value) -> Result<PredictionRecord, String> {
        if !record.is_object() {
            return Err("not an object".to_string());
        }
        let wire: WirePrediction = serde_json::from_value(record).map_err(|e| e.to_string())?;

        let confidences = Confidences::new(wire.good, wire.neutral, wire.bad);
        if let Some(bad) = confidences
            .as_array()
            .into_iter()
            .find(|c| !(0.0..=1.0).contains(c))
        {
            return Err(format!("confidence {} outside [0, 1]", bad));
        }

        Ok(PredictionRecord {
            label: Label::parse(&wire.prediction),
            confidences,
            index: wire.index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let payload = json!([{"prediction": "good", "good": 1.2, "neutral": 0.1, "bad": 0.0}]);
        let decoded = PredictionDecoder::new().decode(payload.into());

        assert!(decoded.records.is_empty());
        assert!(matches!(
            decoded.warnings[0],
            DecodeWarning::MalformedPrediction { record: 0, .. }
        ));
    }

    #[test]
    fn test_index_is_optional() {
        let payload = json!({"prediction": "bad", "good": 0.1, "neutral": 0.2, "bad": 0.7, "index": 4});
        let decoded = PredictionDecoder::new().decode(payload.into());
        assert_eq!(decoded.records[0].index, Some(4));
    }
}
