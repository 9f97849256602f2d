use serde_json::{Map, Value};
use crate::config::PipelineConfig;
use crate::core::{ChannelSet, RawPayload, Sample};
use crate::resilience::MissingChannelPolicy;
use super::{split_records, DecodeWarning, Decoded};

/// Turns `eeg_data` payloads into ordered samples.
///
/// Two record layouts are understood:
///
/// * point records, `{"timestamp": t, "<channel>": v, ...}`
/// * block records, `{"timestamp": t, "values": {"<channel>": [v, ...]}}`,
///   expanded to one sample per index spaced `1 / sample_rate_hz` apart
///
/// Records are emitted in payload order; nothing is sorted by timestamp.
#[derive(Debug, Clone)]
pub struct SampleDecoder {
    channels: ChannelSet,
    policy: MissingChannelPolicy,
    sample_rate_hz: f64,
}

impl SampleDecoder {
    pub fn new(channels: ChannelSet, policy: MissingChannelPolicy, sample_rate_hz: f64) -> Self {
        Self {
            channels,
            policy,
            sample_rate_hz,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.channels.clone(),
            config.missing_channel_policy,
            config.sample_rate_hz,
        )
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Decode one payload. Never fails; problems come back as warnings.
    pub fn decode(&self, raw: RawPayload) -> Decoded<Sample> {
        let records = match split_records(raw) {
            Ok(records) => records,
            Err(warning) => return Decoded::rejected(warning),
        };

        let mut out = Decoded::empty();
        for (index, record) in records.iter().enumerate() {
            let Some(fields) = record.as_object() else {
                out.warnings.push(DecodeWarning::NotARecord { record: index });
                continue;
            };
            let Some(timestamp) = fields.get("timestamp").and_then(Value::as_f64) else {
                out.warnings.push(DecodeWarning::MissingTimestamp { record: index });
                continue;
            };

            match fields.get("values").and_then(Value::as_object) {
                Some(values) => self.decode_block(index, timestamp, values, &mut out),
                None => self.decode_point(index, timestamp, fields, &mut out),
            }
        }
        out
    }

    fn decode_point(
        &self,
        index: usize,
        timestamp: f64,
        fields: &Map<String, Value>,
        out: &mut Decoded<Sample>,
    ) {
        let mut sample = Sample::new(timestamp);
        let mut missing = Vec::new();

        for id in self.channels.iter() {
            match fields.get(id).and_then(Value::as_f64) {
                Some(value) => {
                    sample.channels.insert(id.to_string(), value);
                }
                None => missing.push(id.to_string()),
            }
        }

        if missing.is_empty() {
            out.records.push(sample);
            return;
        }

        // A record with a timestamp but no usable channel carries nothing to plot
        let dropped = !self.policy.keeps_partial() || sample.channels.is_empty();
        out.warnings.push(DecodeWarning::MissingChannels {
            record: index,
            channels: missing,
            dropped,
        });
        if !dropped {
            out.records.push(sample);
        }
    }

    fn decode_block(
        &self,
        index: usize,
        base: f64,
        values: &Map<String, Value>,
        out: &mut Decoded<Sample>,
    ) {
        let columns: Vec<Option<&Vec<Value>>> = self
            .channels
            .iter()
            .map(|id| values.get(id).and_then(Value::as_array))
            .collect();
        let length = columns.iter().flatten().map(|c| c.len()).max().unwrap_or(0);

        if length == 0 {
            out.warnings.push(DecodeWarning::MissingChannels {
                record: index,
                channels: self.channels.iter().map(str::to_string).collect(),
                dropped: true,
            });
            return;
        }

        let interval = 1.0 / self.sample_rate_hz;
        let mut missing: Vec<String> = Vec::new();
        let mut dropped = false;

        for i in 0..length {
            let mut sample = Sample::new(base + i as f64 * interval);
            let mut complete = true;

            for (id, column) in self.channels.iter().zip(&columns) {
                match column.and_then(|c| c.get(i)).and_then(Value::as_f64) {
                    Some(value) => {
                        sample.channels.insert(id.to_string(), value);
                    }
                    None => {
                        complete = false;
                        if !missing.iter().any(|m| m == id) {
                            missing.push(id.to_string());
                        }
                    }
                }
            }

            if complete || (self.policy.keeps_partial() && !sample.channels.is_empty()) {
                out.records.push(sample);
            } else {
                dropped = true;
            }
        }

        if !missing.is_empty() {
            out.warnings.push(DecodeWarning::MissingChannels {
                record: index,
                channels: missing,
                dropped,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoder(policy: MissingChannelPolicy) -> SampleDecoder {
        SampleDecoder::new(ChannelSet::new(["a", "b"]), policy, 4.0)
    }

    #[test]
    fn test_block_spacing_follows_sample_rate() {
        let payload = json!({"timestamp": 10.0, "values": {"a": [1.0, 2.0, 3.0], "b": [4.0, 5.0, 6.0]}});
        let decoded = decoder(MissingChannelPolicy::PartialAccept).decode(payload.into());

        let times: Vec<f64> = decoded.records.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![10.0, 10.25, 10.5]);
        assert!(decoded.warnings.is_empty());
    }

    #[test]
    fn test_short_block_column_is_partial() {
        let payload = json!({"timestamp": 0.0, "values": {"a": [1.0, 2.0], "b": [3.0]}});

        let partial = decoder(MissingChannelPolicy::PartialAccept).decode(payload.clone().into());
        assert_eq!(partial.records.len(), 2);
        assert_eq!(partial.records[1].get("b"), None);
        assert_eq!(partial.warnings.len(), 1);

        let strict = decoder(MissingChannelPolicy::DropSample).decode(payload.into());
        assert_eq!(strict.records.len(), 1);
        assert_eq!(strict.dropped(), 1);
    }

    #[test]
    fn test_non_numeric_channel_counts_as_missing() {
        let payload = json!({"timestamp": 1.0, "a": "high", "b": 2.0});
        let decoded = decoder(MissingChannelPolicy::PartialAccept).decode(payload.into());

        assert_eq!(decoded.records.len(), 1);
        assert_eq!(
            decoded.warnings,
            vec![DecodeWarning::MissingChannels {
                record: 0,
                channels: vec!["a".to_string()],
                dropped: false,
            }]
        );
    }
}
