use eegstream::core::{ChannelSet, RawPayload};
use eegstream::decode::{DecodeWarning, SampleDecoder};
use eegstream::resilience::MissingChannelPolicy;
use eegstream::PipelineConfig;
use serde_json::json;

fn default_decoder() -> SampleDecoder {
    SampleDecoder::from_config(&PipelineConfig::default())
}

#[test]
fn test_unparseable_text_yields_one_warning() {
    let decoded = default_decoder().decode(RawPayload::from("{not json"));

    assert!(decoded.records.is_empty());
    assert_eq!(decoded.warnings.len(), 1);
    assert!(matches!(decoded.warnings[0], DecodeWarning::Unparseable { .. }));
}

#[test]
fn test_string_encoded_batch_preserves_order_and_values() {
    let records: Vec<_> = (0..25)
        .map(|i| {
            json!({
                "timestamp": 1_700_000_000.0 + i as f64 * 0.125,
                "ch1 - AF7": i as f64,
                "ch2 - AF8": -(i as f64),
                "ch3 - TP9": 0.5 * i as f64,
                "ch4 - TP10": 0.25 * i as f64,
            })
        })
        .collect();
    let text = serde_json::to_string(&records).unwrap();

    let decoded = default_decoder().decode(text.into());
    assert!(decoded.warnings.is_empty());
    assert_eq!(decoded.records.len(), 25);

    for (i, sample) in decoded.records.iter().enumerate() {
        assert_eq!(sample.timestamp, records[i]["timestamp"].as_f64().unwrap());
        assert_eq!(sample.get("ch1 - AF7"), Some(i as f64));
        assert_eq!(sample.get("ch2 - AF8"), Some(-(i as f64)));
        assert_eq!(sample.get("ch4 - TP10"), Some(0.25 * i as f64));
    }
}

/// Deterministic xorshift sweep over [-100, 100) with full 53-bit mantissas
fn readings(count: usize) -> Vec<f64> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut out = vec![96.30610995312617, -0.1, 1e-7 + 0.3];
    while out.len() < count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push((state >> 11) as f64 / (1u64 << 53) as f64 * 200.0 - 100.0);
    }
    out
}

#[test]
fn test_string_encoded_readings_are_bit_identical() {
    let values = readings(5000);
    let channels = ["ch1 - AF7", "ch2 - AF8", "ch3 - TP9", "ch4 - TP10"];
    let records: Vec<_> = values
        .chunks(4)
        .enumerate()
        .map(|(i, chunk)| {
            let mut record = serde_json::Map::new();
            record.insert("timestamp".into(), json!(1_700_000_000.0 + i as f64 * 0.005));
            for (id, v) in channels.iter().zip(chunk.iter().cycle()) {
                record.insert(id.to_string(), json!(*v));
            }
            serde_json::Value::Object(record)
        })
        .collect();
    let text = serde_json::to_string(&records).unwrap();

    let decoded = default_decoder().decode(text.into());
    assert!(decoded.warnings.is_empty());
    assert_eq!(decoded.records.len(), records.len());

    for (sample, record) in decoded.records.iter().zip(&records) {
        assert_eq!(
            sample.timestamp.to_bits(),
            record["timestamp"].as_f64().unwrap().to_bits()
        );
        for id in channels {
            assert_eq!(
                sample.get(id).unwrap().to_bits(),
                record[id].as_f64().unwrap().to_bits(),
                "{} in {}",
                id,
                record
            );
        }
    }
}

#[test]
fn test_single_point_record() {
    let payload = json!({
        "timestamp": 12.5,
        "ch1 - AF7": 1.0,
        "ch2 - AF8": 2.0,
        "ch3 - TP9": 3.0,
        "ch4 - TP10": 4.0,
    });
    let decoded = default_decoder().decode(payload.into());

    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.records[0].timestamp, 12.5);
    assert_eq!(decoded.records[0].get("ch3 - TP9"), Some(3.0));
}

#[test]
fn test_missing_timestamp_skips_only_that_record() {
    let payload = json!([
        {"a": 1.0},
        {"timestamp": 2.0, "a": 2.0},
        "noise",
    ]);
    let decoder = SampleDecoder::new(ChannelSet::new(["a"]), MissingChannelPolicy::PartialAccept, 200.0);
    let decoded = decoder.decode(payload.into());

    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.records[0].timestamp, 2.0);
    assert_eq!(
        decoded.warnings,
        vec![
            DecodeWarning::MissingTimestamp { record: 0 },
            DecodeWarning::NotARecord { record: 2 },
        ]
    );
    assert_eq!(decoded.dropped(), 2);
}

#[test]
fn test_missing_channel_policies() {
    let payload = json!({"timestamp": 1.0, "a": 1.0});
    let channels = ChannelSet::new(["a", "b"]);

    let partial = SampleDecoder::new(channels.clone(), MissingChannelPolicy::PartialAccept, 200.0)
        .decode(payload.clone().into());
    assert_eq!(partial.records.len(), 1);
    assert_eq!(partial.records[0].get("b"), None);
    assert_eq!(
        partial.warnings,
        vec![DecodeWarning::MissingChannels {
            record: 0,
            channels: vec!["b".to_string()],
            dropped: false,
        }]
    );

    let strict = SampleDecoder::new(channels, MissingChannelPolicy::DropSample, 200.0)
        .decode(payload.into());
    assert!(strict.records.is_empty());
    assert_eq!(strict.dropped(), 1);
}

#[test]
fn test_block_record_expands_at_sample_rate() {
    let column: Vec<f64> = (0..200).map(|i| i as f64).collect();
    let payload = json!({
        "timestamp": 100.0,
        "values": {
            "ch1 - AF7": column,
            "ch2 - AF8": column,
            "ch3 - TP9": column,
            "ch4 - TP10": column,
        }
    });
    let decoded = default_decoder().decode(payload.into());

    assert!(decoded.warnings.is_empty());
    assert_eq!(decoded.records.len(), 200);
    assert_eq!(decoded.records[0].timestamp, 100.0);
    assert!((decoded.records[199].timestamp - (100.0 + 199.0 / 200.0)).abs() < 1e-9);
    assert_eq!(decoded.records[42].get("ch2 - AF8"), Some(42.0));
}

#[test]
fn test_scalar_payload_is_unexpected_shape() {
    let decoded = default_decoder().decode(json!(42).into());
    assert!(decoded.records.is_empty());
    assert!(matches!(decoded.warnings[0], DecodeWarning::UnexpectedShape { .. }));
}
