use std::f64::consts::PI;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::{Category, ChannelSet, RawPayload};
use crate::transport::{InboundEvent, ProducerEnd};

/// Settings for the synthetic producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub channels: ChannelSet,
    pub sample_rate_hz: f64,
    /// Readings per channel in each block record
    pub block_size: usize,
    pub block_interval_ms: u64,
    /// Emit one prediction after every `predict_every` blocks; 0 disables
    pub predict_every: u64,
    pub amplitude: f64,
    pub base_frequency_hz: f64,
    /// Timestamp of the first reading; wall clock when unset
    pub start_timestamp: Option<f64>,
    /// Stop and send `disconnect` after this many blocks
    pub max_blocks: Option<u64>,
    /// Send payloads as JSON text instead of structured values
    pub as_text: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            channels: ChannelSet::default(),
            sample_rate_hz: 200.0,
            block_size: 200,
            block_interval_ms: 1000,
            predict_every: 2,
            amplitude: 100.0,
            base_frequency_hz: 10.0,
            start_timestamp: None,
            max_blocks: None,
            as_text: false,
        }
    }
}

/// Producer thread standing in for the acquisition backend.
///
/// Streams block records of per-channel sine waves and a repeating
/// good/good/neutral/bad prediction cycle until the session sends
/// `stop_eeg` or hangs up.
pub struct SimulatedBackend {
    config: BackendConfig,
}

impl SimulatedBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Run the producer on its own thread. The handle yields the number of
    /// blocks delivered.
    pub fn spawn(self, producer: ProducerEnd) -> JoinHandle<u64> {
        thread::spawn(move || self.run(producer))
    }

    fn run(self, producer: ProducerEnd) -> u64 {
        let start = self.config.start_timestamp.unwrap_or_else(now_secs);
        let interval = Duration::from_millis(self.config.block_interval_ms);
        let mut sent = 0u64;

        if !producer.send_blocking(InboundEvent::connect()) {
            return 0;
        }
        info!("Simulated backend streaming {} channels", self.config.channels.len());

        loop {
            if producer.stop_requested() {
                info!("Simulated backend received stop after {} blocks", sent);
                return sent;
            }
            if self.config.max_blocks.is_some_and(|max| sent >= max) {
                producer.send_blocking(InboundEvent::disconnect());
                debug!("Simulated backend finished {} blocks", sent);
                return sent;
            }

            let block = self.block(sent, start);
            if !producer.send_blocking(InboundEvent::eeg_data(self.encode(block))) {
                debug!("Session hung up, simulated backend exiting");
                return sent;
            }
            sent += 1;

            if self.config.predict_every > 0 && sent % self.config.predict_every == 0 {
                let prediction = json!([prediction(sent / self.config.predict_every - 1)]);
                if !producer.send_blocking(InboundEvent::output_data(self.encode(prediction))) {
                    return sent;
                }
            }

            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
    }

    fn encode(&self, value: Value) -> RawPayload {
        if self.config.as_text {
            RawPayload::Text(value.to_string())
        } else {
            RawPayload::Json(value)
        }
    }

    /// Block record `n`: one column per channel, each a sine at a slightly
    /// different frequency
    pub fn block(&self, n: u64, start: f64) -> Value {
        let cfg = &self.config;
        let first_index = n * cfg.block_size as u64;
        let timestamp = start + first_index as f64 / cfg.sample_rate_hz;

        let mut values = Map::new();
        for (c, id) in cfg.channels.iter().enumerate() {
            let frequency = cfg.base_frequency_hz * (1.0 + 0.25 * c as f64);
            let column: Vec<f64> = (0..cfg.block_size as u64)
                .map(|i| {
                    let t = (first_index + i) as f64 / cfg.sample_rate_hz;
                    cfg.amplitude * (2.0 * PI * frequency * t).sin()
                })
                .collect();
            values.insert(id.to_string(), json!(column));
        }

        json!({ "timestamp": timestamp, "values": values })
    }
}

/// Prediction record `n` of the repeating cycle
pub fn prediction(n: u64) -> Value {
    const CYCLE: [Category; 4] = [Category::Good, Category::Good, Category::Neutral, Category::Bad];
    let category = CYCLE[(n % CYCLE.len() as u64) as usize];

    let mut confidences = [0.15, 0.15, 0.15];
    confidences[category.index()] = 0.7;
    json!({
        "prediction": category.label(),
        "good": confidences[0],
        "neutral": confidences[1],
        "bad": confidences[2],
        "index": n,
    })
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
