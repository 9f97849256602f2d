use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::core::ChannelSet;
use crate::resilience::MissingChannelPolicy;

const MAX_REFRESH_HZ: f64 = 1000.0;

/// Session-wide settings, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Channel ids, in display order
    pub channels: ChannelSet,

    /// Points retained per series (600 = 3 s at 200 Hz)
    pub capacity: usize,

    /// Upper bound on chart redraws per second
    pub refresh_hz: f64,

    /// Spacing used to expand block records into samples
    pub sample_rate_hz: f64,

    pub missing_channel_policy: MissingChannelPolicy,

    /// Recent predictions kept for the timeline display
    pub history_len: usize,

    /// End the session when nothing arrives for this long
    pub idle_timeout_ms: Option<u64>,

    /// Inbound event queue depth between transport and session
    pub inbound_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channels: ChannelSet::default(),
            capacity: 600,
            refresh_hz: 60.0,
            sample_rate_hz: 200.0,
            missing_channel_policy: MissingChannelPolicy::default(),
            history_len: 20,
            idle_timeout_ms: None,
            inbound_capacity: 64,
        }
    }
}

impl PipelineConfig {
    /// Build from a JSON value; absent fields take their defaults
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(config)
            .context("Failed to parse pipeline config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .context(format!("Failed to read config from {:?}", path))?;
        let value: Value = serde_json::from_str(&json)
            .context(format!("Config at {:?} is not valid JSON", path))?;
        Self::from_json(value)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize pipeline config")?;
        fs::write(path, json)
            .context(format!("Failed to write config to {:?}", path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            bail!("At least one channel is required");
        }
        if let Some(id) = self.channels.first_duplicate() {
            return Err(anyhow!("Duplicate channel id: {}", id));
        }
        if self.capacity == 0 {
            bail!("Window capacity must be greater than zero");
        }
        if !(self.refresh_hz.is_finite() && self.refresh_hz > 0.0 && self.refresh_hz <= MAX_REFRESH_HZ) {
            bail!("refresh_hz must be in (0, {}], got {}", MAX_REFRESH_HZ, self.refresh_hz);
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            bail!("sample_rate_hz must be a positive number, got {}", self.sample_rate_hz);
        }
        if self.history_len == 0 {
            bail!("history_len must be greater than zero");
        }
        if self.inbound_capacity == 0 {
            bail!("inbound_capacity must be greater than zero");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_hz)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_refresh_interval() {
        let config = PipelineConfig {
            refresh_hz: 50.0,
            ..Default::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_millis(20));
    }
}
