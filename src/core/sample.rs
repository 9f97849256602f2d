use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Channel layout of the four-electrode headband the backend streams from
pub const DEFAULT_CHANNELS: [&str; 4] = ["ch1 - AF7", "ch2 - AF8", "ch3 - TP9", "ch4 - TP10"];

/// One instant of multi-channel measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since epoch, as supplied by the producer
    pub timestamp: f64,

    /// Readings keyed by channel id
    pub channels: HashMap<String, f64>,
}

impl Sample {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            channels: HashMap::new(),
        }
    }

    pub fn with_channel(mut self, id: impl Into<String>, value: f64) -> Self {
        self.channels.insert(id.into(), value);
        self
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.channels.get(id).copied()
    }
}

/// Ordered channel identifiers shared by the decoder and the series window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelSet(Vec<String>);

impl ChannelSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|c| c == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|c| c == id)
    }

    /// First id that appears more than once, if any
    pub fn first_duplicate(&self) -> Option<&str> {
        self.0
            .iter()
            .enumerate()
            .find(|(i, id)| self.0[..*i].contains(id))
            .map(|(_, id)| id.as_str())
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_order() {
        let set = ChannelSet::default();
        assert_eq!(set.len(), 4);
        assert_eq!(set.index_of("ch3 - TP9"), Some(2));
        assert!(set.first_duplicate().is_none());
    }

    #[test]
    fn test_duplicate_detection() {
        let set = ChannelSet::new(["a", "b", "a"]);
        assert_eq!(set.first_duplicate(), Some("a"));
    }
}
