pub mod chart;
pub mod payload;
pub mod prediction;
pub mod sample;

pub use chart::{ChartOption, ChartSink, SeriesData};
pub use payload::RawPayload;
pub use prediction::{Category, Confidences, Label, PredictionRecord};
pub use sample::{ChannelSet, Sample, DEFAULT_CHANNELS};
