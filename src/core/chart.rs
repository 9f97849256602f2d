use anyhow::Result;
use serde::Serialize;

/// One named line in a chart projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub name: String,

    /// Parallel to `ChartOption::x_axis`; `None` renders as a gap
    pub data: Vec<Option<f64>>,
}

/// Full declarative description handed to a chart on every draw
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartOption {
    /// Sample times in milliseconds since epoch
    pub x_axis: Vec<f64>,
    pub series: Vec<SeriesData>,
}

impl ChartOption {
    pub fn len(&self) -> usize {
        self.x_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_axis.is_empty()
    }

    pub fn series(&self, name: &str) -> Option<&SeriesData> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Consumer that redraws from a complete projection.
///
/// The pipeline only ever invokes `draw`; a sink's lifetime is owned by
/// whatever UI container created it.
pub trait ChartSink: Send + Sync {
    fn draw(&self, option: &ChartOption) -> Result<()>;
}
