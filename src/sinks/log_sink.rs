use std::sync::atomic::{AtomicU64, Ordering};
use anyhow::Result;
use log::{debug, info};
use crate::core::{ChartOption, ChartSink};

/// Sink that logs a one-line summary per draw, plus per-series statistics
/// at debug level
pub struct LogSink {
    label: String,
    every: u64,
    draws: AtomicU64,
}

impl LogSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            every: 1,
            draws: AtomicU64::new(0),
        }
    }

    /// Only log every `every`-th draw
    pub fn with_interval(mut self, every: u64) -> Self {
        self.every = every.max(1);
        self
    }

    pub fn draw_count(&self) -> u64 {
        self.draws.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SeriesStats {
    pub present: usize,
    pub mean: f64,
    pub rms: f64,
}

pub(crate) fn series_stats(data: &[Option<f64>]) -> Option<SeriesStats> {
    let values: Vec<f64> = data.iter().flatten().copied().collect();
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let rms = (values.iter().map(|x| x * x).sum::<f64>() / n).sqrt();
    Some(SeriesStats {
        present: values.len(),
        mean,
        rms,
    })
}

impl ChartSink for LogSink {
    fn draw(&self, option: &ChartOption) -> Result<()> {
        let n = self.draws.fetch_add(1, Ordering::Relaxed) + 1;
        if n % self.every != 0 {
            return Ok(());
        }

        let span_ms = match (option.x_axis.first(), option.x_axis.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        info!("[{}] Draw #{}: {} points over {:.0}ms", self.label, n, option.len(), span_ms);

        for series in &option.series {
            match series_stats(&series.data) {
                Some(stats) => debug!(
                    "  {}: len={}, present={}, mean={:.4}, rms={:.4}",
                    series.name,
                    series.data.len(),
                    stats.present,
                    stats.mean,
                    stats.rms
                ),
                None => debug!("  {}: empty", series.name),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SeriesData;

    #[test]
    fn test_series_stats_skip_gaps() {
        let stats = series_stats(&[Some(3.0), None, Some(-3.0)]).unwrap();
        assert_eq!(stats.present, 2);
        assert_eq!(stats.mean, 0.0);
        assert!((stats.rms - 3.0).abs() < 1e-12);

        assert!(series_stats(&[None, None]).is_none());
    }

    #[test]
    fn test_log_sink_counts_draws() {
        let sink = LogSink::new("eeg").with_interval(2);
        let option = ChartOption {
            x_axis: vec![1000.0, 1005.0],
            series: vec![SeriesData {
                name: "ch1 - AF7".to_string(),
                data: vec![Some(1.0), Some(2.0)],
            }],
        };

        for _ in 0..3 {
            sink.draw(&option).unwrap();
        }
        assert_eq!(sink.draw_count(), 3);
    }
}
