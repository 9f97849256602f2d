use std::sync::Arc;
use super::{MetricsSnapshot, PipelineMetrics};

/// Human-readable view over a session's metrics
#[derive(Clone)]
pub struct SessionMonitor {
    metrics: Arc<PipelineMetrics>,
}

impl SessionMonitor {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn generate_report(&self) -> String {
        let m = self.metrics.snapshot();

        let mut report = String::from("=== Session Metrics ===\n");
        report.push_str(&format!(
            "\n[ingest]\n  Samples: {} appended\n  Dropped: {} record{}\n  Warnings: {}\n  Discarded events: {}\n",
            m.samples_appended,
            m.records_dropped,
            if m.records_dropped == 1 { "" } else { "s" },
            m.decode_warnings,
            m.events_discarded,
        ));
        report.push_str(&format!(
            "\n[render]\n  Requests: {} ({} frames scheduled)\n  Draws: {} draws issued\n  Failures: {}\n  Suppressed: {}\n  Avg Latency: {}μs\n",
            m.renders_requested,
            m.frames_scheduled,
            m.draws_issued,
            m.draw_failures,
            m.draws_suppressed,
            m.avg_draw_latency_us,
        ));
        report.push_str(&format!(
            "\n[classification]\n  Predictions: {}\n  Unknown labels: {}\n",
            m.predictions_observed, m.unknown_labels,
        ));

        report
    }
}
