use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use serde::Serialize;

/// Counters for one session, shared between the session and its scheduler
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    samples_appended: AtomicU64,
    records_dropped: AtomicU64,
    decode_warnings: AtomicU64,
    renders_requested: AtomicU64,
    frames_scheduled: AtomicU64,
    draws_issued: AtomicU64,
    draw_failures: AtomicU64,
    draws_suppressed: AtomicU64,
    events_discarded: AtomicU64,
    predictions_observed: AtomicU64,
    unknown_labels: AtomicU64,
    total_draw_latency_us: AtomicU64,
    draw_latency_samples: AtomicU64,
}

/// Point-in-time copy of [`PipelineMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub samples_appended: u64,
    pub records_dropped: u64,
    pub decode_warnings: u64,
    pub renders_requested: u64,
    pub frames_scheduled: u64,
    pub draws_issued: u64,
    pub draw_failures: u64,
    pub draws_suppressed: u64,
    pub events_discarded: u64,
    pub predictions_observed: u64,
    pub unknown_labels: u64,
    pub avg_draw_latency_us: u64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_samples(&self, count: usize) {
        self.samples_appended.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_decode(&self, warnings: usize, dropped: usize) {
        self.decode_warnings.fetch_add(warnings as u64, Ordering::Relaxed);
        self.records_dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// `scheduled` is true when the request armed a new frame callback
    pub fn record_render_request(&self, scheduled: bool) {
        self.renders_requested.fetch_add(1, Ordering::Relaxed);
        if scheduled {
            self.frames_scheduled.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_draw_failure(&self) {
        self.draw_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_draw_suppressed(&self) {
        self.draws_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_discarded(&self) {
        self.events_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction(&self, recognized: bool) {
        self.predictions_observed.fetch_add(1, Ordering::Relaxed);
        if !recognized {
            self.unknown_labels.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn start_draw(&self) -> Instant {
        Instant::now()
    }

    pub fn finish_draw(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.draws_issued.fetch_add(1, Ordering::Relaxed);
        self.total_draw_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.draw_latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn samples_appended(&self) -> u64 {
        self.samples_appended.load(Ordering::Relaxed)
    }

    pub fn draws_issued(&self) -> u64 {
        self.draws_issued.load(Ordering::Relaxed)
    }

    pub fn frames_scheduled(&self) -> u64 {
        self.frames_scheduled.load(Ordering::Relaxed)
    }

    pub fn events_discarded(&self) -> u64 {
        self.events_discarded.load(Ordering::Relaxed)
    }

    pub fn avg_draw_latency_us(&self) -> u64 {
        let samples = self.draw_latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_draw_latency_us.load(Ordering::Relaxed) / samples
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_appended: self.samples_appended(),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            decode_warnings: self.decode_warnings.load(Ordering::Relaxed),
            renders_requested: self.renders_requested.load(Ordering::Relaxed),
            frames_scheduled: self.frames_scheduled(),
            draws_issued: self.draws_issued(),
            draw_failures: self.draw_failures.load(Ordering::Relaxed),
            draws_suppressed: self.draws_suppressed.load(Ordering::Relaxed),
            events_discarded: self.events_discarded(),
            predictions_observed: self.predictions_observed.load(Ordering::Relaxed),
            unknown_labels: self.unknown_labels.load(Ordering::Relaxed),
            avg_draw_latency_us: self.avg_draw_latency_us(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_requests_vs_frames() {
        let metrics = PipelineMetrics::new();
        metrics.record_render_request(true);
        metrics.record_render_request(false);
        metrics.record_render_request(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.renders_requested, 3);
        assert_eq!(snapshot.frames_scheduled, 1);
    }

    #[test]
    fn test_avg_latency_without_draws() {
        assert_eq!(PipelineMetrics::new().avg_draw_latency_us(), 0);
    }
}
