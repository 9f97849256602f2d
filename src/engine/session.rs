use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::{sleep_until, Instant};

use crate::config::PipelineConfig;
use crate::core::{ChartSink, RawPayload};
use crate::decode::{DecodeWarning, PredictionDecoder, SampleDecoder};
use crate::engine::aggregator::{ClassificationAggregator, ClassificationTally};
use crate::engine::scheduler::{FrameOutcome, FrameRequest, RenderScheduler};
use crate::engine::state::{EndReason, SessionState};
use crate::observability::{MetricsSnapshot, PipelineMetrics, SessionMonitor};
use crate::transport::{
    ControlCommand, InboundEvent, StreamTransport,
    CONNECT_EVENT, DISCONNECT_EVENT, EEG_DATA_EVENT, OUTPUT_DATA_EVENT,
};
use crate::visualization::SeriesWindow;

/// What `Session::handle_event` did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Samples {
        accepted: usize,
        /// Render request issued for the batch; `None` when nothing was appended
        frame: Option<FrameRequest>,
    },
    Predictions {
        observed: usize,
        counted: usize,
    },
    Connected,
    Disconnected,
    /// Event name the pipeline does not consume
    Ignored,
    /// Arrived after the session stopped streaming
    Discarded,
}

/// Retrospective produced when a session ends
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub reason: EndReason,
    pub duration: Duration,
    /// Points held by the window when the session ended
    pub window_len: usize,
    pub tally: ClassificationTally,
    pub metrics: MetricsSnapshot,
}

/// Cloneable remote control for a running session
#[derive(Clone)]
pub struct SessionHandle {
    shutdown_tx: broadcast::Sender<()>,
}

impl SessionHandle {
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// One start-to-stop capture interval.
///
/// Owns the transport, the series window, the classification aggregator and
/// the render scheduler; nothing here is shared with other sessions.
pub struct Session {
    transport: Box<dyn StreamTransport>,
    config: PipelineConfig,
    state: SessionState,
    sample_decoder: SampleDecoder,
    prediction_decoder: PredictionDecoder,
    window: SeriesWindow,
    aggregator: ClassificationAggregator,
    scheduler: RenderScheduler,
    metrics: Arc<PipelineMetrics>,
    started_at: Instant,
    last_event_at: Instant,
    frame_deadline: Option<Instant>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
    summary: Option<SessionSummary>,
}

impl Session {
    /// Connect the transport and set up fresh per-session state
    pub async fn start(
        transport: Box<dyn StreamTransport>,
        config: PipelineConfig,
        sink: &Arc<dyn ChartSink>,
    ) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(PipelineMetrics::new());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(4);
        let now = Instant::now();

        let mut session = Self {
            transport,
            sample_decoder: SampleDecoder::from_config(&config),
            prediction_decoder: PredictionDecoder::new(),
            window: SeriesWindow::new(config.channels.clone(), config.capacity),
            aggregator: ClassificationAggregator::new(config.history_len),
            scheduler: RenderScheduler::new(sink, metrics.clone()),
            metrics,
            config,
            state: SessionState::Idle,
            started_at: now,
            last_event_at: now,
            frame_deadline: None,
            shutdown_tx,
            shutdown_rx,
            summary: None,
        };

        session.transition_to(SessionState::Connecting)?;
        session
            .transport
            .connect()
            .await
            .context("Failed to connect stream transport")?;
        session.transition_to(SessionState::Streaming {
            started_at: Some(std::time::Instant::now()),
        })?;

        session.started_at = Instant::now();
        session.last_event_at = session.started_at;
        info!(
            "Session started: {} channels, window of {} points, {} Hz refresh",
            session.config.channels.len(),
            session.config.capacity,
            session.config.refresh_hz
        );
        Ok(session)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn window(&self) -> &SeriesWindow {
        &self.window
    }

    pub fn aggregator(&self) -> &ClassificationAggregator {
        &self.aggregator
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn monitor(&self) -> SessionMonitor {
        SessionMonitor::new(self.metrics.clone())
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }

    /// When the armed frame callback is due, if one is armed
    pub fn frame_deadline(&self) -> Option<Instant> {
        self.frame_deadline
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    fn transition_to(&mut self, new_state: SessionState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(anyhow!(
                "Invalid session transition: {} -> {}",
                self.state.name(),
                new_state.name()
            ));
        }
        self.state = new_state;
        Ok(())
    }

    /// Apply one inbound event. Per-record problems are logged and skipped;
    /// nothing here can fail the session.
    pub fn handle_event(&mut self, event: InboundEvent) -> EventOutcome {
        if !self.state.is_streaming() {
            debug!("Discarding {} event, session is {}", event.name, self.state.name());
            self.metrics.record_event_discarded();
            return EventOutcome::Discarded;
        }
        self.last_event_at = Instant::now();

        match event.name.as_str() {
            EEG_DATA_EVENT => self.ingest_samples(event.payload),
            OUTPUT_DATA_EVENT => self.ingest_predictions(event.payload),
            CONNECT_EVENT => {
                info!("Producer connected");
                EventOutcome::Connected
            }
            DISCONNECT_EVENT => {
                warn!("Producer disconnected mid-session");
                if let Err(e) = self.finish(EndReason::TransportLost) {
                    warn!("{:#}", e);
                }
                EventOutcome::Disconnected
            }
            other => {
                debug!("Ignoring unhandled event {:?}", other);
                EventOutcome::Ignored
            }
        }
    }

    fn ingest_samples(&mut self, payload: RawPayload) -> EventOutcome {
        let decoded = self.sample_decoder.decode(payload);
        self.log_warnings(EEG_DATA_EVENT, &decoded.warnings);
        self.metrics.record_decode(decoded.warnings.len(), decoded.dropped());

        let accepted = self.window.append_batch(&decoded.records);
        self.metrics.record_samples(accepted);

        let frame = (accepted > 0).then(|| self.request_render());
        EventOutcome::Samples { accepted, frame }
    }

    fn ingest_predictions(&mut self, payload: RawPayload) -> EventOutcome {
        let decoded = self.prediction_decoder.decode(payload);
        self.log_warnings(OUTPUT_DATA_EVENT, &decoded.warnings);
        self.metrics.record_decode(decoded.warnings.len(), decoded.dropped());

        let mut counted = 0;
        for record in &decoded.records {
            let category = self.aggregator.observe(record);
            self.metrics.record_prediction(category.is_some());
            if category.is_some() {
                counted += 1;
            }
        }
        EventOutcome::Predictions {
            observed: decoded.records.len(),
            counted,
        }
    }

    fn log_warnings(&self, event: &str, warnings: &[DecodeWarning]) {
        for warning in warnings {
            warn!("{}: {}", event, warning);
        }
    }

    fn request_render(&mut self) -> FrameRequest {
        let request = self.scheduler.request_render();
        if request == FrameRequest::Schedule {
            self.frame_deadline = Some(self.next_refresh());
        }
        request
    }

    /// First refresh boundary after now, on a grid anchored at session start
    fn next_refresh(&self) -> Instant {
        let interval = self.config.refresh_interval().as_nanos().max(1);
        let elapsed = self.started_at.elapsed().as_nanos();
        let ticks = elapsed / interval + 1;
        self.started_at + Duration::from_nanos((ticks * interval) as u64)
    }

    /// Frame callback; draws the window if a render is pending
    pub fn on_frame(&mut self) -> FrameOutcome {
        self.frame_deadline = None;
        self.scheduler.on_frame(&self.window)
    }

    /// Ask the producer to stop, then tear the session down.
    ///
    /// `stop_eeg` goes out before the transport closes. Idempotent: later
    /// calls return the first summary.
    pub async fn stop(&mut self) -> Result<SessionSummary> {
        self.stop_with(EndReason::Stopped).await
    }

    async fn stop_with(&mut self, reason: EndReason) -> Result<SessionSummary> {
        // Already ended, e.g. by a `disconnect` event fed to `handle_event`
        if self.summary.is_some() {
            return self.close_ended().await;
        }

        if let Err(e) = self.transport.emit(ControlCommand::StopEeg).await {
            warn!("Failed to send {}: {:#}", ControlCommand::StopEeg.event_name(), e);
        }
        self.transition_to(SessionState::Stopping)?;

        let summary = self.finish(reason)?;
        self.window.reset();
        self.aggregator.reset();

        if let Err(e) = self.transport.disconnect().await {
            warn!("Failed to disconnect transport: {:#}", e);
        }
        Ok(summary)
    }

    /// Mark the session ended. A pending render is cancelled, never drawn.
    fn finish(&mut self, reason: EndReason) -> Result<SessionSummary> {
        if self.scheduler.cancel() {
            debug!("Cancelled pending render at session end");
        }
        self.frame_deadline = None;
        self.transition_to(SessionState::Ended { reason })?;

        let summary = SessionSummary {
            reason,
            duration: self.started_at.elapsed(),
            window_len: self.window.len(),
            tally: self.aggregator.tally().clone(),
            metrics: self.metrics.snapshot(),
        };
        info!(
            "Session ended ({:?}) after {:.1}s: {} samples, {} draws, {} predictions",
            reason,
            summary.duration.as_secs_f64(),
            summary.metrics.samples_appended,
            summary.metrics.draws_issued,
            summary.metrics.predictions_observed
        );
        self.summary = Some(summary.clone());
        Ok(summary)
    }

    fn idle_deadline(&self) -> Option<Instant> {
        self.config.idle_timeout().map(|timeout| self.last_event_at + timeout)
    }

    /// Drive the session until it is stopped, the transport goes away, or
    /// the idle timeout fires.
    pub async fn run(mut self) -> Result<SessionSummary> {
        if self.summary.is_some() {
            return self.close_ended().await;
        }

        loop {
            let frame_deadline = self.frame_deadline;
            let idle_deadline = self.idle_deadline();

            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    return self.stop().await;
                }
                _ = sleep_until_some(frame_deadline) => {
                    self.on_frame();
                }
                _ = sleep_until_some(idle_deadline) => {
                    warn!("No events within {:?}, ending session", self.config.idle_timeout());
                    return self.stop_with(EndReason::IdleTimeout).await;
                }
                event = self.transport.next_event() => match event {
                    Some(event) => {
                        if self.handle_event(event) == EventOutcome::Disconnected {
                            return self.close_ended().await;
                        }
                    }
                    None => {
                        warn!("Transport closed mid-session");
                        self.finish(EndReason::TransportLost)?;
                        return self.close_ended().await;
                    }
                },
            }
        }
    }

    /// Release the transport of an ended session and return its summary
    async fn close_ended(&mut self) -> Result<SessionSummary> {
        if self.transport.is_connected() {
            if let Err(e) = self.transport.disconnect().await {
                debug!("Transport already gone: {:#}", e);
            }
        }
        self.summary
            .clone()
            .ok_or_else(|| anyhow!("Session ended without a summary"))
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
