use std::sync::{Arc, Weak};
use log::{debug, warn};
use crate::core::ChartSink;
use crate::observability::PipelineMetrics;
use crate::visualization::SeriesWindow;

/// Coalescing state: at most one frame callback is ever outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Pending,
}

/// Answer to a render request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// The host must arm one frame callback
    Schedule,
    /// A callback is already armed; nothing to do
    AlreadyPending,
}

/// What a frame callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    /// Nothing changed since the last draw
    Idle,
    /// The sink was dropped by its owner
    SinkGone,
    Failed,
}

/// Rate-limits chart draws to one per refresh.
///
/// Any number of `request_render` calls between two frames collapse into a
/// single `draw` of the full window on the next `on_frame`.
pub struct RenderScheduler {
    state: RenderState,
    sink: Weak<dyn ChartSink>,
    metrics: Arc<PipelineMetrics>,
}

impl RenderScheduler {
    pub fn new(sink: &Arc<dyn ChartSink>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            state: RenderState::Idle,
            sink: Arc::downgrade(sink),
            metrics,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == RenderState::Pending
    }

    pub fn request_render(&mut self) -> FrameRequest {
        let request = match self.state {
            RenderState::Idle => {
                self.state = RenderState::Pending;
                FrameRequest::Schedule
            }
            RenderState::Pending => FrameRequest::AlreadyPending,
        };
        self.metrics.record_render_request(request == FrameRequest::Schedule);
        request
    }

    /// Frame callback from the host; draws once if a render is pending
    pub fn on_frame(&mut self, window: &SeriesWindow) -> FrameOutcome {
        if self.state == RenderState::Idle {
            return FrameOutcome::Idle;
        }
        self.state = RenderState::Idle;

        let Some(sink) = self.sink.upgrade() else {
            debug!("Chart sink dropped, skipping draw");
            self.metrics.record_draw_suppressed();
            return FrameOutcome::SinkGone;
        };

        let option = window.projection();
        let start = self.metrics.start_draw();
        match sink.draw(&option) {
            Ok(()) => {
                self.metrics.finish_draw(start);
                FrameOutcome::Drawn
            }
            Err(e) => {
                warn!("Chart draw failed: {:#}", e);
                self.metrics.record_draw_failure();
                FrameOutcome::Failed
            }
        }
    }

    /// Drop a pending render without drawing. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        if was_pending {
            self.metrics.record_draw_suppressed();
        }
        self.state = RenderState::Idle;
        was_pending
    }
}
