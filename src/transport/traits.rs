use anyhow::Result;
use async_trait::async_trait;
use crate::core::RawPayload;

pub const EEG_DATA_EVENT: &str = "eeg_data";
pub const OUTPUT_DATA_EVENT: &str = "output_data";
pub const CONNECT_EVENT: &str = "connect";
pub const DISCONNECT_EVENT: &str = "disconnect";

/// Named event pushed by the producer
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub name: String,
    pub payload: RawPayload,
}

impl InboundEvent {
    pub fn new(name: impl Into<String>, payload: impl Into<RawPayload>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    pub fn eeg_data(payload: impl Into<RawPayload>) -> Self {
        Self::new(EEG_DATA_EVENT, payload)
    }

    pub fn output_data(payload: impl Into<RawPayload>) -> Self {
        Self::new(OUTPUT_DATA_EVENT, payload)
    }

    pub fn connect() -> Self {
        Self::new(CONNECT_EVENT, RawPayload::empty())
    }

    pub fn disconnect() -> Self {
        Self::new(DISCONNECT_EVENT, RawPayload::empty())
    }
}

/// Command sent back toward the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Ask the producer to halt the EEG stream
    StopEeg,
}

impl ControlCommand {
    pub fn event_name(&self) -> &'static str {
        match self {
            ControlCommand::StopEeg => "stop_eeg",
        }
    }
}

/// Bidirectional event channel to the analysis backend
#[async_trait]
pub trait StreamTransport: Send {
    async fn connect(&mut self) -> Result<()>;

    /// Next inbound event, or `None` once the channel is closed
    async fn next_event(&mut self) -> Option<InboundEvent>;

    async fn emit(&mut self, command: ControlCommand) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;
}
