use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tokio::sync::mpsc;
use super::{ControlCommand, InboundEvent, StreamTransport};

/// In-process transport: events arrive over a bounded tokio channel and
/// control commands leave over a crossbeam channel, so the producer side
/// can live on a plain OS thread.
pub struct ChannelTransport {
    inbound: mpsc::Receiver<InboundEvent>,
    outbound: Sender<ControlCommand>,
    connected: bool,
}

/// Producer half of a [`ChannelTransport`]
pub struct ProducerEnd {
    events: mpsc::Sender<InboundEvent>,
    commands: Receiver<ControlCommand>,
}

/// Create a connected pair with room for `capacity` queued events
pub fn channel_transport(capacity: usize) -> (ChannelTransport, ProducerEnd) {
    let (event_tx, event_rx) = mpsc::channel(capacity);
    let (command_tx, command_rx) = crossbeam_channel::unbounded();

    (
        ChannelTransport {
            inbound: event_rx,
            outbound: command_tx,
            connected: false,
        },
        ProducerEnd {
            events: event_tx,
            commands: command_rx,
        },
    )
}

#[async_trait]
impl StreamTransport for ChannelTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.connected {
            bail!("Transport already connected");
        }
        self.connected = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<InboundEvent> {
        if !self.connected {
            return None;
        }
        self.inbound.recv().await
    }

    async fn emit(&mut self, command: ControlCommand) -> Result<()> {
        if !self.connected {
            bail!("Cannot emit {} on a closed transport", command.event_name());
        }
        self.outbound
            .send(command)
            .map_err(|_| anyhow!("Producer hung up before {}", command.event_name()))
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        // Refuse further sends; the producer sees its next send fail
        self.inbound.close();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

impl ProducerEnd {
    /// Async send; false once the session side has closed
    pub async fn send(&self, event: InboundEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    /// Blocking send for producer threads outside the runtime
    pub fn send_blocking(&self, event: InboundEvent) -> bool {
        self.events.blocking_send(event).is_ok()
    }

    /// Next pending control command, if any
    pub fn try_command(&self) -> Option<ControlCommand> {
        match self.commands.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Whether a `stop_eeg` is waiting; consumes queued commands
    pub fn stop_requested(&self) -> bool {
        let mut stop = false;
        while let Some(command) = self.try_command() {
            stop |= command == ControlCommand::StopEeg;
        }
        stop
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}
