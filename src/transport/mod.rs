pub mod channel;
pub mod traits;

pub use channel::{channel_transport, ChannelTransport, ProducerEnd};
pub use traits::{
    ControlCommand, InboundEvent, StreamTransport,
    CONNECT_EVENT, DISCONNECT_EVENT, EEG_DATA_EVENT, OUTPUT_DATA_EVENT,
};
