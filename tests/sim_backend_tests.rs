use std::time::Duration;

use eegstream::core::ChannelSet;
use eegstream::decode::{PredictionDecoder, SampleDecoder};
use eegstream::resilience::MissingChannelPolicy;
use eegstream::sim::{BackendConfig, SimulatedBackend};
use eegstream::transport::{channel_transport, StreamTransport, CONNECT_EVENT, DISCONNECT_EVENT, EEG_DATA_EVENT, OUTPUT_DATA_EVENT};

#[tokio::test]
async fn test_event_sequence() {
    let (mut transport, producer) = channel_transport(32);
    transport.connect().await.unwrap();

    let backend = SimulatedBackend::new(BackendConfig {
        block_size: 5,
        block_interval_ms: 0,
        predict_every: 2,
        start_timestamp: Some(0.0),
        max_blocks: Some(4),
        as_text: true,
        ..Default::default()
    })
    .spawn(producer);

    let mut names = Vec::new();
    let mut samples = 0;
    let mut predictions = 0;
    let decoder = SampleDecoder::new(ChannelSet::default(), MissingChannelPolicy::DropSample, 200.0);

    while let Some(event) = transport.next_event().await {
        match event.name.as_str() {
            EEG_DATA_EVENT => samples += decoder.decode(event.payload.clone()).records.len(),
            OUTPUT_DATA_EVENT => predictions += PredictionDecoder::new().decode(event.payload.clone()).records.len(),
            _ => {}
        }
        let done = event.name == DISCONNECT_EVENT;
        names.push(event.name);
        if done {
            break;
        }
    }

    assert_eq!(names.first().map(String::as_str), Some(CONNECT_EVENT));
    assert_eq!(names.last().map(String::as_str), Some(DISCONNECT_EVENT));
    assert_eq!(samples, 20);
    assert_eq!(predictions, 2);
    assert_eq!(backend.join().unwrap(), 4);
}

#[tokio::test]
async fn test_stop_command_halts_backend() {
    let (mut transport, producer) = channel_transport(4);
    transport.connect().await.unwrap();

    let backend = SimulatedBackend::new(BackendConfig {
        block_size: 2,
        block_interval_ms: 5,
        ..Default::default()
    })
    .spawn(producer);

    // Let a few blocks through, then ask the producer to stop
    for _ in 0..3 {
        transport.next_event().await.unwrap();
    }
    transport.emit(eegstream::transport::ControlCommand::StopEeg).await.unwrap();

    // Keep draining so the producer is never stuck on a full queue
    let drain = tokio::spawn(async move {
        while transport.next_event().await.is_some() {}
    });

    let sent = tokio::task::spawn_blocking(move || backend.join().unwrap());
    let sent = tokio::time::timeout(Duration::from_secs(5), sent).await.unwrap().unwrap();
    assert!(sent >= 2);
    drain.await.unwrap();
}
