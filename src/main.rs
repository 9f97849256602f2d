use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use eegstream::core::ChartSink;
use eegstream::sim::{BackendConfig, SimulatedBackend};
use eegstream::sinks::LogSink;
use eegstream::transport::channel_transport;
use eegstream::{PipelineConfig, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG=debug shows per-series statistics for every draw
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(&path)?,
        None => PipelineConfig::default(),
    };

    let (transport, producer) = channel_transport(config.inbound_capacity);
    let backend = SimulatedBackend::new(BackendConfig {
        channels: config.channels.clone(),
        sample_rate_hz: config.sample_rate_hz,
        block_interval_ms: 500,
        ..Default::default()
    })
    .spawn(producer);

    let sink: Arc<dyn ChartSink> = Arc::new(LogSink::new("eeg").with_interval(10));
    let session = Session::start(Box::new(transport), config, &sink).await?;
    let handle = session.handle();
    let monitor = session.monitor();

    let running = tokio::spawn(session.run());
    tokio::time::sleep(Duration::from_secs(3)).await;

    info!("Stopping session");
    handle.stop();
    let summary = running.await.context("Session task panicked")??;

    println!("{}", monitor.generate_report());
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let blocks = tokio::task::spawn_blocking(move || backend.join())
        .await?
        .map_err(|_| anyhow::anyhow!("Simulated backend panicked"))?;
    info!("Backend delivered {} blocks", blocks);
    Ok(())
}
