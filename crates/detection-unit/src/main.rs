//! DriveGuard Detection Unit - Main Entry Point

use cloud_sync::{CollectorClient, SyncWorker};
use detection_unit::drivers::Disconnected;
use detection_unit::{init_logging, FrameReaderLoop, SamplingLoop, UnitConfig, UnitContext};
use evidence::{EvidenceCapture, EvidenceConfig};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== DriveGuard Detection Unit v{} ===", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1);
    let config = UnitConfig::load(config_path.as_deref())?;
    let context = UnitContext::new(config).await?;

    // Frame-reader loop (sole writer of the frame ring)
    let frame_reader = FrameReaderLoop::new(
        Disconnected,
        Arc::clone(&context.frame_ring),
        context.config.camera.fps,
        context.shutdown_flag(),
    );
    let frame_task = tokio::spawn(frame_reader.run());

    // Background sync worker draining the durable queue
    let collector = CollectorClient::new(context.config.collector_config())?;
    let sync_worker = SyncWorker::new(
        Arc::clone(&context.queue),
        collector,
        context.config.sync_config(),
        context.shutdown_flag(),
    );
    let sync_task = tokio::spawn(sync_worker.run());

    // Sampling loop in its own task so the main task can watch for ctrl-c
    let evidence = EvidenceCapture::new(
        EvidenceConfig {
            output_dir: context.config.camera.recordings_dir.clone(),
            fps: context.config.camera.fps,
            jpeg_quality: context.config.camera.jpeg_quality,
        },
        Arc::clone(&context.frame_ring),
    )?;
    let sampling = SamplingLoop::new(
        context.config.clone(),
        Disconnected,
        Disconnected,
        Disconnected,
        evidence,
        Arc::clone(&context.frame_ring),
        Arc::clone(&context.queue),
        context.shutdown_flag(),
    );
    let sampling_task = tokio::spawn(sampling.run());

    info!("system ready, monitoring");

    tokio::signal::ctrl_c().await?;
    context.request_shutdown();

    // Loops notice the flag at their next iteration; in-flight capture or
    // upload finishes first
    for (name, task) in [
        ("sampling", sampling_task),
        ("frame-reader", frame_task),
        ("sync", sync_task),
    ] {
        if let Err(e) = task.await {
            warn!(loop_name = name, error = %e, "task join failed");
        }
    }

    context.queue.close().await;
    info!("shutdown complete");
    Ok(())
}
