use super::{
    aggregator::Aggregator,
    source::{ScanSource, SourceEvent},
    types::StopReason,
};
use crate::error::BtsweepResult;

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc::unbounded_channel, Mutex},
    time::sleep,
};

// Returns as soon as the sources are asked to begin; never blocks waiting
// for devices. The event pump and the auto-stop timer are bound to the
// session token.
pub async fn start_scan(
    aggregator: Arc<Mutex<Aggregator>>,
    sources: Vec<Box<dyn ScanSource>>,
    timeout_ms: u64,
) -> BtsweepResult<()> {
    let (events_tx, mut events_rx) = unbounded_channel();
    let token = aggregator
        .lock()
        .await
        .start(sources, timeout_ms, events_tx)?;

    let pump = aggregator.clone();
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let mut aggregator = pump.lock().await;
            match event {
                SourceEvent::DeviceFound(record) => aggregator.on_device_found(token, record),
                SourceEvent::SourceFailed { kind, reason } => {
                    aggregator.on_source_error(token, kind, &reason)
                }
            }
        }
    });

    tokio::spawn(async move {
        sleep(Duration::from_millis(timeout_ms)).await;
        aggregator.lock().await.stop_expired(token);
    });

    Ok(())
}

pub async fn stop_scan(aggregator: Arc<Mutex<Aggregator>>) {
    aggregator.lock().await.stop(StopReason::Manual);
}
