use super::{
    source::{ScanSource, SourceEvent},
    types::{DeviceRecord, SourceKind},
};
use crate::error::{BtsweepError, BtsweepResult};

use bluer::{Adapter, AdapterEvent, Address, DiscoveryFilter, DiscoveryTransport, Session};
use futures::{pin_mut, StreamExt};
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

// BlueZ-backed scan source. One implementation covers both transports; the
// discovery filter decides whether BlueZ sweeps LE advertisements or runs a
// classic inquiry.
pub struct RadioSource {
    kind: SourceKind,
    task: Option<JoinHandle<()>>,
}

impl RadioSource {
    pub fn ble() -> Self {
        RadioSource {
            kind: SourceKind::Ble,
            task: None,
        }
    }

    pub fn classic() -> Self {
        RadioSource {
            kind: SourceKind::Classic,
            task: None,
        }
    }
}

impl ScanSource for RadioSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn begin_discovery(&mut self, events: UnboundedSender<SourceEvent>) {
        if self.task.is_some() {
            return;
        }

        let kind = self.kind;
        self.task = Some(tokio::spawn(async move {
            if let Err(e) = run_discovery(kind, &events).await {
                log::error!("{kind} discovery failed: {e}");
                let _ = events.send(SourceEvent::SourceFailed {
                    kind,
                    reason: e.to_string(),
                });
            }
        }));
    }

    fn end_discovery(&mut self) {
        if let Some(task) = self.task.take() {
            // Dropping the discovery stream releases BlueZ discovery.
            task.abort();
        }
    }
}

// Authorization gate. Checked by the daemon before a session starts; the
// aggregator itself never re-checks.
pub async fn adapter_ready() -> BtsweepResult<bool> {
    let session = Session::new()
        .await
        .map_err(|_| BtsweepError::BluetoothError)?;
    let adapter = session
        .default_adapter()
        .await
        .map_err(|_| BtsweepError::BluetoothError)?;

    adapter
        .is_powered()
        .await
        .map_err(|_| BtsweepError::BluetoothError)
}

fn transport(kind: SourceKind) -> DiscoveryTransport {
    match kind {
        SourceKind::Ble => DiscoveryTransport::Le,
        SourceKind::Classic => DiscoveryTransport::BrEdr,
    }
}

async fn run_discovery(
    kind: SourceKind,
    events: &UnboundedSender<SourceEvent>,
) -> bluer::Result<()> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;

    adapter
        .set_discovery_filter(DiscoveryFilter {
            transport: transport(kind),
            ..Default::default()
        })
        .await?;

    let device_events = adapter.discover_devices().await?;
    pin_mut!(device_events);

    while let Some(event) = device_events.next().await {
        if let AdapterEvent::DeviceAdded(address) = event {
            let record = device_record(&adapter, kind, address).await;
            if events.send(SourceEvent::DeviceFound(record)).is_err() {
                // Session is gone; nobody is listening anymore.
                break;
            }
        }
    }

    Ok(())
}

async fn device_record(adapter: &Adapter, kind: SourceKind, address: Address) -> DeviceRecord {
    let name = match adapter.device(address) {
        Ok(device) => device.name().await.unwrap_or(None),
        Err(_) => None,
    };

    DeviceRecord {
        id: address.to_string(),
        name,
        source: kind,
    }
}
