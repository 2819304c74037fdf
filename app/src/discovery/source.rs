use super::types::{DeviceRecord, SourceKind};

use tokio::sync::mpsc::UnboundedSender;

#[derive(Clone, Debug)]
pub enum SourceEvent {
    DeviceFound(DeviceRecord),
    SourceFailed { kind: SourceKind, reason: String },
}

// One discovery transport.
pub trait ScanSource: Send {
    fn kind(&self) -> SourceKind;

    // Must not block; the source runs discovery on its own task and delivers
    // events through the channel.
    fn begin_discovery(&mut self, events: UnboundedSender<SourceEvent>);

    // Idempotent. Safe when discovery never started.
    fn end_discovery(&mut self);
}
