use super::{
    source::{ScanSource, SourceEvent},
    types::{DeviceRecord, ScanInfo, ScanSession, ScanStatus, SourceKind, StopReason},
};
use crate::error::{BtsweepError, BtsweepResult};

use std::{collections::HashSet, time::SystemTime};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub type SessionToken = u64;

// Merges discovery events from the active sources into one deduplicated,
// first-seen-ordered result set. Performs no locking itself; every call
// happens under the owning mutex, so callbacks are serialized.
pub struct Aggregator {
    session: ScanSession,
    seen: HashSet<String>,
    token: SessionToken,
    sources: Vec<Box<dyn ScanSource>>,
    failed_sources: usize,
    malformed_records: u64,
    observers: Vec<UnboundedSender<ScanInfo>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            session: ScanSession::default(),
            seen: HashSet::new(),
            token: 0,
            sources: Vec::new(),
            failed_sources: 0,
            malformed_records: 0,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<ScanInfo> {
        let (observer_tx, observer_rx) = unbounded_channel();
        self.observers.push(observer_tx);
        observer_rx
    }

    // Rejected while a session is running; never queued. The returned token
    // is what the caller hands to the auto-stop timer and the event pump.
    pub fn start(
        &mut self,
        sources: Vec<Box<dyn ScanSource>>,
        timeout_ms: u64,
        events: UnboundedSender<SourceEvent>,
    ) -> BtsweepResult<SessionToken> {
        if self.session.status == ScanStatus::Scanning {
            return Err(BtsweepError::AlreadyScanning);
        }

        self.token += 1;
        self.seen.clear();
        self.failed_sources = 0;
        self.session = ScanSession {
            status: ScanStatus::Scanning,
            started_at: Some(SystemTime::now()),
            devices: Vec::new(),
            timeout_ms,
        };

        self.sources = sources;
        for source in self.sources.iter_mut() {
            log::info!("Begin discovery on {} source", source.kind());
            source.begin_discovery(events.clone());
        }

        self.notify(None);
        Ok(self.token)
    }

    // Idempotent; a stop from Idle emits nothing.
    pub fn stop(&mut self, reason: StopReason) {
        if self.session.status == ScanStatus::Idle {
            return;
        }

        for source in self.sources.iter_mut() {
            source.end_discovery();
        }
        self.sources.clear();

        self.session.status = ScanStatus::Idle;
        log::info!(
            "Discovery stopped ({reason}). {} device(s) found.",
            self.session.devices.len()
        );

        match reason {
            StopReason::SourcesFailed => self.notify(Some(reason.to_string())),
            _ => self.notify(None),
        }
    }

    // Timeout path. A stale timer holds a stale token and falls through.
    pub fn stop_expired(&mut self, token: SessionToken) {
        if token != self.token {
            log::debug!("Ignored expiry of a finished session");
            return;
        }
        self.stop(StopReason::Timeout);
    }

    pub fn on_device_found(&mut self, token: SessionToken, record: DeviceRecord) {
        if token != self.token || self.session.status != ScanStatus::Scanning {
            log::debug!("Discarded stray discovery event: {}", record.id);
            return;
        }

        if record.id.is_empty() {
            self.malformed_records += 1;
            log::warn!(
                "Dropped malformed record from {} source ({} so far)",
                record.source,
                self.malformed_records
            );
            return;
        }

        if !self.seen.insert(record.id.clone()) {
            return;
        }

        log::debug!("Found {} via {}", record.id, record.source);
        self.session.devices.push(record);
        self.notify(None);
    }

    // The session only dies once every source of this session has failed.
    pub fn on_source_error(&mut self, token: SessionToken, kind: SourceKind, reason: &str) {
        if token != self.token || self.session.status != ScanStatus::Scanning {
            return;
        }

        log::warn!("{kind} source failed: {reason}");
        self.failed_sources += 1;

        if self.failed_sources >= self.sources.len() {
            self.stop(StopReason::SourcesFailed);
        }
    }

    pub fn snapshot(&self) -> ScanSession {
        self.session.clone()
    }

    fn notify(&mut self, failure: Option<String>) {
        let scan_info = ScanInfo {
            status: self.session.status,
            devices: self.session.devices.clone(),
            failure,
        };

        self.observers
            .retain(|observer| observer.send(scan_info.clone()).is_ok());
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Aggregator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSource {
        kind: SourceKind,
    }

    impl ScanSource for NullSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn begin_discovery(&mut self, _events: UnboundedSender<SourceEvent>) {}

        fn end_discovery(&mut self) {}
    }

    fn sources(kinds: &[SourceKind]) -> Vec<Box<dyn ScanSource>> {
        kinds
            .iter()
            .map(|&kind| Box::new(NullSource { kind }) as Box<dyn ScanSource>)
            .collect()
    }

    fn record(id: &str, kind: SourceKind) -> DeviceRecord {
        DeviceRecord {
            id: id.to_string(),
            name: None,
            source: kind,
        }
    }

    fn started(aggregator: &mut Aggregator, kinds: &[SourceKind]) -> SessionToken {
        let (events_tx, _events_rx) = unbounded_channel();
        aggregator.start(sources(kinds), 10_000, events_tx).unwrap()
    }

    fn drain(observer: &mut UnboundedReceiver<ScanInfo>) -> Vec<ScanInfo> {
        let mut received = Vec::new();
        while let Ok(info) = observer.try_recv() {
            received.push(info);
        }
        received
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        let mut aggregator = Aggregator::new();
        let token = started(&mut aggregator, &[SourceKind::Ble]);

        for id in ["B", "A", "B", "C", "A", "B"] {
            aggregator.on_device_found(token, record(id, SourceKind::Ble));
        }

        let ids: Vec<String> = aggregator
            .snapshot()
            .devices
            .into_iter()
            .map(|device| device.id)
            .collect();
        assert_eq!(ids, ["B", "A", "C"]);
    }

    #[test]
    fn same_id_from_other_source_is_same_device() {
        let mut aggregator = Aggregator::new();
        let token = started(&mut aggregator, &[SourceKind::Ble, SourceKind::Classic]);

        let mut first = record("AA:BB:CC:DD:EE:FF", SourceKind::Ble);
        first.name = Some("headset".to_string());
        aggregator.on_device_found(token, first);

        let mut late = record("AA:BB:CC:DD:EE:FF", SourceKind::Classic);
        late.name = Some("renamed".to_string());
        aggregator.on_device_found(token, late);

        let devices = aggregator.snapshot().devices;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].source, SourceKind::Ble);
        assert_eq!(devices[0].name.as_deref(), Some("headset"));
    }

    #[test]
    fn restart_clears_previous_results() {
        let mut aggregator = Aggregator::new();
        let token = started(&mut aggregator, &[SourceKind::Ble]);

        aggregator.on_device_found(token, record("A", SourceKind::Ble));
        aggregator.stop(StopReason::Manual);

        let token = started(&mut aggregator, &[SourceKind::Ble]);
        assert!(aggregator.snapshot().devices.is_empty());

        // The id seen last session is discoverable again.
        aggregator.on_device_found(token, record("A", SourceKind::Ble));
        assert_eq!(aggregator.snapshot().devices.len(), 1);
    }

    #[test]
    fn events_after_stop_are_discarded() {
        let mut aggregator = Aggregator::new();
        let token = started(&mut aggregator, &[SourceKind::Ble]);

        aggregator.on_device_found(token, record("A", SourceKind::Ble));
        aggregator.stop_expired(token);

        aggregator.on_device_found(token, record("B", SourceKind::Ble));

        let session = aggregator.snapshot();
        assert_eq!(session.status, ScanStatus::Idle);
        assert_eq!(session.devices.len(), 1);
        assert_eq!(session.devices[0].id, "A");
    }

    #[test]
    fn stale_token_cannot_touch_a_newer_session() {
        let mut aggregator = Aggregator::new();
        let stale = started(&mut aggregator, &[SourceKind::Ble]);
        aggregator.stop(StopReason::Manual);

        let current = started(&mut aggregator, &[SourceKind::Ble]);

        aggregator.on_device_found(stale, record("GHOST", SourceKind::Ble));
        aggregator.stop_expired(stale);

        let session = aggregator.snapshot();
        assert_eq!(session.status, ScanStatus::Scanning);
        assert!(session.devices.is_empty());

        aggregator.stop_expired(current);
        assert_eq!(aggregator.snapshot().status, ScanStatus::Idle);
    }

    #[test]
    fn start_while_scanning_is_rejected() {
        let mut aggregator = Aggregator::new();
        let token = started(&mut aggregator, &[SourceKind::Ble]);
        aggregator.on_device_found(token, record("A", SourceKind::Ble));

        let (events_tx, _events_rx) = unbounded_channel();
        let rejected = aggregator.start(sources(&[SourceKind::Ble]), 10_000, events_tx);
        assert!(matches!(rejected, Err(BtsweepError::AlreadyScanning)));

        let session = aggregator.snapshot();
        assert_eq!(session.status, ScanStatus::Scanning);
        assert_eq!(session.devices.len(), 1);
        assert_eq!(session.devices[0].id, "A");
    }

    #[test]
    fn one_failed_source_does_not_stop_the_other() {
        let mut aggregator = Aggregator::new();
        let token = started(&mut aggregator, &[SourceKind::Ble, SourceKind::Classic]);

        aggregator.on_source_error(token, SourceKind::Ble, "ble adapter gone");
        assert_eq!(aggregator.snapshot().status, ScanStatus::Scanning);

        aggregator.on_device_found(token, record("X", SourceKind::Classic));
        assert_eq!(aggregator.snapshot().devices[0].id, "X");
    }

    #[test]
    fn all_sources_failing_ends_the_session_with_a_failure_notice() {
        let mut aggregator = Aggregator::new();
        let mut observer = aggregator.subscribe();
        let token = started(&mut aggregator, &[SourceKind::Ble, SourceKind::Classic]);

        aggregator.on_source_error(token, SourceKind::Ble, "ble adapter gone");
        aggregator.on_source_error(token, SourceKind::Classic, "classic adapter gone");

        assert_eq!(aggregator.snapshot().status, ScanStatus::Idle);

        let received = drain(&mut observer);
        let last = received.last().unwrap();
        assert_eq!(last.status, ScanStatus::Idle);
        assert!(last.failure.is_some());
    }

    #[test]
    fn stop_is_idempotent_and_silent_from_idle() {
        let mut aggregator = Aggregator::new();
        let mut observer = aggregator.subscribe();

        let token = started(&mut aggregator, &[SourceKind::Ble]);
        aggregator.on_device_found(token, record("A", SourceKind::Ble));
        aggregator.stop(StopReason::Manual);

        let before = drain(&mut observer).len();

        aggregator.stop(StopReason::Manual);
        aggregator.stop(StopReason::Manual);

        assert_eq!(drain(&mut observer).len(), 0);
        assert_eq!(before, 3); // start, append, stop
    }

    #[test]
    fn append_notifies_but_duplicates_do_not() {
        let mut aggregator = Aggregator::new();
        let mut observer = aggregator.subscribe();
        let token = started(&mut aggregator, &[SourceKind::Ble]);

        drain(&mut observer); // start notification

        aggregator.on_device_found(token, record("A", SourceKind::Ble));
        assert_eq!(drain(&mut observer).len(), 1);

        aggregator.on_device_found(token, record("A", SourceKind::Ble));
        assert!(drain(&mut observer).is_empty());
    }

    #[test]
    fn malformed_records_are_dropped() {
        let mut aggregator = Aggregator::new();
        let mut observer = aggregator.subscribe();
        let token = started(&mut aggregator, &[SourceKind::Ble]);

        drain(&mut observer);

        aggregator.on_device_found(token, record("", SourceKind::Ble));

        assert!(aggregator.snapshot().devices.is_empty());
        assert!(drain(&mut observer).is_empty());
        assert_eq!(aggregator.snapshot().status, ScanStatus::Scanning);
    }
}
