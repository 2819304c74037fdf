use crate::{
    error::{BtsweepError, BtsweepResult},
    ipc::message::{Message, MessageType},
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    time::SystemTime,
};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Ble,
    Classic,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Ble => write!(f, "ble"),
            SourceKind::Classic => write!(f, "classic"),
        }
    }
}

// Identity is `id` alone; two records with the same id are the same device
// no matter which source reported them first.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: String,
    pub name: Option<String>,
    pub source: SourceKind,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Manual,
    Timeout,
    SourcesFailed,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Manual => write!(f, "manual stop"),
            StopReason::Timeout => write!(f, "scan window elapsed"),
            StopReason::SourcesFailed => write!(f, "all sources failed"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScanSession {
    pub status: ScanStatus,
    pub started_at: Option<SystemTime>,
    pub devices: Vec<DeviceRecord>,
    pub timeout_ms: u64,
}

// What subscribers receive on every state change. `failure` is only set on
// the terminal all-sources-failed notification.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScanInfo {
    pub status: ScanStatus,
    pub devices: Vec<DeviceRecord>,
    pub failure: Option<String>,
}

impl From<ScanSession> for ScanInfo {
    fn from(session: ScanSession) -> Self {
        ScanInfo {
            status: session.status,
            devices: session.devices,
            failure: None,
        }
    }
}

impl TryFrom<Message> for ScanInfo {
    type Error = BtsweepError;
    fn try_from(message: Message) -> BtsweepResult<ScanInfo> {
        if message.message_type != MessageType::Response || !message.is_valid() {
            return Err(BtsweepError::InvalidMessage);
        }
        bincode::deserialize(&message.payload).map_err(BtsweepError::BincodeError)
    }
}

impl TryFrom<ScanInfo> for Message {
    type Error = BtsweepError;
    fn try_from(scan_info: ScanInfo) -> Result<Self, Self::Error> {
        let payload: Vec<u8> = bincode::serialize(&scan_info)?;
        Ok(Message {
            message_type: MessageType::Response,
            header: payload.len(),
            payload,
        })
    }
}
