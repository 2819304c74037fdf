use std::{fmt::Display, io, result::Result};

pub type BtsweepResult<T> = Result<T, BtsweepError>;

#[derive(Debug)]
pub enum BtsweepError {
    DaemonRunning,
    NoDaemon,
    JsonError(serde_json::Error),
    BincodeError(bincode::Error),
    IoError(io::Error),
    IpcError,
    ParseError,
    NoSubscriber,
    LoggerError,
    InvalidMessage,
    InvalidResponse,
    AlreadyScanning,
    BluetoothError,
}

impl From<io::Error> for BtsweepError {
    fn from(value: io::Error) -> Self {
        BtsweepError::IoError(value)
    }
}

impl From<serde_json::Error> for BtsweepError {
    fn from(value: serde_json::Error) -> Self {
        BtsweepError::JsonError(value)
    }
}

impl From<bincode::Error> for BtsweepError {
    fn from(value: bincode::Error) -> Self {
        BtsweepError::BincodeError(value)
    }
}

impl From<fern::InitError> for BtsweepError {
    fn from(_: fern::InitError) -> Self {
        BtsweepError::LoggerError
    }
}

impl Display for BtsweepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtsweepError::DaemonRunning => write!(f, "Daemon is already running"),
            BtsweepError::NoDaemon => write!(f, "No daemon found"),
            BtsweepError::JsonError(err) => write!(f, "Serde json error: {}", err),
            BtsweepError::BincodeError(err) => write!(f, "Serde bincode error: {}", err),
            BtsweepError::IoError(err) => write!(f, "IO error: {}", err),
            BtsweepError::IpcError => write!(f, "Inter-processes communication error"),
            BtsweepError::ParseError => write!(f, "Parse error"),
            BtsweepError::NoSubscriber => write!(f, "No subscriber"),
            BtsweepError::LoggerError => write!(f, "Cannot init logger"),
            BtsweepError::InvalidMessage => write!(f, "Invalid message"),
            BtsweepError::InvalidResponse => write!(f, "Invalid response"),
            BtsweepError::AlreadyScanning => write!(f, "A scan session is already running"),
            BtsweepError::BluetoothError => write!(f, "Bluetooth adapter is unavailable"),
        }
    }
}
