use super::utils::{ping_daemon, BTSWEEP_SOCKET};
use crate::{
    application::types::{ClientInfo, SubscriptionID},
    discovery::types::ScanInfo,
    error::{BtsweepError, BtsweepResult},
    ipc::{connect_to_socket, message::Message, ReadSock, WriteSock},
    opts::SubscribeOpts,
};

use std::process;
use tokio::net::UnixStream;

const UNKNOWN_DEVICE: &str = "Unknown Device";
const MAX_NAME_LENGTH: u32 = 64;

pub async fn start_client(subscription_opts: &SubscribeOpts) -> BtsweepResult<()> {
    ping_daemon().await?;

    let (subscription_id, max_name_length) = match subscription_opts {
        SubscribeOpts::Devices { max_name_length } => (
            SubscriptionID::Devices,
            max_name_length.map_or(0, |len| {
                if len > MAX_NAME_LENGTH {
                    log::warn!("Max name length = {MAX_NAME_LENGTH}");
                }
                len.min(MAX_NAME_LENGTH)
            }),
        ),
    };

    let stream = subscribe(&subscription_id).await?;

    loop {
        let message = match stream.read_message().await {
            Ok(message) => message,
            Err(e) => {
                log::error!("Error reading from server: {e}");
                return Err(e);
            }
        };

        let scan_info = ScanInfo::try_from(message)?;
        println!("{}", render_snapshot(scan_info, &max_name_length)?);
    }
}

async fn subscribe(subscription_id: &SubscriptionID) -> BtsweepResult<UnixStream> {
    let stream = connect_to_socket(&BTSWEEP_SOCKET, 1, 100).await?;

    let message = Message::from(ClientInfo::new(process::id(), *subscription_id));
    stream.try_write_message(&message, 3).await?;

    Ok(stream)
}

// Presentation only: nameless devices get a placeholder, long names get
// trimmed. The aggregator never sees either.
fn render_snapshot(mut scan_info: ScanInfo, max_name_length: &u32) -> BtsweepResult<String> {
    for device in scan_info.devices.iter_mut() {
        let mut name = device
            .name
            .take()
            .unwrap_or_else(|| UNKNOWN_DEVICE.to_string());

        if *max_name_length > 0 {
            if let Some(short) = name.get(..*max_name_length as usize) {
                name = format!("{short}...");
            }
        }

        device.name = Some(name);
    }

    serde_json::to_string(&scan_info).map_err(BtsweepError::JsonError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::types::{DeviceRecord, ScanStatus, SourceKind};

    fn snapshot(devices: Vec<DeviceRecord>) -> ScanInfo {
        ScanInfo {
            status: ScanStatus::Scanning,
            devices,
            failure: None,
        }
    }

    #[test]
    fn nameless_devices_get_a_placeholder() {
        let rendered = render_snapshot(
            snapshot(vec![DeviceRecord {
                id: "AA:BB:CC:DD:EE:FF".to_string(),
                name: None,
                source: SourceKind::Ble,
            }]),
            &0,
        )
        .unwrap();

        assert!(rendered.contains("Unknown Device"));
    }

    #[test]
    fn long_names_are_trimmed() {
        let rendered = render_snapshot(
            snapshot(vec![DeviceRecord {
                id: "AA:BB:CC:DD:EE:FF".to_string(),
                name: Some("a-device-with-a-very-long-name".to_string()),
                source: SourceKind::Classic,
            }]),
            &8,
        )
        .unwrap();

        assert!(rendered.contains("a-device..."));
    }
}
