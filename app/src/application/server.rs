use super::utils::{ping_daemon, BTSWEEP_SOCKET};
use crate::{
    application::types::{ClientInfo, SubscriptionID},
    discovery::{
        radio::{adapter_ready, RadioSource},
        scanner,
        source::ScanSource,
        types::ScanInfo,
        AGGREGATOR,
    },
    error::{BtsweepError, BtsweepResult},
    global::SUBSCRIBERS,
    ipc::{
        message::{Message, MessageType},
        ReadSock, WriteSock,
    },
    opts::{CommandOpts, Transport},
};

use std::{fs, time::Duration};
use tokio::{
    net::{UnixListener, UnixStream},
    sync::mpsc::UnboundedReceiver,
    time::sleep,
};

pub async fn start_server() -> BtsweepResult<()> {
    if ping_daemon().await.is_ok() {
        return Err(BtsweepError::DaemonRunning);
    }

    if fs::metadata(BTSWEEP_SOCKET.as_str()).is_ok() {
        fs::remove_file(BTSWEEP_SOCKET.as_str())?;
        log::debug!("Removed: {}", BTSWEEP_SOCKET.as_str());
    }

    log::info!("---------- START BTSWEEP DAEMON ----------");

    let updates = AGGREGATOR.lock().await.subscribe();
    tokio::spawn(forward_updates(updates));

    log::info!("Try to bind on socket: {}", BTSWEEP_SOCKET.as_str());
    let listener = UnixListener::bind(BTSWEEP_SOCKET.as_str())?;
    log::info!("Success");

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(handle_connection(stream));
    }
    Ok(())
}

async fn forward_updates(mut updates: UnboundedReceiver<ScanInfo>) {
    while let Some(scan_info) = updates.recv().await {
        if let Err(e) = broadcast_info(scan_info).await {
            log::debug!("Broadcast: {e}");
        }
    }
}

async fn broadcast_info(scan_info: ScanInfo) -> BtsweepResult<()> {
    let mut subscribers_ref = SUBSCRIBERS.lock().await;

    let subscribers = match subscribers_ref.get_mut(&SubscriptionID::Devices) {
        Some(subs) if !subs.is_empty() => subs,
        Some(_) | None => {
            return Err(BtsweepError::NoSubscriber);
        }
    };

    let message = Message::try_from(scan_info)?;

    let mut disconnected_pid = Vec::new();

    for (pid, stream) in subscribers.iter_mut() {
        if stream.try_write_message(&message, 2).await.is_err() {
            log::debug!("Client {pid} is disconnected.");
            disconnected_pid.push(*pid);
        }
    }

    for pid in disconnected_pid {
        log::info!("Remove {pid}");
        subscribers.remove(&pid);
    }

    Ok(())
}

async fn handle_connection(stream: UnixStream) -> BtsweepResult<()> {
    let message = stream.try_read_message(3).await?;

    match message.message_type {
        MessageType::Command => {
            let command = CommandOpts::try_from(&message)?;
            process_server_command(stream, command).await
        }
        MessageType::Subscription => {
            let client_info = ClientInfo::try_from(message.payload.as_slice())?;
            register_subscription(stream, client_info).await
        }
        MessageType::Response => Err(BtsweepError::InvalidMessage),
    }
}

async fn process_server_command(stream: UnixStream, command: CommandOpts) -> BtsweepResult<()> {
    log::info!("Command from client: {command}");

    match command {
        CommandOpts::Scan {
            timeout_ms,
            transport,
        } => {
            let reply = match begin_scan_session(timeout_ms, transport).await {
                Ok(_) => "Scanning".to_string(),
                Err(e) => {
                    log::warn!("Scan rejected: {e}");
                    e.to_string()
                }
            };
            stream
                .write_message(Message::response(reply.into_bytes()))
                .await?;
        }

        CommandOpts::Stop => {
            scanner::stop_scan(AGGREGATOR.clone()).await;
            stream
                .write_message(Message::response(b"Stopped".to_vec()))
                .await?;
        }

        CommandOpts::Ping => {
            stream
                .write_message(Message::response(b"Pong".to_vec()))
                .await?;
        }

        CommandOpts::Kill => {
            let shutdown_message = "Server is shutting down...";
            log::info!("{shutdown_message}");
            stream
                .write_message(Message::response(shutdown_message.into()))
                .await?;
            sleep(Duration::from_millis(100)).await;
            std::process::exit(0);
        }
    }

    Ok(())
}

async fn begin_scan_session(timeout_ms: u64, transport: Transport) -> BtsweepResult<()> {
    if !adapter_ready().await? {
        return Err(BtsweepError::BluetoothError);
    }

    scanner::start_scan(AGGREGATOR.clone(), build_sources(transport), timeout_ms).await
}

fn build_sources(transport: Transport) -> Vec<Box<dyn ScanSource>> {
    match transport {
        Transport::Ble => vec![Box::new(RadioSource::ble())],
        Transport::Classic => vec![Box::new(RadioSource::classic())],
        Transport::All => vec![
            Box::new(RadioSource::ble()),
            Box::new(RadioSource::classic()),
        ],
    }
}

async fn register_subscription(stream: UnixStream, client_info: ClientInfo) -> BtsweepResult<()> {
    log::info!(
        "Client pid {} subscribe to {}",
        client_info.process_id,
        client_info.subscription_id
    );

    let snapshot: ScanInfo = AGGREGATOR.lock().await.snapshot().into();
    stream.write_message(Message::try_from(snapshot)?).await?;

    let (_, write_half) = stream.into_split();

    let mut subscribers = SUBSCRIBERS.lock().await;
    subscribers
        .entry(client_info.subscription_id)
        .or_default()
        .insert(client_info.process_id, write_half);

    log::info!("Client connected.");

    Ok(())
}
