use crate::{
    error::{BtsweepError, BtsweepResult},
    ipc::{
        connect_to_socket,
        message::{Message, MessageType},
        ReadSock, WriteSock,
    },
    opts::CommandOpts,
};

use once_cell::sync::Lazy;
use std::env;

pub(super) static BTSWEEP_SOCKET: Lazy<String> = Lazy::new(|| {
    env::var("XDG_RUNTIME_DIR")
        .map(|value| format!("{value}/btsweep.sock"))
        .unwrap_or_else(|_| "/tmp/btsweep.sock".to_string())
});

pub(super) async fn ping_daemon() -> BtsweepResult<()> {
    if std::fs::metadata(BTSWEEP_SOCKET.as_str()).is_err() {
        log::info!("Server is not running");
        return Err(BtsweepError::NoDaemon);
    }

    let stream = connect_to_socket(&BTSWEEP_SOCKET, 3, 100)
        .await
        .map_err(|_| BtsweepError::NoDaemon)?;

    stream
        .write_message(Message::try_from(CommandOpts::Ping)?)
        .await?;

    let response = stream.read_message().await?;

    if response.message_type != MessageType::Response {
        return Err(BtsweepError::InvalidResponse);
    }

    log::info!(
        "Response from server: {}",
        String::from_utf8(response.payload).map_err(|_| BtsweepError::ParseError)?
    );

    Ok(())
}
