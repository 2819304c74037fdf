use super::message::Message;
use crate::error::{BtsweepError, BtsweepResult};

use std::time::Duration;
use tokio::{net::UnixStream, time::sleep};

pub trait ReadSock {
    async fn read_bytes(&self, buffer: &mut [u8]) -> BtsweepResult<usize>;

    async fn read_message(&self) -> BtsweepResult<Message>;
    async fn try_read_message(&self, max_attempt: u8) -> BtsweepResult<Message>;
}

pub trait WriteSock {
    async fn write_bytes(&self, buffer: &[u8]) -> BtsweepResult<usize>;

    async fn write_message(&self, message: Message) -> BtsweepResult<usize>;
    async fn try_write_message(&self, message: &Message, max_attempt: u8) -> BtsweepResult<usize>;
}

pub trait RequestResponse {
    async fn send_and_receive_message(&self, message: Message) -> BtsweepResult<Message>;
}

pub async fn connect_to_socket(
    socket_path: &str,
    max_attempt: u8,
    delay: u64,
) -> BtsweepResult<UnixStream> {
    for attempt in 0..max_attempt {
        if let Ok(stream) = UnixStream::connect(socket_path).await {
            return Ok(stream);
        }
        log::debug!("Try connect: {} | Attempt: {}", socket_path, attempt + 1);
        sleep(Duration::from_millis(delay)).await;
    }

    log::warn!("Failed to connect to socket: {socket_path}");
    Err(BtsweepError::IpcError)
}
