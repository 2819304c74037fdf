use super::{message::Message, ReadSock, RequestResponse, WriteSock};
use crate::{
    error::{BtsweepError, BtsweepResult},
    global::BUFFER_SIZE,
};

use tokio::net::{unix::OwnedWriteHalf, UnixStream};

impl ReadSock for UnixStream {
    async fn read_bytes(&self, buffer: &mut [u8]) -> BtsweepResult<usize> {
        if let Err(e) = self.readable().await {
            log::error!("Unreadable. Error: {e}");
            return Err(BtsweepError::IpcError);
        }

        match self.try_read(buffer) {
            Ok(len) if len > 0 => Ok(len),
            Ok(_) => {
                log::error!("Failed to read.");
                Err(BtsweepError::IpcError)
            }
            Err(e) => {
                log::info!("Can't read from stream. Error: {e}");
                Err(BtsweepError::IpcError)
            }
        }
    }

    async fn read_message(&self) -> BtsweepResult<Message> {
        let mut buffer = vec![0; *BUFFER_SIZE];
        match self.read_bytes(&mut buffer).await {
            Ok(len) if len > 0 => buffer[..len].try_into(),
            Ok(_) => {
                log::error!("Invalid message");
                Err(BtsweepError::IpcError)
            }
            Err(e) => {
                log::info!("Can't read from stream. Error: {e}");
                Err(BtsweepError::IpcError)
            }
        }
    }

    async fn try_read_message(&self, max_attempt: u8) -> BtsweepResult<Message> {
        for attempt in 0..max_attempt {
            match self.read_message().await {
                Ok(message) => return Ok(message),
                Err(_) => log::warn!("Retry {}/{}", attempt + 1, max_attempt),
            }
        }
        log::error!("Out of attempt");
        Err(BtsweepError::IpcError)
    }
}

impl WriteSock for UnixStream {
    async fn write_bytes(&self, buffer: &[u8]) -> BtsweepResult<usize> {
        if let Err(e) = self.writable().await {
            log::error!("Unwritable. Error: {e}");
            return Err(BtsweepError::IpcError);
        }

        match self.try_write(buffer) {
            Ok(len) if len == buffer.len() => Ok(len),
            Ok(len) => {
                log::warn!("Can't write all message. {len} bytes were written.");
                Err(BtsweepError::IpcError)
            }
            Err(e) => {
                log::info!("Can't write to stream. Error: {e}");
                Err(BtsweepError::IpcError)
            }
        }
    }

    async fn write_message(&self, message: Message) -> BtsweepResult<usize> {
        let buffer: Vec<u8> = message.into();
        self.write_bytes(&buffer).await
    }

    async fn try_write_message(&self, message: &Message, max_attempt: u8) -> BtsweepResult<usize> {
        for attempt in 0..max_attempt {
            match self.write_message(message.clone()).await {
                Ok(len) => return Ok(len),
                Err(_) => log::warn!("Retry {}/{}", attempt + 1, max_attempt),
            }
        }
        log::error!("Out of attempt.");
        Err(BtsweepError::IpcError)
    }
}

impl RequestResponse for UnixStream {
    async fn send_and_receive_message(&self, message: Message) -> BtsweepResult<Message> {
        self.write_message(message).await?;
        self.read_message().await
    }
}

impl WriteSock for OwnedWriteHalf {
    async fn write_bytes(&self, buffer: &[u8]) -> BtsweepResult<usize> {
        if let Err(e) = self.writable().await {
            log::error!("Unwritable. Error: {e}");
            return Err(BtsweepError::IpcError);
        }

        match self.try_write(buffer) {
            Ok(len) if len == buffer.len() => Ok(len),
            Ok(len) => {
                log::warn!("Can't write all message. {len} bytes were written.");
                Err(BtsweepError::IpcError)
            }
            Err(e) => {
                log::info!("Can't write to stream. Error: {e}");
                Err(BtsweepError::IpcError)
            }
        }
    }

    async fn write_message(&self, message: Message) -> BtsweepResult<usize> {
        let buffer: Vec<u8> = message.into();
        self.write_bytes(&buffer).await
    }

    async fn try_write_message(&self, message: &Message, max_attempt: u8) -> BtsweepResult<usize> {
        for attempt in 0..max_attempt {
            match self.write_message(message.clone()).await {
                Ok(len) => return Ok(len),
                Err(_) => log::warn!("Retry {}/{}", attempt + 1, max_attempt),
            }
        }
        log::error!("Out of attempt.");
        Err(BtsweepError::IpcError)
    }
}
