use crate::{application::types::ClientInfo, error::BtsweepError, opts::CommandOpts};

#[derive(Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Command = 0,
    Subscription = 1,
    Response = 2,
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = BtsweepError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageType::Command),
            1 => Ok(MessageType::Subscription),
            2 => Ok(MessageType::Response),
            _ => Err(BtsweepError::ParseError),
        }
    }
}

#[derive(Clone)]
pub struct Message {
    pub message_type: MessageType,
    pub header: usize, // size of payload
    pub payload: Vec<u8>,
}

impl TryFrom<CommandOpts> for Message {
    type Error = BtsweepError;
    fn try_from(opts: CommandOpts) -> Result<Self, Self::Error> {
        let payload: Vec<u8> = bincode::serialize(&opts)?;
        Ok(Message {
            message_type: MessageType::Command,
            header: payload.len(),
            payload,
        })
    }
}

impl TryFrom<&Message> for CommandOpts {
    type Error = BtsweepError;
    fn try_from(message: &Message) -> Result<Self, Self::Error> {
        if message.message_type != MessageType::Command || !message.is_valid() {
            return Err(BtsweepError::InvalidMessage);
        }
        bincode::deserialize(&message.payload).map_err(BtsweepError::BincodeError)
    }
}

impl From<ClientInfo> for Message {
    fn from(info: ClientInfo) -> Message {
        Message {
            message_type: MessageType::Subscription,
            header: ClientInfo::byte_size(),
            payload: info.into(),
        }
    }
}

impl Message {
    pub fn response(payload: Vec<u8>) -> Message {
        Message {
            message_type: MessageType::Response,
            header: payload.len(),
            payload,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.payload.len() == self.header
    }
}

impl From<Message> for Vec<u8> {
    fn from(message: Message) -> Self {
        let mut buffer = Vec::new();

        buffer.push(u8::from(message.message_type));
        buffer.extend_from_slice(&message.header.to_le_bytes());
        buffer.extend_from_slice(&message.payload);

        buffer
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = BtsweepError;
    fn try_from(buffer: &[u8]) -> Result<Self, Self::Error> {
        let metadata_len: usize = size_of::<MessageType>() + size_of::<usize>();

        if buffer.len() < metadata_len {
            return Err(BtsweepError::ParseError);
        }

        let message_type: MessageType = MessageType::try_from(buffer[0])?;
        let header: usize = usize::from_le_bytes(
            buffer[1..9]
                .try_into()
                .map_err(|_| BtsweepError::ParseError)?,
        );

        if buffer.len() < (metadata_len + header) {
            return Err(BtsweepError::ParseError);
        }

        let payload = buffer[9..(9 + header)].to_vec();
        Ok(Message {
            message_type,
            header,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opts::Transport;

    #[test]
    fn command_survives_framing() {
        let command = CommandOpts::Scan {
            timeout_ms: 12500,
            transport: Transport::Classic,
        };

        let message = Message::try_from(command.clone()).unwrap();
        let wire: Vec<u8> = message.into();
        let parsed = Message::try_from(wire.as_slice()).unwrap();

        assert!(parsed.is_valid());
        assert_eq!(CommandOpts::try_from(&parsed).unwrap(), command);
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let message = Message::try_from(CommandOpts::Ping).unwrap();
        let wire: Vec<u8> = message.into();

        assert!(Message::try_from(&wire[..wire.len() - 1]).is_err());
        assert!(Message::try_from(&wire[..4]).is_err());
    }
}
