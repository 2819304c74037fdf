use super::SubscriptionID;
use crate::error::BtsweepError;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
pub struct ClientInfo {
    pub subscription_id: SubscriptionID,
    pub process_id: u32,
}

impl From<ClientInfo> for Vec<u8> {
    fn from(client_info: ClientInfo) -> Self {
        let mut buffer = Vec::new();

        buffer.push(u8::from(client_info.subscription_id));
        buffer.extend_from_slice(&client_info.process_id.to_le_bytes());

        buffer
    }
}

impl TryFrom<&[u8]> for ClientInfo {
    type Error = BtsweepError;
    fn try_from(buffer: &[u8]) -> std::result::Result<Self, Self::Error> {
        if buffer.len() < ClientInfo::byte_size() {
            return Err(BtsweepError::ParseError);
        }

        let subscription_id = SubscriptionID::try_from(buffer[0])?;
        let process_id = u32::from_le_bytes(
            buffer[1..(1 + size_of::<u32>())]
                .try_into()
                .map_err(|_| BtsweepError::ParseError)?,
        );

        Ok(ClientInfo {
            subscription_id,
            process_id,
        })
    }
}

impl ClientInfo {
    pub fn new(process_id: u32, subscription_id: SubscriptionID) -> Self {
        ClientInfo {
            subscription_id,
            process_id,
        }
    }

    pub fn byte_size() -> usize {
        size_of::<u8>() + size_of::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_codec_keeps_fields() {
        let info = ClientInfo::new(40123, SubscriptionID::Devices);
        let bytes: Vec<u8> = info.into();
        assert_eq!(bytes.len(), ClientInfo::byte_size());

        let parsed = ClientInfo::try_from(bytes.as_slice()).unwrap();
        assert_eq!(parsed.process_id, 40123);
        assert_eq!(parsed.subscription_id, SubscriptionID::Devices);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(ClientInfo::try_from([0u8, 1, 2].as_slice()).is_err());
    }
}
