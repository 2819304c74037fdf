use std::fmt::{Display, Formatter, Result};

use crate::error::BtsweepError;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SubscriptionID {
    Devices = 0,
}

impl From<SubscriptionID> for u8 {
    fn from(value: SubscriptionID) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for SubscriptionID {
    type Error = BtsweepError;
    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(SubscriptionID::Devices),
            _ => Err(BtsweepError::ParseError),
        }
    }
}

impl Display for SubscriptionID {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            SubscriptionID::Devices => write!(f, "Devices"),
        }
    }
}
