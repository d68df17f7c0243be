use serde::{Deserialize, Serialize};

use super::{impl_bytesrepr_for_struct, TxCommon};
use crate::{
    bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH},
    Address, Decimal,
};

const ACCOUNT_TAG: u8 = 0;
const REPO_TAG: u8 = 1;

/// Destination of a coin transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    /// An account.
    Account(Address),
    /// A repository, by name.
    Repo(String),
}

impl ToBytes for Recipient {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                Recipient::Account(address) => address.serialized_length(),
                Recipient::Repo(name) => name.serialized_length(),
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        match self {
            Recipient::Account(address) => {
                writer.push(ACCOUNT_TAG);
                address.write_bytes(writer)
            }
            Recipient::Repo(name) => {
                writer.push(REPO_TAG);
                name.write_bytes(writer)
            }
        }
    }
}

impl FromBytes for Recipient {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, remainder) = u8::from_bytes(bytes)?;
        match tag {
            ACCOUNT_TAG => {
                let (address, remainder) = Address::from_bytes(remainder)?;
                Ok((Recipient::Account(address), remainder))
            }
            REPO_TAG => {
                let (name, remainder) = String::from_bytes(remainder)?;
                Ok((Recipient::Repo(name), remainder))
            }
            _ => Err(bytesrepr::Error::Formatting),
        }
    }
}

/// Moves `value` coins from the sender to `to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxCoinTransfer {
    /// Common fields.
    pub common: TxCommon,
    /// Where the coins go.
    pub to: Recipient,
    /// Amount transferred.
    pub value: Decimal,
}

impl_bytesrepr_for_struct!(TxCoinTransfer { common, to, value });
