use std::fmt::{self, Display, Formatter};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH};

/// The one-byte type code leading every encoded transaction.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, FromPrimitive,
    ToPrimitive,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TxCode {
    /// Coin transfer.
    CoinTransfer = 1,
    /// Validator ticket purchase.
    ValidatorTicket = 2,
    /// Delegator commission update.
    SetDelegatorCommission = 3,
    /// Host ticket purchase.
    HostTicket = 4,
    /// Repository creation.
    RepoCreate = 5,
    /// Push key registration.
    RegisterPushKey = 6,
    /// Push key update or deletion.
    UpDelPushKey = 7,
    /// Vote on a repository proposal.
    RepoProposalVote = 8,
}

impl Display for TxCode {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let name = match self {
            TxCode::CoinTransfer => "coin-transfer",
            TxCode::ValidatorTicket => "validator-ticket",
            TxCode::SetDelegatorCommission => "set-delegator-commission",
            TxCode::HostTicket => "host-ticket",
            TxCode::RepoCreate => "repo-create",
            TxCode::RegisterPushKey => "register-push-key",
            TxCode::UpDelPushKey => "up-del-push-key",
            TxCode::RepoProposalVote => "repo-proposal-vote",
        };
        write!(formatter, "{}", name)
    }
}

impl ToBytes for TxCode {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let tag = self.to_u8().ok_or(bytesrepr::Error::Formatting)?;
        tag.write_bytes(writer)
    }
}

impl FromBytes for TxCode {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, remainder) = u8::from_bytes(bytes)?;
        let code = TxCode::from_u8(tag).ok_or(bytesrepr::Error::Formatting)?;
        Ok((code, remainder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(TxCode::CoinTransfer as u8, 1);
        assert_eq!(TxCode::ValidatorTicket as u8, 2);
        assert_eq!(TxCode::SetDelegatorCommission as u8, 3);
        assert_eq!(TxCode::HostTicket as u8, 4);
        assert_eq!(TxCode::RepoCreate as u8, 5);
        assert_eq!(TxCode::RegisterPushKey as u8, 6);
        assert_eq!(TxCode::UpDelPushKey as u8, 7);
        assert_eq!(TxCode::RepoProposalVote as u8, 8);
    }

    #[test]
    fn should_reject_unknown_codes() {
        assert_eq!(
            bytesrepr::deserialize::<TxCode>(&[9]),
            Err(bytesrepr::Error::Formatting)
        );
    }
}
