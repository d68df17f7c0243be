//! Transactions and their canonical encoding.
//!
//! A transaction is encoded as its type code followed by [`TxCommon`] and the body fields in
//! declaration order. Transaction hashes are computed over that encoding, so field order is part
//! of the protocol.
mod coin_transfer;
mod delegator_commission;
mod proposal_vote;
mod push_key;
mod repo_create;
mod ticket_purchase;
mod tx_code;
mod tx_common;

use std::fmt::{self, Display, Formatter};

use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

pub use coin_transfer::{Recipient, TxCoinTransfer};
pub use delegator_commission::TxSetDelegatorCommission;
pub use proposal_vote::TxRepoProposalVote;
pub use push_key::{TxRegisterPushKey, TxUpDelPushKey};
pub use repo_create::TxRepoCreate;
pub use ticket_purchase::TxTicketPurchase;
pub use tx_code::TxCode;
pub use tx_common::TxCommon;

use crate::{
    bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH},
    Digest,
};

/// Implements `ToBytes` and `FromBytes` for a struct by encoding its fields in the given order.
macro_rules! impl_bytesrepr_for_struct {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::bytesrepr::ToBytes for $name {
            fn serialized_length(&self) -> usize {
                0 $(+ $crate::bytesrepr::ToBytes::serialized_length(&self.$field))+
            }

            fn write_bytes(
                &self,
                writer: &mut Vec<u8>,
            ) -> Result<(), $crate::bytesrepr::Error> {
                $($crate::bytesrepr::ToBytes::write_bytes(&self.$field, writer)?;)+
                Ok(())
            }
        }

        impl $crate::bytesrepr::FromBytes for $name {
            fn from_bytes(
                bytes: &[u8],
            ) -> Result<(Self, &[u8]), $crate::bytesrepr::Error> {
                $(let ($field, bytes) = $crate::bytesrepr::FromBytes::from_bytes(bytes)?;)+
                Ok(($name { $($field),+ }, bytes))
            }
        }
    };
}

pub(crate) use impl_bytesrepr_for_struct;

/// A decoded transaction, tagged by its type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transaction {
    /// Move coins to an account or a repository.
    CoinTransfer(TxCoinTransfer),
    /// Buy a validator ticket.
    ValidatorTicket(TxTicketPurchase),
    /// Set the sender's delegator commission.
    SetDelegatorCommission(TxSetDelegatorCommission),
    /// Buy a host ticket.
    HostTicket(TxTicketPurchase),
    /// Create a repository.
    RepoCreate(TxRepoCreate),
    /// Register a push key.
    RegisterPushKey(TxRegisterPushKey),
    /// Update or delete a push key.
    UpDelPushKey(TxUpDelPushKey),
    /// Vote on a repository proposal.
    RepoProposalVote(TxRepoProposalVote),
}

impl Transaction {
    /// Returns the type code of the transaction.
    pub fn code(&self) -> TxCode {
        match self {
            Transaction::CoinTransfer(_) => TxCode::CoinTransfer,
            Transaction::ValidatorTicket(_) => TxCode::ValidatorTicket,
            Transaction::SetDelegatorCommission(_) => TxCode::SetDelegatorCommission,
            Transaction::HostTicket(_) => TxCode::HostTicket,
            Transaction::RepoCreate(_) => TxCode::RepoCreate,
            Transaction::RegisterPushKey(_) => TxCode::RegisterPushKey,
            Transaction::UpDelPushKey(_) => TxCode::UpDelPushKey,
            Transaction::RepoProposalVote(_) => TxCode::RepoProposalVote,
        }
    }

    /// Returns the fields every transaction carries.
    pub fn common(&self) -> &TxCommon {
        match self {
            Transaction::CoinTransfer(tx) => &tx.common,
            Transaction::ValidatorTicket(tx) | Transaction::HostTicket(tx) => &tx.common,
            Transaction::SetDelegatorCommission(tx) => &tx.common,
            Transaction::RepoCreate(tx) => &tx.common,
            Transaction::RegisterPushKey(tx) => &tx.common,
            Transaction::UpDelPushKey(tx) => &tx.common,
            Transaction::RepoProposalVote(tx) => &tx.common,
        }
    }

    fn common_mut(&mut self) -> &mut TxCommon {
        match self {
            Transaction::CoinTransfer(tx) => &mut tx.common,
            Transaction::ValidatorTicket(tx) | Transaction::HostTicket(tx) => &mut tx.common,
            Transaction::SetDelegatorCommission(tx) => &mut tx.common,
            Transaction::RepoCreate(tx) => &mut tx.common,
            Transaction::RegisterPushKey(tx) => &mut tx.common,
            Transaction::UpDelPushKey(tx) => &mut tx.common,
            Transaction::RepoProposalVote(tx) => &mut tx.common,
        }
    }

    /// Returns the hash of the full encoding, signature included.
    pub fn hash(&self) -> Result<Digest, bytesrepr::Error> {
        Ok(Digest::hash(self.to_bytes()?))
    }

    /// Returns the encoding with an empty signature; this is what the sender signs.
    pub fn signable_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut unsigned = self.clone();
        unsigned.common_mut().signature.clear();
        unsigned.to_bytes()
    }
}

impl Display for Transaction {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let common = self.common();
        write!(
            formatter,
            "{} from {} (nonce {}, fee {})",
            self.code(),
            common.sender_pub_key.to_address(),
            common.nonce,
            common.fee
        )
    }
}

impl ToBytes for Transaction {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                Transaction::CoinTransfer(tx) => tx.serialized_length(),
                Transaction::ValidatorTicket(tx) | Transaction::HostTicket(tx) => {
                    tx.serialized_length()
                }
                Transaction::SetDelegatorCommission(tx) => tx.serialized_length(),
                Transaction::RepoCreate(tx) => tx.serialized_length(),
                Transaction::RegisterPushKey(tx) => tx.serialized_length(),
                Transaction::UpDelPushKey(tx) => tx.serialized_length(),
                Transaction::RepoProposalVote(tx) => tx.serialized_length(),
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.code().write_bytes(writer)?;
        match self {
            Transaction::CoinTransfer(tx) => tx.write_bytes(writer),
            Transaction::ValidatorTicket(tx) | Transaction::HostTicket(tx) => {
                tx.write_bytes(writer)
            }
            Transaction::SetDelegatorCommission(tx) => tx.write_bytes(writer),
            Transaction::RepoCreate(tx) => tx.write_bytes(writer),
            Transaction::RegisterPushKey(tx) => tx.write_bytes(writer),
            Transaction::UpDelPushKey(tx) => tx.write_bytes(writer),
            Transaction::RepoProposalVote(tx) => tx.write_bytes(writer),
        }
    }
}

impl FromBytes for Transaction {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, remainder) = u8::from_bytes(bytes)?;
        let code = TxCode::from_u8(tag).ok_or(bytesrepr::Error::Formatting)?;
        match code {
            TxCode::CoinTransfer => {
                let (tx, remainder) = TxCoinTransfer::from_bytes(remainder)?;
                Ok((Transaction::CoinTransfer(tx), remainder))
            }
            TxCode::ValidatorTicket => {
                let (tx, remainder) = TxTicketPurchase::from_bytes(remainder)?;
                Ok((Transaction::ValidatorTicket(tx), remainder))
            }
            TxCode::SetDelegatorCommission => {
                let (tx, remainder) = TxSetDelegatorCommission::from_bytes(remainder)?;
                Ok((Transaction::SetDelegatorCommission(tx), remainder))
            }
            TxCode::HostTicket => {
                let (tx, remainder) = TxTicketPurchase::from_bytes(remainder)?;
                Ok((Transaction::HostTicket(tx), remainder))
            }
            TxCode::RepoCreate => {
                let (tx, remainder) = TxRepoCreate::from_bytes(remainder)?;
                Ok((Transaction::RepoCreate(tx), remainder))
            }
            TxCode::RegisterPushKey => {
                let (tx, remainder) = TxRegisterPushKey::from_bytes(remainder)?;
                Ok((Transaction::RegisterPushKey(tx), remainder))
            }
            TxCode::UpDelPushKey => {
                let (tx, remainder) = TxUpDelPushKey::from_bytes(remainder)?;
                Ok((Transaction::UpDelPushKey(tx), remainder))
            }
            TxCode::RepoProposalVote => {
                let (tx, remainder) = TxRepoProposalVote::from_bytes(remainder)?;
                Ok((Transaction::RepoProposalVote(tx), remainder))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{repository::VoteChoice, Decimal, PublicKey, PushKeyId, RepoConfigUpdate};

    fn common(fee: &str) -> TxCommon {
        TxCommon {
            nonce: 3,
            fee: fee.parse().unwrap(),
            timestamp: 1_600_000_000,
            sender_pub_key: PublicKey::from([5; 32]),
            signature: vec![1, 2, 3],
        }
    }

    fn all_transactions() -> Vec<Transaction> {
        let mut config = RepoConfigUpdate::new();
        config.insert("governance", json!({ "voter": "net_stakers", "tally_method": "net_stake" }));
        vec![
            Transaction::CoinTransfer(TxCoinTransfer {
                common: common("0.1"),
                to: Recipient::Repo("alpha".to_string()),
                value: Decimal::from(7u64),
            }),
            Transaction::ValidatorTicket(TxTicketPurchase {
                common: common("1"),
                value: Decimal::from(10u64),
                delegate: Some(PublicKey::from([6; 32])),
            }),
            Transaction::SetDelegatorCommission(TxSetDelegatorCommission {
                common: common("2"),
                commission: 23.5,
            }),
            Transaction::HostTicket(TxTicketPurchase {
                common: common("1"),
                value: Decimal::from(10u64),
                delegate: None,
            }),
            Transaction::RepoCreate(TxRepoCreate {
                common: common("1.5"),
                name: "alpha".to_string(),
                description: "a repo".to_string(),
                config,
                value: Decimal::from(4u64),
            }),
            Transaction::RegisterPushKey(TxRegisterPushKey {
                common: common("1"),
                public_key: PublicKey::from([9; 32]),
                scopes: vec!["r/alpha".to_string()],
                fee_cap: "0.5".parse().unwrap(),
            }),
            Transaction::UpDelPushKey(TxUpDelPushKey {
                common: common("1"),
                id: PushKeyId::from_public_key(&PublicKey::from([9; 32])),
                delete: false,
                remove_scopes: vec![0, 5, 2],
                add_scopes: vec!["r/beta".to_string()],
                fee_cap: Some(Decimal::from(2u64)),
            }),
            Transaction::RepoProposalVote(TxRepoProposalVote {
                common: common("1"),
                repo_name: "alpha".to_string(),
                proposal_id: "1".to_string(),
                vote: VoteChoice::NoWithVeto,
            }),
        ]
    }

    #[test]
    fn bytesrepr_roundtrip() {
        for tx in all_transactions() {
            bytesrepr::test_serialization_roundtrip(&tx);
        }
    }

    #[test]
    fn encoding_starts_with_type_code() {
        for tx in all_transactions() {
            let bytes = tx.to_bytes().unwrap();
            assert_eq!(bytes[0], tx.code() as u8);
        }
    }

    #[test]
    fn should_reject_unknown_type_code() {
        let mut bytes = all_transactions()[0].to_bytes().unwrap();
        bytes[0] = 0;
        assert_eq!(
            bytesrepr::deserialize::<Transaction>(&bytes),
            Err(bytesrepr::Error::Formatting)
        );
    }

    #[test]
    fn hash_covers_signature_but_signable_bytes_do_not() {
        let tx = all_transactions().remove(2);
        let mut resigned = tx.clone();
        resigned.common_mut().signature = vec![9, 9];
        assert_ne!(tx.hash().unwrap(), resigned.hash().unwrap());
        assert_eq!(
            tx.signable_bytes().unwrap(),
            resigned.signable_bytes().unwrap()
        );
    }

    #[test]
    fn ticket_kinds_share_a_body_but_not_a_code() {
        let validator = all_transactions().remove(1);
        if let Transaction::ValidatorTicket(body) = validator.clone() {
            let host = Transaction::HostTicket(body);
            assert_ne!(validator.to_bytes().unwrap(), host.to_bytes().unwrap());
        } else {
            panic!("expected a validator ticket");
        }
    }
}
