use serde::{Deserialize, Serialize};

use super::impl_bytesrepr_for_struct;
use crate::{Decimal, PublicKey};

/// Fields carried by every transaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxCommon {
    /// Must be exactly one more than the sender's current account nonce.
    pub nonce: u64,
    /// Fee paid by the sender.
    pub fee: Decimal,
    /// Unix time in seconds at which the transaction was created.
    pub timestamp: i64,
    /// Public key of the sender.
    pub sender_pub_key: PublicKey,
    /// Signature over the transaction's signable bytes.
    pub signature: Vec<u8>,
}

impl_bytesrepr_for_struct!(TxCommon {
    nonce,
    fee,
    timestamp,
    sender_pub_key,
    signature,
});
