use serde::{Deserialize, Serialize};

use super::{impl_bytesrepr_for_struct, TxCommon};
use crate::{Decimal, PublicKey};

/// Buys a validator or host ticket; the transaction code decides which.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxTicketPurchase {
    /// Common fields.
    pub common: TxCommon,
    /// Amount staked.
    pub value: Decimal,
    /// Proposer to delegate the ticket to; the sender when `None`.
    pub delegate: Option<PublicKey>,
}

impl_bytesrepr_for_struct!(TxTicketPurchase {
    common,
    value,
    delegate,
});
