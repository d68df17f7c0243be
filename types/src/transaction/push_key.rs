use serde::{Deserialize, Serialize};

use super::{impl_bytesrepr_for_struct, TxCommon};
use crate::{Decimal, PublicKey, PushKeyId};

/// Registers a push key owned by the sender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxRegisterPushKey {
    /// Common fields.
    pub common: TxCommon,
    /// The key to register.
    pub public_key: PublicKey,
    /// Initial scopes.
    pub scopes: Vec<String>,
    /// Per-push fee cap.
    pub fee_cap: Decimal,
}

impl_bytesrepr_for_struct!(TxRegisterPushKey {
    common,
    public_key,
    scopes,
    fee_cap,
});

/// Updates or deletes a push key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxUpDelPushKey {
    /// Common fields.
    pub common: TxCommon,
    /// Id of the key.
    pub id: PushKeyId,
    /// Deletes the key; the other fields are then ignored.
    pub delete: bool,
    /// Indices into the current scope list to remove.
    pub remove_scopes: Vec<u32>,
    /// Scopes appended after removal.
    pub add_scopes: Vec<String>,
    /// Replacement fee cap, if any.
    pub fee_cap: Option<Decimal>,
}

impl_bytesrepr_for_struct!(TxUpDelPushKey {
    common,
    id,
    delete,
    remove_scopes,
    add_scopes,
    fee_cap,
});
