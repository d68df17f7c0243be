use serde::{Deserialize, Serialize};

use super::{impl_bytesrepr_for_struct, TxCommon};

/// Sets the share of delegated rewards the sender keeps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxSetDelegatorCommission {
    /// Common fields.
    pub common: TxCommon,
    /// Commission in percent.
    pub commission: f64,
}

impl_bytesrepr_for_struct!(TxSetDelegatorCommission { common, commission });
