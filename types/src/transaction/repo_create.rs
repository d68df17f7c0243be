use serde::{Deserialize, Serialize};

use super::{impl_bytesrepr_for_struct, TxCommon};
use crate::{Decimal, RepoConfigUpdate};

/// Creates a repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxRepoCreate {
    /// Common fields.
    pub common: TxCommon,
    /// Repository name, unique on chain.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Overrides applied on top of the default repository config.
    pub config: RepoConfigUpdate,
    /// Coins moved from the sender to the new repository.
    pub value: Decimal,
}

impl_bytesrepr_for_struct!(TxRepoCreate {
    common,
    name,
    description,
    config,
    value,
});
