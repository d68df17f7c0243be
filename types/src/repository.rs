//! Repositories, their ownership and their governance.
mod config;
mod proposal;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use config::{
    ConfigError, GovernanceConfig, Policy, RepoConfig, RepoConfigUpdate, TallyMethod, VoterType,
};
pub use proposal::{Proposal, ProposalTally, VoteChoice};

use crate::{Address, Decimal, PushKeyId};

/// An owner of a repository.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoOwner {
    /// Whether this owner created the repository.
    pub creator: bool,
    /// Height at which the owner was added.
    pub joined_at: u64,
    /// Whether this owner can veto proposals.
    pub veto: bool,
}

/// Who pays the fee of a push made by a contributor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeMode {
    /// The pusher pays.
    PusherPays,
    /// The repository pays.
    RepoPays,
    /// The repository pays up to the contributor's fee cap.
    RepoPaysCapped,
}

/// A push key allowed to write to a repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoContributor {
    /// Who pays for pushes.
    pub fee_mode: FeeMode,
    /// Maximum fee the repository pays under [`FeeMode::RepoPaysCapped`].
    pub fee_cap: Decimal,
    /// Contributor-specific access rules.
    pub policies: Vec<Policy>,
}

/// A repository as stored on chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Repository {
    /// Coins held by the repository itself.
    pub balance: Decimal,
    /// Free-form description.
    pub description: String,
    /// Height of the block that created the repository.
    pub created_at: u64,
    /// Current configuration.
    pub config: RepoConfig,
    /// Owners keyed by address.
    pub owners: BTreeMap<Address, RepoOwner>,
    /// Contributors keyed by push key id.
    pub contributors: BTreeMap<PushKeyId, RepoContributor>,
    /// Proposals keyed by id.
    pub proposals: BTreeMap<String, Proposal>,
}

impl Repository {
    /// Returns an empty repository.
    pub fn bare() -> Self {
        Repository::default()
    }

    /// Whether this is the value returned for a name that was never written.
    pub fn is_nil(&self) -> bool {
        *self == Repository::bare()
    }

    /// Adds or replaces an owner.
    pub fn add_owner(&mut self, address: Address, owner: RepoOwner) {
        self.owners.insert(address, owner);
    }

    /// Returns the owner with `address`, if any.
    pub fn owner(&self, address: &Address) -> Option<&RepoOwner> {
        self.owners.get(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PublicKey;

    #[test]
    fn bare_repository_is_nil_until_created() {
        let mut repo = Repository::bare();
        assert!(repo.is_nil());
        repo.created_at = 1;
        assert!(!repo.is_nil());
    }

    #[test]
    fn should_find_owners() {
        let mut repo = Repository::bare();
        let address = PublicKey::from([1; 32]).to_address();
        repo.add_owner(
            address,
            RepoOwner {
                creator: true,
                joined_at: 2,
                veto: true,
            },
        );
        assert!(repo.owner(&address).unwrap().veto);
        assert!(repo
            .owner(&PublicKey::from([2; 32]).to_address())
            .is_none());
    }

    #[test]
    fn repository_serde_roundtrip() {
        let mut repo = Repository::bare();
        repo.balance = "4".parse().unwrap();
        repo.add_owner(PublicKey::from([1; 32]).to_address(), RepoOwner::default());
        repo.contributors.insert(
            PublicKey::from([1; 32]).to_push_key_id(),
            RepoContributor {
                fee_mode: FeeMode::PusherPays,
                fee_cap: Decimal::zero(),
                policies: vec![],
            },
        );
        let json = serde_json::to_string(&repo).unwrap();
        assert_eq!(serde_json::from_str::<Repository>(&json).unwrap(), repo);
    }
}
