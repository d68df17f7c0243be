//! Capability interfaces over the persisted collections the system contracts read and write.
//!
//! Method names are distinct across the traits so a single store can implement all of them.
//! Reads of a missing record return its bare value, never an error.
mod in_memory;

use thiserror::Error;

use repochain_types::{
    bytesrepr, Account, Address, Decimal, PublicKey, PushKey, PushKeyId, Repository, Ticket,
    VoteChoice,
};

pub use in_memory::InMemoryKeepers;

/// Failure reported by a keeper.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KeeperError {
    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
    /// A persisted record could not be decoded.
    #[error("corrupt record: {0}")]
    Codec(#[from] bytesrepr::Error),
}

/// Provides access to accounts.
pub trait AccountKeeper {
    /// Returns the account at `address`, or a bare account if none was written.
    fn get_account(&self, address: &Address) -> Result<Account, KeeperError>;

    /// Stores `account` at `address`.
    fn update_account(&mut self, address: &Address, account: Account) -> Result<(), KeeperError>;
}

/// Provides access to repositories and the proposal vote index.
pub trait RepoKeeper {
    /// Returns the repository called `name`, or a bare repository if none was written.
    fn get_repo(&self, name: &str) -> Result<Repository, KeeperError>;

    /// Stores `repo` under `name`.
    fn update_repo(&mut self, name: &str, repo: Repository) -> Result<(), KeeperError>;

    /// Returns the vote `voter` cast on a proposal, if any.
    fn get_proposal_vote(
        &self,
        repo_name: &str,
        proposal_id: &str,
        voter: &Address,
    ) -> Result<Option<VoteChoice>, KeeperError>;

    /// Records the vote `voter` cast on a proposal. Indexing the same voter twice overwrites.
    fn index_proposal_vote(
        &mut self,
        repo_name: &str,
        proposal_id: &str,
        voter: &Address,
        vote: VoteChoice,
    ) -> Result<(), KeeperError>;
}

/// Provides access to push keys.
pub trait PushKeyKeeper {
    /// Returns the push key with `id`, or a bare key if none was written.
    fn get_push_key(&self, id: &PushKeyId) -> Result<PushKey, KeeperError>;

    /// Stores `push_key` under `id`.
    fn update_push_key(&mut self, id: &PushKeyId, push_key: PushKey) -> Result<(), KeeperError>;

    /// Removes the push key with `id`. Removing a missing key is not an error.
    fn remove_push_key(&mut self, id: &PushKeyId) -> Result<(), KeeperError>;
}

/// Provides stake information derived from tickets.
///
/// Every query only considers tickets bought at or before `max_height` and not yet decayed at
/// that height.
pub trait TicketManager {
    /// Total value of the tickets `proposer` staked for itself.
    fn value_of_non_delegated_tickets(
        &self,
        proposer: &PublicKey,
        max_height: u64,
    ) -> Result<Decimal, KeeperError>;

    /// Total value of the tickets other addresses delegated to `proposer`.
    fn value_of_delegated_tickets(
        &self,
        proposer: &PublicKey,
        max_height: u64,
    ) -> Result<Decimal, KeeperError>;

    /// Tickets for which `holder` is either the proposer or the delegator.
    fn get_non_decayed_tickets(
        &self,
        holder: &PublicKey,
        max_height: u64,
    ) -> Result<Vec<Ticket>, KeeperError>;
}

/// The full set of keepers a system contract may use.
pub trait Keepers: AccountKeeper + RepoKeeper + PushKeyKeeper + TicketManager {}

impl<T> Keepers for T where T: AccountKeeper + RepoKeeper + PushKeyKeeper + TicketManager {}
