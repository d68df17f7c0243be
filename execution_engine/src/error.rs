//! Definition of all the possible outcomes of executing a transaction.
use thiserror::Error;

use repochain_types::{Address, ConfigError, PushKeyId, TallyMethod, TxCode};

use crate::keepers::KeeperError;

/// Execution errors.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A keeper call failed.
    #[error("failed to {context}: {error}")]
    Keeper {
        /// The operation that failed.
        context: &'static str,
        /// The keeper's error.
        #[source]
        error: KeeperError,
    },
    /// The supplied repository config could not be applied.
    #[error("config merge failed: {0}")]
    ConfigMerge(#[from] ConfigError),
    /// A repository with the same name already exists.
    #[error("repository '{0}' already exists")]
    RepoExists(String),
    /// No repository with the given name exists.
    #[error("repository '{0}' not found")]
    RepoNotFound(String),
    /// The repository has no proposal with the given id.
    #[error("proposal '{proposal_id}' not found in repository '{repo_name}'")]
    ProposalNotFound {
        /// Repository name.
        repo_name: String,
        /// Proposal id.
        proposal_id: String,
    },
    /// The proposal no longer accepts votes.
    #[error("proposal '{0}' is closed")]
    ProposalClosed(String),
    /// The voter already voted on the proposal.
    #[error("{voter} has already voted on proposal '{proposal_id}'")]
    AlreadyVoted {
        /// Proposal id.
        proposal_id: String,
        /// The voter.
        voter: Address,
    },
    /// The tally method only admits repository owners as voters.
    #[error("{voter} is not an owner; tally method {tally_method} requires one")]
    NotAnOwner {
        /// The voter.
        voter: Address,
        /// The proposal's tally method.
        tally_method: TallyMethod,
    },
    /// No push key with the given id exists.
    #[error("push key {0} not found")]
    PushKeyNotFound(PushKeyId),
    /// The transaction does not belong to the contract it was handed to.
    #[error("unsupported transaction type: {0}")]
    UnsupportedTransaction(TxCode),
}

/// Wraps keeper failures with the operation that was being attempted.
pub(crate) trait KeeperResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, Error>;
}

impl<T> KeeperResultExt<T> for Result<T, KeeperError> {
    fn context(self, context: &'static str) -> Result<T, Error> {
        self.map_err(|error| Error::Keeper { context, error })
    }
}
