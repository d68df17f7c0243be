//! Types shared by the repochain execution engine and its clients: accounts, repositories, push
//! keys, tickets and the transactions that change them, along with their canonical binary
//! encoding.
#![doc(test(attr(forbid(warnings))))]
#![warn(missing_docs)]

pub mod account;
pub mod bytesrepr;
mod decimal;
mod keys;
pub mod push_key;
pub mod repository;
pub mod ticket;
pub mod transaction;

pub use account::{Account, StakeInfo, StakeType, Stakes};
pub use decimal::{Decimal, DecimalError};
pub use keys::{
    blake2b, Address, Digest, PublicKey, PushKeyId, ADDRESS_LENGTH, BLAKE2B_DIGEST_LENGTH,
    PUBLIC_KEY_LENGTH, PUSH_KEY_ID_LENGTH, PUSH_KEY_ID_PREFIX,
};
pub use push_key::PushKey;
pub use repository::{
    ConfigError, FeeMode, GovernanceConfig, Policy, Proposal, ProposalTally, RepoConfig,
    RepoConfigUpdate, RepoContributor, RepoOwner, Repository, TallyMethod, VoteChoice, VoterType,
};
pub use ticket::{Ticket, TicketType};
pub use transaction::{Transaction, TxCode, TxCommon};
