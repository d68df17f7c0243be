use serde::{Deserialize, Serialize};

use super::{impl_bytesrepr_for_struct, TxCommon};
use crate::repository::VoteChoice;

/// Casts the sender's vote on a repository proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxRepoProposalVote {
    /// Common fields.
    pub common: TxCommon,
    /// Repository holding the proposal.
    pub repo_name: String,
    /// Proposal id.
    pub proposal_id: String,
    /// The vote.
    pub vote: VoteChoice,
}

impl_bytesrepr_for_struct!(TxRepoProposalVote {
    common,
    repo_name,
    proposal_id,
    vote,
});
