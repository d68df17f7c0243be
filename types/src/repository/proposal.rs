use std::fmt::{self, Display, Formatter};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::{
    bytesrepr::{self, FromBytes, ToBytes, U8_SERIALIZED_LENGTH},
    repository::GovernanceConfig,
    Address,
};

/// A vote cast on a proposal.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, FromPrimitive,
    ToPrimitive,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum VoteChoice {
    /// Against the proposal.
    No = 0,
    /// For the proposal.
    Yes = 1,
    /// Against the proposal, asking for it to be vetoed.
    NoWithVeto = 2,
    /// Counted towards quorum only.
    Abstain = 3,
}

impl Display for VoteChoice {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            VoteChoice::No => write!(formatter, "no"),
            VoteChoice::Yes => write!(formatter, "yes"),
            VoteChoice::NoWithVeto => write!(formatter, "no_with_veto"),
            VoteChoice::Abstain => write!(formatter, "abstain"),
        }
    }
}

impl ToBytes for VoteChoice {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        let tag = self.to_u8().ok_or(bytesrepr::Error::Formatting)?;
        tag.write_bytes(writer)
    }
}

impl FromBytes for VoteChoice {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (tag, remainder) = u8::from_bytes(bytes)?;
        let choice = VoteChoice::from_u8(tag).ok_or(bytesrepr::Error::Formatting)?;
        Ok((choice, remainder))
    }
}

/// Accumulated vote weight per choice.
///
/// Weights are floating point; conversions from decimal stake happen once per ticket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProposalTally {
    /// Weight of Yes votes.
    pub yes: f64,
    /// Weight of No votes.
    pub no: f64,
    /// Weight of Abstain votes.
    pub abstain: f64,
    /// Weight of NoWithVeto votes.
    pub no_with_veto: f64,
    /// Set to 1 once a veto owner has voted NoWithVeto.
    pub no_with_veto_by_owners: f64,
}

impl ProposalTally {
    fn bucket_mut(&mut self, choice: VoteChoice) -> &mut f64 {
        match choice {
            VoteChoice::Yes => &mut self.yes,
            VoteChoice::No => &mut self.no,
            VoteChoice::NoWithVeto => &mut self.no_with_veto,
            VoteChoice::Abstain => &mut self.abstain,
        }
    }

    /// Returns the weight accumulated for `choice`.
    pub fn get(&self, choice: VoteChoice) -> f64 {
        match choice {
            VoteChoice::Yes => self.yes,
            VoteChoice::No => self.no,
            VoteChoice::NoWithVeto => self.no_with_veto,
            VoteChoice::Abstain => self.abstain,
        }
    }

    /// Adds `weight` to the bucket of `choice`.
    pub fn add(&mut self, choice: VoteChoice, weight: f64) {
        *self.bucket_mut(choice) += weight;
    }

    /// Removes `weight` from the bucket of `choice`.
    pub fn retract(&mut self, choice: VoteChoice, weight: f64) {
        *self.bucket_mut(choice) -= weight;
    }
}

/// A governance proposal on a repository.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Proposal {
    /// The proposal id, unique within its repository.
    pub id: String,
    /// Governance parameters as they were when the proposal was created.
    pub config: GovernanceConfig,
    /// The address that created the proposal.
    pub creator: Address,
    /// Height at which the proposal was created.
    pub height: u64,
    /// Height at which voting ends.
    pub end_at: u64,
    /// Stake acquired after this height does not count towards the proposal.
    pub proposer_max_join_height: u64,
    /// Accumulated votes.
    pub tally: ProposalTally,
    /// Set once the proposal has been finalized; no further votes are accepted.
    pub closed: bool,
}

impl Proposal {
    /// Creates an open proposal with an empty tally.
    pub fn new(
        id: &str,
        config: GovernanceConfig,
        creator: Address,
        height: u64,
        proposer_max_join_height: u64,
    ) -> Self {
        let end_at = height.saturating_add(config.proposal_duration);
        Proposal {
            id: id.to_string(),
            config,
            creator,
            height,
            end_at,
            proposer_max_join_height,
            tally: ProposalTally::default(),
            closed: false,
        }
    }

    /// Whether the proposal has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.closed
    }
}
