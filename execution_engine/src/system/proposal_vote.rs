use tracing::debug;

use repochain_types::{
    transaction::TxRepoProposalVote, Account, GovernanceConfig, TallyMethod, Transaction, TxCode,
    VoteChoice, VoterType,
};

use super::{debit::debit_account_object, tally::resolve_ticket_contribution, SystemContract};
use crate::{engine_config::EngineConfig, error::KeeperResultExt, keepers::Keepers, Error};

/// Weight a vote adds to its bucket, and the weight that moves out of other buckets.
struct VoteWeight {
    increments: f64,
    retractions: Vec<(VoteChoice, f64)>,
}

impl VoteWeight {
    fn plain(increments: f64) -> Self {
        VoteWeight {
            increments,
            retractions: vec![],
        }
    }
}

/// Casts a vote on a repository proposal.
///
/// The proposal's own copy of the governance config decides how the vote is weighed. A voter can
/// vote once per proposal, and only while the proposal is open.
pub struct ProposalVote<'a, K> {
    keepers: &'a mut K,
    tx: &'a TxRepoProposalVote,
    chain_height: u64,
}

impl<'a, K: Keepers + 'a> ProposalVote<'a, K> {
    fn weigh(
        &self,
        config: &GovernanceConfig,
        proposer_max_join_height: u64,
        account: &Account,
    ) -> Result<VoteWeight, Error> {
        let voter = &self.tx.common.sender_pub_key;
        let weight = match config.tally_method {
            TallyMethod::Identity => VoteWeight::plain(1.0),
            TallyMethod::CoinWeighted => {
                VoteWeight::plain(account.get_available_balance(self.chain_height).to_f64())
            }
            TallyMethod::NetStakeNonDelegated => {
                let value = self
                    .keepers
                    .value_of_non_delegated_tickets(voter, proposer_max_join_height)
                    .context("get value of non-delegated tickets")?;
                VoteWeight::plain(value.to_f64())
            }
            TallyMethod::NetStakeOfDelegators => {
                let value = self
                    .keepers
                    .value_of_delegated_tickets(voter, proposer_max_join_height)
                    .context("get value of delegated tickets")?;
                VoteWeight::plain(value.to_f64())
            }
            TallyMethod::NetStake => {
                let tickets = self
                    .keepers
                    .get_non_decayed_tickets(voter, proposer_max_join_height)
                    .context("get non-decayed tickets")?;
                let mut weight = VoteWeight::plain(0.0);
                for ticket in &tickets {
                    let contribution = resolve_ticket_contribution(ticket, voter, |address| {
                        self.keepers.get_proposal_vote(
                            &self.tx.repo_name,
                            &self.tx.proposal_id,
                            address,
                        )
                    })
                    .context("get prior proposal vote")?;
                    weight.increments += contribution.value;
                    if let Some(bucket) = contribution.retract_from {
                        weight.retractions.push((bucket, contribution.value));
                    }
                }
                weight
            }
        };
        Ok(weight)
    }
}

impl<'a, K: Keepers + 'a> SystemContract<'a, K> for ProposalVote<'a, K> {
    const TX_CODES: &'static [TxCode] = &[TxCode::RepoProposalVote];

    fn init(
        keepers: &'a mut K,
        _config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error> {
        match tx {
            Transaction::RepoProposalVote(tx) => Ok(ProposalVote {
                keepers,
                tx,
                chain_height,
            }),
            other => Err(Error::UnsupportedTransaction(other.code())),
        }
    }

    fn exec(self) -> Result<(), Error> {
        let tx = self.tx;
        let address = tx.common.sender_pub_key.to_address();

        let mut repo = self
            .keepers
            .get_repo(&tx.repo_name)
            .context("get repository")?;
        if repo.is_nil() {
            return Err(Error::RepoNotFound(tx.repo_name.clone()));
        }
        let mut proposal = repo
            .proposals
            .remove(&tx.proposal_id)
            .ok_or_else(|| Error::ProposalNotFound {
                repo_name: tx.repo_name.clone(),
                proposal_id: tx.proposal_id.clone(),
            })?;
        if proposal.is_finalized() {
            return Err(Error::ProposalClosed(tx.proposal_id.clone()));
        }
        let prior = self
            .keepers
            .get_proposal_vote(&tx.repo_name, &tx.proposal_id, &address)
            .context("get proposal vote")?;
        if prior.is_some() {
            return Err(Error::AlreadyVoted {
                proposal_id: tx.proposal_id.clone(),
                voter: address,
            });
        }

        let config = proposal.config.clone();
        let owner = repo.owner(&address).cloned();
        if config.tally_method.requires_owner_voter() && owner.is_none() {
            return Err(Error::NotAnOwner {
                voter: address,
                tally_method: config.tally_method,
            });
        }

        let account = self
            .keepers
            .get_account(&address)
            .context("get sender account")?;
        let weight = self.weigh(&config, proposal.proposer_max_join_height, &account)?;

        for (bucket, value) in &weight.retractions {
            proposal.tally.retract(*bucket, *value);
        }
        proposal.tally.add(tx.vote, weight.increments);

        let is_veto_owner = owner.map_or(false, |owner| owner.veto);
        if tx.vote == VoteChoice::NoWithVeto
            && config.voter == VoterType::NetStakersAndVetoOwner
            && is_veto_owner
        {
            proposal.tally.no_with_veto_by_owners = 1.0;
        }

        debug!(
            repo = %tx.repo_name,
            proposal = %tx.proposal_id,
            voter = %address,
            vote = %tx.vote,
            weight = weight.increments,
            migrated = weight.retractions.len(),
            "counted proposal vote"
        );
        repo.proposals.insert(tx.proposal_id.clone(), proposal);
        self.keepers
            .update_repo(&tx.repo_name, repo)
            .context("store repository")?;
        self.keepers
            .index_proposal_vote(&tx.repo_name, &tx.proposal_id, &address, tx.vote)
            .context("index proposal vote")?;

        debit_account_object(
            self.keepers,
            &address,
            account,
            &tx.common.fee,
            self.chain_height,
        )
    }
}
