use std::collections::BTreeMap;

use repochain_types::{
    Account, Address, Decimal, PublicKey, PushKey, PushKeyId, Repository, Ticket, VoteChoice,
};

use super::{AccountKeeper, KeeperError, PushKeyKeeper, RepoKeeper, TicketManager};

type VoteKey = (String, String, Address);

/// Keepers backed by ordered in-memory maps.
///
/// Used by tests and by embedders that persist state themselves between blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryKeepers {
    accounts: BTreeMap<Address, Account>,
    repos: BTreeMap<String, Repository>,
    proposal_votes: BTreeMap<VoteKey, VoteChoice>,
    push_keys: BTreeMap<PushKeyId, PushKey>,
    tickets: Vec<Ticket>,
}

impl InMemoryKeepers {
    /// Creates an empty store.
    pub fn new() -> Self {
        InMemoryKeepers::default()
    }

    /// Indexes a ticket. Ticket indexing happens outside the system contracts.
    pub fn add_ticket(&mut self, ticket: Ticket) {
        self.tickets.push(ticket);
    }

    fn live_tickets(&self, max_height: u64) -> impl Iterator<Item = &Ticket> {
        self.tickets
            .iter()
            .filter(move |ticket| ticket.is_live_at(max_height))
    }

    fn sum_tickets<F>(&self, max_height: u64, predicate: F) -> Decimal
    where
        F: Fn(&Ticket) -> bool,
    {
        self.live_tickets(max_height)
            .filter(|ticket| predicate(ticket))
            .map(|ticket| &ticket.value)
            .sum()
    }
}

impl AccountKeeper for InMemoryKeepers {
    fn get_account(&self, address: &Address) -> Result<Account, KeeperError> {
        Ok(self.accounts.get(address).cloned().unwrap_or_default())
    }

    fn update_account(&mut self, address: &Address, account: Account) -> Result<(), KeeperError> {
        self.accounts.insert(*address, account);
        Ok(())
    }
}

impl RepoKeeper for InMemoryKeepers {
    fn get_repo(&self, name: &str) -> Result<Repository, KeeperError> {
        Ok(self.repos.get(name).cloned().unwrap_or_default())
    }

    fn update_repo(&mut self, name: &str, repo: Repository) -> Result<(), KeeperError> {
        self.repos.insert(name.to_string(), repo);
        Ok(())
    }

    fn get_proposal_vote(
        &self,
        repo_name: &str,
        proposal_id: &str,
        voter: &Address,
    ) -> Result<Option<VoteChoice>, KeeperError> {
        let key = (repo_name.to_string(), proposal_id.to_string(), *voter);
        Ok(self.proposal_votes.get(&key).copied())
    }

    fn index_proposal_vote(
        &mut self,
        repo_name: &str,
        proposal_id: &str,
        voter: &Address,
        vote: VoteChoice,
    ) -> Result<(), KeeperError> {
        let key = (repo_name.to_string(), proposal_id.to_string(), *voter);
        self.proposal_votes.insert(key, vote);
        Ok(())
    }
}

impl PushKeyKeeper for InMemoryKeepers {
    fn get_push_key(&self, id: &PushKeyId) -> Result<PushKey, KeeperError> {
        Ok(self.push_keys.get(id).cloned().unwrap_or_default())
    }

    fn update_push_key(&mut self, id: &PushKeyId, push_key: PushKey) -> Result<(), KeeperError> {
        self.push_keys.insert(*id, push_key);
        Ok(())
    }

    fn remove_push_key(&mut self, id: &PushKeyId) -> Result<(), KeeperError> {
        self.push_keys.remove(id);
        Ok(())
    }
}

impl TicketManager for InMemoryKeepers {
    fn value_of_non_delegated_tickets(
        &self,
        proposer: &PublicKey,
        max_height: u64,
    ) -> Result<Decimal, KeeperError> {
        Ok(self.sum_tickets(max_height, |ticket| {
            ticket.proposer_pub_key == *proposer && !ticket.is_delegated()
        }))
    }

    fn value_of_delegated_tickets(
        &self,
        proposer: &PublicKey,
        max_height: u64,
    ) -> Result<Decimal, KeeperError> {
        Ok(self.sum_tickets(max_height, |ticket| {
            ticket.proposer_pub_key == *proposer && ticket.is_delegated()
        }))
    }

    fn get_non_decayed_tickets(
        &self,
        holder: &PublicKey,
        max_height: u64,
    ) -> Result<Vec<Ticket>, KeeperError> {
        let address = holder.to_address();
        Ok(self
            .live_tickets(max_height)
            .filter(|ticket| {
                ticket.proposer_pub_key == *holder || ticket.delegator == Some(address)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use repochain_types::{Digest, TicketType};

    use super::*;

    fn ticket(
        proposer: &PublicKey,
        delegator: Option<&PublicKey>,
        value: u64,
        height: u64,
        unbond_height: u64,
    ) -> Ticket {
        Ticket {
            hash: Digest::hash(format!("{}-{}-{}", proposer, value, height)),
            ticket_type: TicketType::Validator,
            proposer_pub_key: *proposer,
            delegator: delegator.map(PublicKey::to_address),
            value: Decimal::from(value),
            height,
            unbond_height,
        }
    }

    #[test]
    fn missing_records_read_as_bare() {
        let keepers = InMemoryKeepers::new();
        let address = PublicKey::from([1; 32]).to_address();
        assert!(keepers.get_account(&address).unwrap().is_nil());
        assert!(keepers.get_repo("nope").unwrap().is_nil());
        assert!(keepers
            .get_push_key(&PublicKey::from([1; 32]).to_push_key_id())
            .unwrap()
            .is_nil());
        assert_eq!(
            keepers.get_proposal_vote("nope", "1", &address).unwrap(),
            None
        );
    }

    #[test]
    fn vote_index_is_per_repo_proposal_and_voter() {
        let mut keepers = InMemoryKeepers::new();
        let voter = PublicKey::from([1; 32]).to_address();
        keepers
            .index_proposal_vote("repo", "1", &voter, VoteChoice::Yes)
            .unwrap();
        keepers
            .index_proposal_vote("repo", "1", &voter, VoteChoice::Yes)
            .unwrap();
        assert_eq!(
            keepers.get_proposal_vote("repo", "1", &voter).unwrap(),
            Some(VoteChoice::Yes)
        );
        assert_eq!(keepers.get_proposal_vote("repo", "2", &voter).unwrap(), None);
        assert_eq!(keepers.get_proposal_vote("other", "1", &voter).unwrap(), None);
    }

    #[test]
    fn should_split_ticket_values_by_delegation() {
        let proposer = PublicKey::from([1; 32]);
        let delegator = PublicKey::from([2; 32]);
        let mut keepers = InMemoryKeepers::new();
        keepers.add_ticket(ticket(&proposer, None, 10, 1, 0));
        keepers.add_ticket(ticket(&proposer, Some(&proposer), 5, 1, 0));
        keepers.add_ticket(ticket(&proposer, Some(&delegator), 20, 1, 0));

        assert_eq!(
            keepers.value_of_non_delegated_tickets(&proposer, 10).unwrap(),
            Decimal::from(15u64)
        );
        assert_eq!(
            keepers.value_of_delegated_tickets(&proposer, 10).unwrap(),
            Decimal::from(20u64)
        );
    }

    #[test]
    fn should_only_count_tickets_live_at_max_height() {
        let proposer = PublicKey::from([1; 32]);
        let mut keepers = InMemoryKeepers::new();
        keepers.add_ticket(ticket(&proposer, None, 10, 1, 0));
        keepers.add_ticket(ticket(&proposer, None, 20, 8, 0));
        keepers.add_ticket(ticket(&proposer, None, 40, 1, 5));

        assert_eq!(
            keepers.value_of_non_delegated_tickets(&proposer, 6).unwrap(),
            Decimal::from(10u64)
        );
        assert_eq!(keepers.get_non_decayed_tickets(&proposer, 6).unwrap().len(), 1);
        assert_eq!(keepers.get_non_decayed_tickets(&proposer, 8).unwrap().len(), 2);
    }

    #[test]
    fn non_decayed_tickets_include_those_delegated_by_holder() {
        let proposer = PublicKey::from([1; 32]);
        let delegator = PublicKey::from([2; 32]);
        let stranger = PublicKey::from([3; 32]);
        let mut keepers = InMemoryKeepers::new();
        keepers.add_ticket(ticket(&proposer, Some(&delegator), 20, 1, 0));
        keepers.add_ticket(ticket(&stranger, None, 7, 1, 0));

        let held = keepers.get_non_decayed_tickets(&delegator, 2).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].proposer_pub_key, proposer);
        assert_eq!(keepers.get_non_decayed_tickets(&proposer, 2).unwrap().len(), 1);
    }
}
