use serde::{Deserialize, Serialize};

use crate::{Address, Decimal, Digest, PublicKey};

/// The kind of a ticket.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    /// Ticket of a block validator.
    Validator,
    /// Ticket of a storage host.
    Host,
}

/// A stake record, optionally delegated to another proposer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ticket {
    /// Hash of the purchasing transaction.
    pub hash: Digest,
    /// The kind of ticket.
    pub ticket_type: TicketType,
    /// The proposer the ticket stakes for.
    pub proposer_pub_key: PublicKey,
    /// The address that bought the ticket on the proposer's behalf; `None` when self-staked.
    pub delegator: Option<Address>,
    /// Staked value.
    pub value: Decimal,
    /// Height at which the ticket was bought.
    pub height: u64,
    /// Height at which the ticket decays; `0` means never.
    pub unbond_height: u64,
}

impl Ticket {
    /// Whether the ticket was bought by someone other than its proposer.
    pub fn is_delegated(&self) -> bool {
        match &self.delegator {
            Some(delegator) => *delegator != self.proposer_pub_key.to_address(),
            None => false,
        }
    }

    /// Whether the ticket counts at `height`: bought by then and not yet decayed.
    pub fn is_live_at(&self, height: u64) -> bool {
        self.height <= height && (self.unbond_height == 0 || self.unbond_height > height)
    }
}
