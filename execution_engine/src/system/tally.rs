//! Conversion of a ticket into vote weight under the `NetStake` tally method.
use repochain_types::{Address, PublicKey, Ticket, VoteChoice};

/// What a single ticket adds to a voter's weight.
#[derive(Clone, Debug, PartialEq)]
pub struct TicketContribution {
    /// Weight added to the voter's chosen bucket.
    pub value: f64,
    /// Bucket the same weight must first be removed from, because it was already counted under
    /// another voter's choice.
    pub retract_from: Option<VoteChoice>,
}

impl TicketContribution {
    fn counted(value: f64) -> Self {
        TicketContribution {
            value,
            retract_from: None,
        }
    }

    fn migrated(value: f64, from: VoteChoice) -> Self {
        TicketContribution {
            value,
            retract_from: Some(from),
        }
    }

    fn none() -> Self {
        TicketContribution::counted(0.0)
    }
}

/// Resolves how much of `ticket` counts towards the vote of `voter`.
///
/// `prior_vote` returns the vote an address has already cast on the proposal, if any.
///
/// * Self-staked tickets, including those the voter delegated to themself, count in full.
/// * A ticket delegated to the voter counts only while its delegator has not voted. Once the
///   delegator votes, the ticket follows the delegator's choice instead.
/// * A ticket the voter delegated to another proposer counts in full. If that proposer already
///   voted, the value was counted under the proposer's choice and migrates from that bucket.
/// * Any other ticket contributes nothing.
pub fn resolve_ticket_contribution<F, E>(
    ticket: &Ticket,
    voter: &PublicKey,
    mut prior_vote: F,
) -> Result<TicketContribution, E>
where
    F: FnMut(&Address) -> Result<Option<VoteChoice>, E>,
{
    let value = ticket.value.to_f64();
    let voter_address = voter.to_address();
    let is_proposer = ticket.proposer_pub_key == *voter;

    if !ticket.is_delegated() {
        return Ok(if is_proposer {
            TicketContribution::counted(value)
        } else {
            TicketContribution::none()
        });
    }

    let delegator = match ticket.delegator {
        Some(delegator) => delegator,
        None => return Ok(TicketContribution::none()),
    };

    if is_proposer {
        return Ok(match prior_vote(&delegator)? {
            Some(_) => TicketContribution::none(),
            None => TicketContribution::counted(value),
        });
    }

    if delegator == voter_address {
        let proposer = ticket.proposer_pub_key.to_address();
        return Ok(match prior_vote(&proposer)? {
            Some(choice) => TicketContribution::migrated(value, choice),
            None => TicketContribution::counted(value),
        });
    }

    Ok(TicketContribution::none())
}
