//! Contains types and constants associated with user accounts.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Decimal;

/// Key prefix of stakes backing validator tickets.
pub const STAKE_TYPE_VALIDATOR: &str = "v";
/// Key prefix of stakes backing host tickets.
pub const STAKE_TYPE_HOST: &str = "s";

/// The kind of ticket a stake entry backs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeType {
    /// Stake locked by a validator ticket.
    Validator,
    /// Stake locked by a host ticket.
    Host,
}

impl StakeType {
    /// Returns the key prefix used for stake entries of this type.
    pub fn prefix(&self) -> &'static str {
        match self {
            StakeType::Validator => STAKE_TYPE_VALIDATOR,
            StakeType::Host => STAKE_TYPE_HOST,
        }
    }
}

/// A single stake entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StakeInfo {
    /// The staked value.
    pub value: Decimal,
    /// Height at which the stake unbonds; `0` means it never does on its own.
    pub unbond_height: u64,
}

impl StakeInfo {
    /// Whether the stake still counts against the spendable balance at `height`.
    pub fn is_locked_at(&self, height: u64) -> bool {
        self.unbond_height == 0 || self.unbond_height > height
    }
}

/// The stakes of an account keyed by `"{type}{index}"`, e.g. `"v0"` or `"s1"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stakes(BTreeMap<String, StakeInfo>);

impl Stakes {
    /// Adds a stake entry under the lowest free index of `stake_type`, returning its key.
    pub fn add(&mut self, stake_type: StakeType, value: Decimal, unbond_height: u64) -> String {
        let key = (0u64..)
            .map(|index| format!("{}{}", stake_type.prefix(), index))
            .find(|key| !self.0.contains_key(key))
            .unwrap_or_default();
        self.0.insert(
            key.clone(),
            StakeInfo {
                value,
                unbond_height,
            },
        );
        key
    }

    /// Returns the entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&StakeInfo> {
        self.0.get(key)
    }

    /// Sum of all stake values still locked at `height`.
    pub fn total_locked(&self, height: u64) -> Decimal {
        self.0
            .values()
            .filter(|stake| stake.is_locked_at(height))
            .map(|stake| &stake.value)
            .sum()
    }

    /// Drops entries whose unbond height has been reached.
    pub fn clean(&mut self, height: u64) {
        self.0
            .retain(|_, stake| stake.unbond_height == 0 || stake.unbond_height > height);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StakeInfo)> {
        self.0.iter()
    }
}

/// A user account.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    /// Total coins held, including staked coins.
    pub balance: Decimal,
    /// Number of transactions executed from this account.
    pub nonce: u64,
    /// Coins locked by tickets.
    pub stakes: Stakes,
    /// Percentage of delegated-ticket rewards kept by this account as a proposer.
    pub delegator_commission: f64,
}

impl Account {
    /// Returns an account with zero balance, nonce and commission.
    pub fn bare() -> Self {
        Account::default()
    }

    /// Whether this is the value returned for an address that was never written.
    pub fn is_nil(&self) -> bool {
        *self == Account::bare()
    }

    /// The part of the balance not locked by stakes at `height`.
    pub fn get_available_balance(&self, height: u64) -> Decimal {
        &self.balance - &self.stakes.total_locked(height)
    }

    /// Drops stakes that have unbonded by `height`.
    pub fn clean(&mut self, height: u64) {
        self.stakes.clean(height);
    }
}
