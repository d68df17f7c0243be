use tracing::debug;

use repochain_types::{transaction::TxTicketPurchase, StakeType, Transaction, TxCode};

use super::{debit::debit_account_object, SystemContract};
use crate::{engine_config::EngineConfig, error::KeeperResultExt, keepers::Keepers, Error};

/// Buys a validator or host ticket.
///
/// Only the fee is spent. The ticket value stays in the sender's balance as a stake, which
/// validator tickets release once their unbond height is reached and host tickets never do.
/// Indexing the ticket itself is done by the ticket manager once the block is committed.
pub struct PurchaseTicket<'a, K> {
    keepers: &'a mut K,
    config: &'a EngineConfig,
    tx: &'a TxTicketPurchase,
    stake_type: StakeType,
    chain_height: u64,
}

impl<'a, K: Keepers + 'a> PurchaseTicket<'a, K> {
    fn unbond_height(&self) -> u64 {
        match self.stake_type {
            StakeType::Validator => self.config.ticket.validator_unbond_height(self.chain_height),
            StakeType::Host => 0,
        }
    }
}

impl<'a, K: Keepers + 'a> SystemContract<'a, K> for PurchaseTicket<'a, K> {
    const TX_CODES: &'static [TxCode] = &[TxCode::ValidatorTicket, TxCode::HostTicket];

    fn init(
        keepers: &'a mut K,
        config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error> {
        let (tx, stake_type) = match tx {
            Transaction::ValidatorTicket(tx) => (tx, StakeType::Validator),
            Transaction::HostTicket(tx) => (tx, StakeType::Host),
            other => return Err(Error::UnsupportedTransaction(other.code())),
        };
        Ok(PurchaseTicket {
            keepers,
            config,
            tx,
            stake_type,
            chain_height,
        })
    }

    fn exec(self) -> Result<(), Error> {
        let address = self.tx.common.sender_pub_key.to_address();
        let mut account = self
            .keepers
            .get_account(&address)
            .context("get sender account")?;

        let unbond_height = self.unbond_height();
        let stake_key = account
            .stakes
            .add(self.stake_type, self.tx.value.clone(), unbond_height);
        debug!(%address, %stake_key, value = %self.tx.value, unbond_height, "staked ticket value");

        debit_account_object(
            self.keepers,
            &address,
            account,
            &self.tx.common.fee,
            self.chain_height,
        )
    }
}
