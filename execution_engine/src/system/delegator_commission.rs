use tracing::debug;

use repochain_types::{transaction::TxSetDelegatorCommission, Transaction, TxCode};

use super::{debit::debit_account_object, SystemContract};
use crate::{engine_config::EngineConfig, error::KeeperResultExt, keepers::Keepers, Error};

/// Sets the share of delegated rewards a proposer keeps.
pub struct SetDelegatorCommission<'a, K> {
    keepers: &'a mut K,
    tx: &'a TxSetDelegatorCommission,
    chain_height: u64,
}

impl<'a, K: Keepers + 'a> SystemContract<'a, K> for SetDelegatorCommission<'a, K> {
    const TX_CODES: &'static [TxCode] = &[TxCode::SetDelegatorCommission];

    fn init(
        keepers: &'a mut K,
        _config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error> {
        match tx {
            Transaction::SetDelegatorCommission(tx) => Ok(SetDelegatorCommission {
                keepers,
                tx,
                chain_height,
            }),
            other => Err(Error::UnsupportedTransaction(other.code())),
        }
    }

    fn exec(self) -> Result<(), Error> {
        let address = self.tx.common.sender_pub_key.to_address();
        let mut account = self
            .keepers
            .get_account(&address)
            .context("get sender account")?;

        // Stored as a plain float, unlike balances.
        account.delegator_commission = self.tx.commission;
        debug!(%address, commission = self.tx.commission, "setting delegator commission");

        debit_account_object(
            self.keepers,
            &address,
            account,
            &self.tx.common.fee,
            self.chain_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use repochain_types::{
        transaction::{TxCommon, TxTicketPurchase},
        Account, Decimal, PublicKey,
    };

    use super::*;
    use crate::keepers::{AccountKeeper, InMemoryKeepers};

    fn commission_tx(sender: &PublicKey, commission: f64, fee: &str) -> Transaction {
        Transaction::SetDelegatorCommission(TxSetDelegatorCommission {
            common: TxCommon {
                nonce: 1,
                fee: fee.parse().unwrap(),
                sender_pub_key: *sender,
                ..TxCommon::default()
            },
            commission,
        })
    }

    #[test]
    fn should_set_commission_and_debit_fee() {
        let sender = PublicKey::from([1; 32]);
        let mut keepers = InMemoryKeepers::new();
        keepers
            .update_account(
                &sender.to_address(),
                Account {
                    balance: Decimal::from(10u64),
                    delegator_commission: 15.4,
                    ..Account::bare()
                },
            )
            .unwrap();

        let config = EngineConfig::default();
        let tx = commission_tx(&sender, 23.5, "2");
        SetDelegatorCommission::init(&mut keepers, &config, &tx, 0)
            .unwrap()
            .exec()
            .unwrap();

        let account = keepers.get_account(&sender.to_address()).unwrap();
        assert_eq!(account.delegator_commission, 23.5);
        assert_eq!(account.balance, Decimal::from(8u64));
        assert_eq!(account.nonce, 1);
    }

    #[test]
    fn should_refuse_other_transactions() {
        let mut keepers = InMemoryKeepers::new();
        let config = EngineConfig::default();
        let tx = Transaction::HostTicket(TxTicketPurchase {
            common: TxCommon::default(),
            value: Decimal::from(1u64),
            delegate: None,
        });
        assert_matches!(
            SetDelegatorCommission::init(&mut keepers, &config, &tx, 0).err(),
            Some(Error::UnsupportedTransaction(TxCode::HostTicket))
        );
    }
}
