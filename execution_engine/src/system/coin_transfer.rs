use tracing::debug;

use repochain_types::{
    transaction::{Recipient, TxCoinTransfer},
    Transaction, TxCode,
};

use super::{
    debit::{charge, debit_account_object},
    SystemContract,
};
use crate::{engine_config::EngineConfig, error::KeeperResultExt, keepers::Keepers, Error};

/// Moves coins from the sender to an account or a repository.
///
/// The sender is debited `fee + value`; the recipient is credited `value`.
pub struct CoinTransfer<'a, K> {
    keepers: &'a mut K,
    tx: &'a TxCoinTransfer,
    chain_height: u64,
}

impl<'a, K: Keepers + 'a> SystemContract<'a, K> for CoinTransfer<'a, K> {
    const TX_CODES: &'static [TxCode] = &[TxCode::CoinTransfer];

    fn init(
        keepers: &'a mut K,
        _config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error> {
        match tx {
            Transaction::CoinTransfer(tx) => Ok(CoinTransfer {
                keepers,
                tx,
                chain_height,
            }),
            other => Err(Error::UnsupportedTransaction(other.code())),
        }
    }

    fn exec(self) -> Result<(), Error> {
        let tx = self.tx;
        let sender = tx.common.sender_pub_key.to_address();
        let mut account = self
            .keepers
            .get_account(&sender)
            .context("get sender account")?;
        let amount = &tx.common.fee + &tx.value;

        match &tx.to {
            Recipient::Account(recipient) if *recipient == sender => {
                debug!(%sender, value = %tx.value, "transferring coins to self");
                charge(&mut account, &amount, self.chain_height);
                account.balance = &account.balance + &tx.value;
                self.keepers
                    .update_account(&sender, account)
                    .context("update sender account")
            }
            Recipient::Account(recipient) => {
                let mut credited = self
                    .keepers
                    .get_account(recipient)
                    .context("get recipient account")?;
                debug!(%sender, %recipient, value = %tx.value, "transferring coins to account");
                credited.balance = &credited.balance + &tx.value;
                self.keepers
                    .update_account(recipient, credited)
                    .context("update recipient account")?;
                debit_account_object(self.keepers, &sender, account, &amount, self.chain_height)
            }
            Recipient::Repo(name) => {
                let mut repo = self.keepers.get_repo(name).context("get repository")?;
                if repo.is_nil() {
                    return Err(Error::RepoNotFound(name.clone()));
                }
                debug!(%sender, repo = %name, value = %tx.value, "transferring coins to repository");
                repo.balance = &repo.balance + &tx.value;
                self.keepers
                    .update_repo(name, repo)
                    .context("update repository")?;
                debit_account_object(self.keepers, &sender, account, &amount, self.chain_height)
            }
        }
    }
}
