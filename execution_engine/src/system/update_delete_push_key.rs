use tracing::debug;

use repochain_types::{transaction::TxUpDelPushKey, Transaction, TxCode};

use super::{debit::debit_account_object, SystemContract};
use crate::{engine_config::EngineConfig, error::KeeperResultExt, keepers::Keepers, Error};

/// Updates the scopes and fee cap of a push key, or deletes it.
///
/// Scope indices refer to the list as stored before the update. Removal happens before new
/// scopes are appended. The fee is charged in both branches.
pub struct UpdateDeletePushKey<'a, K> {
    keepers: &'a mut K,
    tx: &'a TxUpDelPushKey,
    chain_height: u64,
}

impl<'a, K: Keepers + 'a> SystemContract<'a, K> for UpdateDeletePushKey<'a, K> {
    const TX_CODES: &'static [TxCode] = &[TxCode::UpDelPushKey];

    fn init(
        keepers: &'a mut K,
        _config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error> {
        match tx {
            Transaction::UpDelPushKey(tx) => Ok(UpdateDeletePushKey {
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
        let mut push_key = self
            .keepers
            .get_push_key(&tx.id)
            .context("get push key")?;
        if push_key.is_nil() {
            return Err(Error::PushKeyNotFound(tx.id));
        }
        let account = self
            .keepers
            .get_account(&address)
            .context("get sender account")?;

        if tx.delete {
            debug!(id = %tx.id, "deleting push key");
            self.keepers
                .remove_push_key(&tx.id)
                .context("remove push key")?;
        } else {
            push_key.remove_scopes(&tx.remove_scopes);
            push_key.scopes.extend(tx.add_scopes.iter().cloned());
            if let Some(fee_cap) = &tx.fee_cap {
                push_key.fee_cap = fee_cap.clone();
            }
            debug!(id = %tx.id, scopes = push_key.scopes.len(), "updating push key");
            self.keepers
                .update_push_key(&tx.id, push_key)
                .context("store push key")?;
        }

        debit_account_object(
            self.keepers,
            &address,
            account,
            &tx.common.fee,
            self.chain_height,
        )
    }
}
