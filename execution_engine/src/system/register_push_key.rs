use tracing::debug;

use repochain_types::{transaction::TxRegisterPushKey, PushKey, PushKeyId, Transaction, TxCode};

use super::{debit::debit_account_object, DebitPolicy, SystemContract};
use crate::{engine_config::EngineConfig, error::KeeperResultExt, keepers::Keepers, Error};

/// Registers a push key, overwriting any key with the same id.
pub struct RegisterPushKey<'a, K> {
    keepers: &'a mut K,
    tx: &'a TxRegisterPushKey,
    debit_policy: DebitPolicy,
    chain_height: u64,
}

impl<'a, K: Keepers + 'a> RegisterPushKey<'a, K> {
    /// Binds the contract to a push key registration with an explicit debit policy.
    pub fn with_debit_policy(
        keepers: &'a mut K,
        tx: &'a TxRegisterPushKey,
        chain_height: u64,
        debit_policy: DebitPolicy,
    ) -> Self {
        RegisterPushKey {
            keepers,
            tx,
            debit_policy,
            chain_height,
        }
    }
}

impl<'a, K: Keepers + 'a> SystemContract<'a, K> for RegisterPushKey<'a, K> {
    const TX_CODES: &'static [TxCode] = &[TxCode::RegisterPushKey];

    fn init(
        keepers: &'a mut K,
        _config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error> {
        match tx {
            Transaction::RegisterPushKey(tx) => Ok(RegisterPushKey::with_debit_policy(
                keepers,
                tx,
                chain_height,
                DebitPolicy::Normal,
            )),
            other => Err(Error::UnsupportedTransaction(other.code())),
        }
    }

    fn exec(self) -> Result<(), Error> {
        let address = self.tx.common.sender_pub_key.to_address();
        let account = match self.debit_policy {
            DebitPolicy::Normal => Some(
                self.keepers
                    .get_account(&address)
                    .context("get sender account")?,
            ),
            DebitPolicy::Suppressed => None,
        };

        let id = PushKeyId::from_public_key(&self.tx.public_key);
        let push_key = PushKey {
            pub_key: self.tx.public_key,
            address,
            scopes: self.tx.scopes.clone(),
            fee_cap: self.tx.fee_cap.clone(),
        };
        debug!(%id, %address, "registering push key");
        self.keepers
            .update_push_key(&id, push_key)
            .context("store push key")?;

        match account {
            Some(account) => debit_account_object(
                self.keepers,
                &address,
                account,
                &self.tx.common.fee,
                self.chain_height,
            ),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use repochain_types::{transaction::TxCommon, Account, Decimal, PublicKey};

    use super::*;
    use crate::keepers::{AccountKeeper, InMemoryKeepers, PushKeyKeeper};

    fn register(sender: &PublicKey, key: &PublicKey) -> TxRegisterPushKey {
        TxRegisterPushKey {
            common: TxCommon {
                nonce: 1,
                fee: Decimal::from(2u64),
                sender_pub_key: *sender,
                ..TxCommon::default()
            },
            public_key: *key,
            scopes: vec!["r/alpha".to_string()],
            fee_cap: "0.5".parse().unwrap(),
        }
    }

    fn keepers_with_balance(sender: &PublicKey) -> InMemoryKeepers {
        let mut keepers = InMemoryKeepers::new();
        keepers
            .update_account(
                &sender.to_address(),
                Account {
                    balance: Decimal::from(10u64),
                    ..Account::bare()
                },
            )
            .unwrap();
        keepers
    }

    #[test]
    fn should_store_key_and_debit_fee() {
        let sender = PublicKey::from([1; 32]);
        let key = PublicKey::from([9; 32]);
        let mut keepers = keepers_with_balance(&sender);
        let config = EngineConfig::default();
        let tx = Transaction::RegisterPushKey(register(&sender, &key));

        RegisterPushKey::init(&mut keepers, &config, &tx, 5)
            .unwrap()
            .exec()
            .unwrap();

        let stored = keepers.get_push_key(&key.to_push_key_id()).unwrap();
        assert_eq!(stored.pub_key, key);
        assert_eq!(stored.address, sender.to_address());
        assert_eq!(stored.scopes, vec!["r/alpha"]);
        assert_eq!(stored.fee_cap, "0.5".parse().unwrap());

        let account = keepers.get_account(&sender.to_address()).unwrap();
        assert_eq!(account.balance, Decimal::from(8u64));
        assert_eq!(account.nonce, 1);
    }

    #[test]
    fn suppressed_debit_leaves_account_untouched() {
        let sender = PublicKey::from([1; 32]);
        let key = PublicKey::from([9; 32]);
        let mut keepers = keepers_with_balance(&sender);
        let before = keepers.get_account(&sender.to_address()).unwrap();
        let tx = register(&sender, &key);

        RegisterPushKey::with_debit_policy(&mut keepers, &tx, 5, DebitPolicy::Suppressed)
            .exec()
            .unwrap();

        assert!(!keepers.get_push_key(&key.to_push_key_id()).unwrap().is_nil());
        assert_eq!(keepers.get_account(&sender.to_address()).unwrap(), before);
    }
}
