use tracing::debug;

use repochain_types::{
    transaction::{TxCommon, TxRegisterPushKey, TxRepoCreate},
    Decimal, FeeMode, RepoContributor, RepoOwner, Repository, Transaction, TxCode, VoterType,
};

use super::{debit::debit_account_object, DebitPolicy, RegisterPushKey, SystemContract};
use crate::{engine_config::EngineConfig, error::KeeperResultExt, keepers::Keepers, Error};

/// Creates a repository.
///
/// The sender pays `fee + value` in one debit while `value` is credited to the new repository.
/// When the default config asks for it, the creator's key is registered as a push key and a
/// contributor without a second debit.
pub struct CreateRepo<'a, K> {
    keepers: &'a mut K,
    config: &'a EngineConfig,
    tx: &'a TxRepoCreate,
    chain_height: u64,
}

impl<'a, K: Keepers + 'a> CreateRepo<'a, K> {
    fn build_repo(&self) -> Result<Repository, Error> {
        let tx = self.tx;
        let created_at = self.chain_height.saturating_add(1);

        let mut repo = Repository::bare();
        repo.description = tx.description.clone();
        repo.created_at = created_at;

        repo.config = self.config.default_repo_config.clone();
        repo.config.merge(&tx.config)?;
        if repo.config.policies.is_empty() {
            repo.config.policies = self.config.default_policies.clone();
        }

        if !tx.value.is_zero() {
            repo.balance = &repo.balance + &tx.value;
        }

        let voter = repo.config.governance.voter;
        if matches!(voter, VoterType::Owner | VoterType::NetStakersAndVetoOwner) {
            repo.add_owner(
                tx.common.sender_pub_key.to_address(),
                RepoOwner {
                    creator: true,
                    joined_at: created_at,
                    veto: voter == VoterType::NetStakersAndVetoOwner,
                },
            );
        }

        Ok(repo)
    }

    fn creator_push_key(&self) -> TxRegisterPushKey {
        let sender = self.tx.common.sender_pub_key;
        TxRegisterPushKey {
            common: TxCommon {
                nonce: self.tx.common.nonce,
                fee: Decimal::zero(),
                timestamp: self.tx.common.timestamp,
                sender_pub_key: sender,
                signature: vec![],
            },
            public_key: sender,
            scopes: vec![],
            fee_cap: Decimal::zero(),
        }
    }
}

impl<'a, K: Keepers + 'a> SystemContract<'a, K> for CreateRepo<'a, K> {
    const TX_CODES: &'static [TxCode] = &[TxCode::RepoCreate];

    fn init(
        keepers: &'a mut K,
        config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error> {
        match tx {
            Transaction::RepoCreate(tx) => Ok(CreateRepo {
                keepers,
                config,
                tx,
                chain_height,
            }),
            other => Err(Error::UnsupportedTransaction(other.code())),
        }
    }

    fn exec(self) -> Result<(), Error> {
        let tx = self.tx;
        let sender = tx.common.sender_pub_key;
        let address = sender.to_address();

        let existing = self.keepers.get_repo(&tx.name).context("get repository")?;
        if !existing.is_nil() {
            return Err(Error::RepoExists(tx.name.clone()));
        }
        let account = self
            .keepers
            .get_account(&address)
            .context("get sender account")?;
        let mut repo = self.build_repo()?;

        // The flag is read from the default config, not the merged one.
        if self
            .config
            .default_repo_config
            .governance
            .creator_as_contributor
        {
            let push_key_tx = self.creator_push_key();
            RegisterPushKey::with_debit_policy(
                &mut *self.keepers,
                &push_key_tx,
                self.chain_height,
                DebitPolicy::Suppressed,
            )
            .exec()?;
            repo.contributors.insert(
                sender.to_push_key_id(),
                RepoContributor {
                    fee_mode: FeeMode::PusherPays,
                    fee_cap: Decimal::zero(),
                    policies: vec![],
                },
            );
        }

        debug!(
            name = %tx.name,
            creator = %address,
            value = %tx.value,
            owners = repo.owners.len(),
            "creating repository"
        );
        self.keepers
            .update_repo(&tx.name, repo)
            .context("store repository")?;

        let amount = &tx.common.fee + &tx.value;
        debit_account_object(self.keepers, &address, account, &amount, self.chain_height)
    }
}
