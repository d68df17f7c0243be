//! Entry point for executing decoded transactions.
use tracing::{debug, warn};

use repochain_types::Transaction;

use crate::{engine_config::EngineConfig, keepers::Keepers, system::SystemContractType, Error};

/// Applies transactions to state held by a set of keepers.
///
/// Transactions are assumed to be admitted already: signature, nonce sequence and fee
/// sufficiency are checked before they reach the engine.
#[derive(Clone, Debug, Default)]
pub struct ExecutionEngine {
    config: EngineConfig,
}

impl ExecutionEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        ExecutionEngine { config }
    }

    /// Returns the engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Executes `tx` against `keepers` with the chain at `chain_height`.
    ///
    /// Execution is one-shot. Whether a failed transaction is still charged is left to the
    /// caller.
    pub fn execute<K: Keepers>(
        &self,
        keepers: &mut K,
        tx: &Transaction,
        chain_height: u64,
    ) -> Result<(), Error> {
        let code = tx.code();
        let contract = SystemContractType::for_code(code);
        let common = tx.common();
        debug!(
            %code,
            ?contract,
            chain_height,
            sender = %common.sender_pub_key.to_address(),
            nonce = common.nonce,
            "executing transaction"
        );

        contract
            .exec(keepers, &self.config, tx, chain_height)
            .map_err(|error| {
                warn!(%error, %code, chain_height, "transaction failed");
                error
            })
    }
}
