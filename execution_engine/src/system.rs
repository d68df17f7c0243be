//! System contracts: the native state transitions run for each transaction type.
mod coin_transfer;
mod create_repo;
pub mod debit;
mod delegator_commission;
mod proposal_vote;
mod purchase_ticket;
mod register_push_key;
pub mod tally;
mod update_delete_push_key;

use repochain_types::{Transaction, TxCode};

pub use coin_transfer::CoinTransfer;
pub use create_repo::CreateRepo;
pub use delegator_commission::SetDelegatorCommission;
pub use proposal_vote::ProposalVote;
pub use purchase_ticket::PurchaseTicket;
pub use register_push_key::RegisterPushKey;
pub use update_delete_push_key::UpdateDeletePushKey;

use crate::{engine_config::EngineConfig, keepers::Keepers, Error};

/// Whether a contract charges the sender its fee and advances the sender's nonce.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DebitPolicy {
    /// Charge the fee and advance the nonce.
    Normal,
    /// Do neither; used when the contract runs nested inside another one that already debits.
    Suppressed,
}

/// A native contract bound to one transaction.
pub trait SystemContract<'a, K: Keepers + 'a>: Sized {
    /// Transaction types the contract executes.
    const TX_CODES: &'static [TxCode];

    /// Binds the contract to `tx`, failing if the transaction is of a type it does not execute.
    fn init(
        keepers: &'a mut K,
        config: &'a EngineConfig,
        tx: &'a Transaction,
        chain_height: u64,
    ) -> Result<Self, Error>;

    /// Whether the contract executes transactions of type `code`.
    fn can_exec(code: TxCode) -> bool {
        Self::TX_CODES.contains(&code)
    }

    /// Applies the transaction.
    fn exec(self) -> Result<(), Error>;
}

/// The closed set of system contracts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SystemContractType {
    /// [`CoinTransfer`]
    CoinTransfer,
    /// [`CreateRepo`]
    CreateRepo,
    /// [`RegisterPushKey`]
    RegisterPushKey,
    /// [`UpdateDeletePushKey`]
    UpdateDeletePushKey,
    /// [`SetDelegatorCommission`]
    SetDelegatorCommission,
    /// [`PurchaseTicket`]
    PurchaseTicket,
    /// [`ProposalVote`]
    ProposalVote,
}

impl SystemContractType {
    /// Every system contract.
    pub const ALL: [SystemContractType; 7] = [
        SystemContractType::CoinTransfer,
        SystemContractType::CreateRepo,
        SystemContractType::RegisterPushKey,
        SystemContractType::UpdateDeletePushKey,
        SystemContractType::SetDelegatorCommission,
        SystemContractType::PurchaseTicket,
        SystemContractType::ProposalVote,
    ];

    /// Returns the contract that executes transactions of type `code`.
    pub fn for_code(code: TxCode) -> Self {
        match code {
            TxCode::CoinTransfer => SystemContractType::CoinTransfer,
            TxCode::ValidatorTicket | TxCode::HostTicket => SystemContractType::PurchaseTicket,
            TxCode::SetDelegatorCommission => SystemContractType::SetDelegatorCommission,
            TxCode::RepoCreate => SystemContractType::CreateRepo,
            TxCode::RegisterPushKey => SystemContractType::RegisterPushKey,
            TxCode::UpDelPushKey => SystemContractType::UpdateDeletePushKey,
            TxCode::RepoProposalVote => SystemContractType::ProposalVote,
        }
    }

    /// Whether this contract executes transactions of type `code`.
    pub fn can_exec<K: Keepers>(self, code: TxCode) -> bool {
        match self {
            SystemContractType::CoinTransfer => CoinTransfer::<K>::can_exec(code),
            SystemContractType::CreateRepo => CreateRepo::<K>::can_exec(code),
            SystemContractType::RegisterPushKey => RegisterPushKey::<K>::can_exec(code),
            SystemContractType::UpdateDeletePushKey => UpdateDeletePushKey::<K>::can_exec(code),
            SystemContractType::SetDelegatorCommission => {
                SetDelegatorCommission::<K>::can_exec(code)
            }
            SystemContractType::PurchaseTicket => PurchaseTicket::<K>::can_exec(code),
            SystemContractType::ProposalVote => ProposalVote::<K>::can_exec(code),
        }
    }

    /// Binds this contract to `tx` and executes it.
    pub fn exec<K: Keepers>(
        self,
        keepers: &mut K,
        config: &EngineConfig,
        tx: &Transaction,
        chain_height: u64,
    ) -> Result<(), Error> {
        match self {
            SystemContractType::CoinTransfer => {
                CoinTransfer::init(keepers, config, tx, chain_height)?.exec()
            }
            SystemContractType::CreateRepo => {
                CreateRepo::init(keepers, config, tx, chain_height)?.exec()
            }
            SystemContractType::RegisterPushKey => {
                RegisterPushKey::init(keepers, config, tx, chain_height)?.exec()
            }
            SystemContractType::UpdateDeletePushKey => {
                UpdateDeletePushKey::init(keepers, config, tx, chain_height)?.exec()
            }
            SystemContractType::SetDelegatorCommission => {
                SetDelegatorCommission::init(keepers, config, tx, chain_height)?.exec()
            }
            SystemContractType::PurchaseTicket => {
                PurchaseTicket::init(keepers, config, tx, chain_height)?.exec()
            }
            SystemContractType::ProposalVote => {
                ProposalVote::init(keepers, config, tx, chain_height)?.exec()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keepers::InMemoryKeepers;

    const ALL_CODES: [TxCode; 8] = [
        TxCode::CoinTransfer,
        TxCode::ValidatorTicket,
        TxCode::SetDelegatorCommission,
        TxCode::HostTicket,
        TxCode::RepoCreate,
        TxCode::RegisterPushKey,
        TxCode::UpDelPushKey,
        TxCode::RepoProposalVote,
    ];

    #[test]
    fn every_code_has_exactly_one_contract() {
        for code in ALL_CODES {
            let executors: Vec<_> = SystemContractType::ALL
                .iter()
                .filter(|contract| contract.can_exec::<InMemoryKeepers>(code))
                .collect();
            assert_eq!(executors, vec![&SystemContractType::for_code(code)]);
        }
    }
}
