//! The shared ledger-debit primitive.
//!
//! All three entry points produce the same state for equivalent inputs: the amount is subtracted
//! from the balance, the nonce advances by one and stakes that unbonded by `chain_height` are
//! dropped.
use repochain_types::{Account, Address, Decimal, PublicKey};

use crate::{error::KeeperResultExt, keepers::AccountKeeper, Error};

/// Applies a debit to an account in place. Sufficiency of the balance is checked before
/// execution, so the balance is not guarded against going negative here.
pub(crate) fn charge(account: &mut Account, amount: &Decimal, chain_height: u64) {
    account.balance = &account.balance - amount;
    account.nonce += 1;
    account.clean(chain_height);
}

/// Debits the account of `sender`.
pub fn debit_account<K: AccountKeeper + ?Sized>(
    keeper: &mut K,
    sender: &PublicKey,
    amount: &Decimal,
    chain_height: u64,
) -> Result<(), Error> {
    debit_account_by_address(keeper, &sender.to_address(), amount, chain_height)
}

/// Debits the account at `address`.
pub fn debit_account_by_address<K: AccountKeeper + ?Sized>(
    keeper: &mut K,
    address: &Address,
    amount: &Decimal,
    chain_height: u64,
) -> Result<(), Error> {
    let account = keeper
        .get_account(address)
        .context("get account to debit")?;
    debit_account_object(keeper, address, account, amount, chain_height)
}

/// Debits an already loaded `account` and stores it at `address`.
pub fn debit_account_object<K: AccountKeeper + ?Sized>(
    keeper: &mut K,
    address: &Address,
    mut account: Account,
    amount: &Decimal,
    chain_height: u64,
) -> Result<(), Error> {
    charge(&mut account, amount, chain_height);
    keeper
        .update_account(address, account)
        .context("update debited account")
}

#[cfg(test)]
mod tests {
    use repochain_types::StakeType;

    use super::*;
    use crate::keepers::InMemoryKeepers;

    fn funded(keepers: &mut InMemoryKeepers, sender: &PublicKey) -> Account {
        let mut account = Account::bare();
        account.balance = Decimal::from(100u64);
        account.nonce = 4;
        account.stakes.add(StakeType::Validator, Decimal::from(5u64), 10);
        account.stakes.add(StakeType::Host, Decimal::from(7u64), 0);
        keepers
            .update_account(&sender.to_address(), account.clone())
            .unwrap();
        account
    }

    #[test]
    fn should_subtract_advance_nonce_and_clean() {
        let sender = PublicKey::from([1; 32]);
        let mut keepers = InMemoryKeepers::new();
        funded(&mut keepers, &sender);

        debit_account(&mut keepers, &sender, &"1.5".parse().unwrap(), 10).unwrap();

        let account = keepers.get_account(&sender.to_address()).unwrap();
        assert_eq!(account.balance, "98.5".parse().unwrap());
        assert_eq!(account.nonce, 5);
        assert_eq!(account.stakes.len(), 1);
        assert_eq!(account.get_available_balance(10), "91.5".parse().unwrap());
    }

    #[test]
    fn entry_points_agree() {
        let sender = PublicKey::from([1; 32]);
        let address = sender.to_address();
        let amount: Decimal = "2.25".parse().unwrap();

        let mut by_key = InMemoryKeepers::new();
        funded(&mut by_key, &sender);
        debit_account(&mut by_key, &sender, &amount, 3).unwrap();

        let mut by_address = InMemoryKeepers::new();
        funded(&mut by_address, &sender);
        debit_account_by_address(&mut by_address, &address, &amount, 3).unwrap();

        let mut by_object = InMemoryKeepers::new();
        let account = funded(&mut by_object, &sender);
        debit_account_object(&mut by_object, &address, account, &amount, 3).unwrap();

        let expected = by_key.get_account(&address).unwrap();
        assert_eq!(by_address.get_account(&address).unwrap(), expected);
        assert_eq!(by_object.get_account(&address).unwrap(), expected);
    }

    #[test]
    fn should_allow_overdraft() {
        let sender = PublicKey::from([1; 32]);
        let mut keepers = InMemoryKeepers::new();
        debit_account(&mut keepers, &sender, &Decimal::from(3u64), 1).unwrap();
        let account = keepers.get_account(&sender.to_address()).unwrap();
        assert_eq!(account.balance, Decimal::from(-3i64));
        assert_eq!(account.nonce, 1);
    }
}
