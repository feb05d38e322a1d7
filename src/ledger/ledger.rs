use super::account::Account;
use super::AccountId;

use std::collections::HashMap;

/// All known accounts, keyed by user ID.
///
/// The ledger is loaded once from the repository, then mutated in place by
/// the engine, one transfer at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    accounts: HashMap<AccountId, Account>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account, replacing any previous account with the same ID.
    pub fn insert(&mut self, account: Account) -> Option<Account> {
        self.accounts.insert(account.id.clone(), account)
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub(super) fn get_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts sorted by ID, so that what gets written out is stable from
    /// one save to the next.
    pub fn sorted(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        accounts
    }
}

impl FromIterator<Account> for Ledger {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        let mut ledger = Ledger::new();
        for account in iter {
            ledger.insert(account);
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::{Account, Ledger};

    use rust_decimal_macros::dec;

    #[test]
    fn test_lookup() {
        let ledger: Ledger = vec![
            Account::new("1001", "USA", dec!(500.00)),
            Account::new("1005", "FRA", dec!(300.00)),
        ]
        .into_iter()
        .collect();

        assert_eq!(2, ledger.len());
        assert!(ledger.contains("1001"));
        assert!(!ledger.contains("1002"));
        assert_eq!(Some(dec!(300.00)), ledger.get("1005").map(Account::balance));
    }

    #[test]
    // The last account with a given ID wins, like rows of a file read top to bottom.
    fn test_insert_replaces() {
        let mut ledger = Ledger::new();
        assert_eq!(None, ledger.insert(Account::new("1001", "USA", dec!(1))));

        let previous = ledger.insert(Account::new("1001", "USA", dec!(2)));
        assert_eq!(Some(dec!(1)), previous.map(|acc| acc.balance()));
        assert_eq!(1, ledger.len());
        assert_eq!(Some(dec!(2)), ledger.get("1001").map(Account::balance));
    }

    #[test]
    fn test_sorted() {
        let ledger: Ledger = vec![
            Account::new("c", "USA", dec!(0)),
            Account::new("a", "USA", dec!(0)),
            Account::new("b", "USA", dec!(0)),
        ]
        .into_iter()
        .collect();

        let ids: Vec<&str> = ledger.sorted().iter().map(|acc| acc.id.as_str()).collect();
        assert_eq!(vec!["a", "b", "c"], ids);
    }
}
