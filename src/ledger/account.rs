use super::error::Overflow;
use super::{AccountId, Amount, CountryCode};

/// A user account, as held by the ledger.
///
/// The balance is a plain signed decimal: nothing here forbids a negative
/// balance, the engine is the one refusing transfers that would overdraw.
/// Arithmetic is checked, so a transfer can never silently wrap a balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub country: CountryCode,
    pub(super) balance: Amount,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, country: impl Into<CountryCode>, balance: Amount) -> Self {
        Self {
            id: id.into(),
            country: country.into(),
            balance,
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub(super) fn credit(&mut self, amount: Amount) -> Result<(), Overflow> {
        self.balance = self.balance.checked_add(amount).ok_or(Overflow)?;

        Ok(())
    }

    pub(super) fn debit(&mut self, amount: Amount) -> Result<(), Overflow> {
        self.balance = self.balance.checked_sub(amount).ok_or(Overflow)?;

        Ok(())
    }

    /// Whether the account can cover a debit of `amount`.
    pub fn covers(&self, amount: Amount) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::{Account, Overflow};

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_credit() {
        let mut acc = Account::new("1001", "USA", dec!(10.00));
        acc.credit(dec!(7.25)).expect("should not overflow");

        assert_eq!(dec!(17.25), acc.balance());
    }

    #[test]
    fn test_credit_overflow() {
        let very_big_number = Decimal::from_str("70000000000000000000000000000").unwrap();
        let mut acc = Account::new("1001", "USA", very_big_number);

        assert_eq!(Err(Overflow), acc.credit(very_big_number));
        assert_eq!(very_big_number, acc.balance());
    }

    #[test]
    fn test_debit() {
        let mut acc = Account::new("1001", "USA", dec!(10.00));
        acc.debit(dec!(7.25)).expect("should not overflow");

        assert_eq!(dec!(2.75), acc.balance());
    }

    #[test]
    // Debits are not bounded by the balance here; overdraft is refused by the engine.
    fn test_debit_below_zero() {
        let mut acc = Account::new("1001", "USA", dec!(5));
        acc.debit(dec!(10)).expect("should not overflow");

        assert_eq!(dec!(-5), acc.balance());
    }

    #[test]
    fn test_debit_overflow() {
        let very_big_number = Decimal::from_str("70000000000000000000000000000").unwrap();
        let mut acc = Account::new("1001", "USA", -very_big_number);

        assert_eq!(Err(Overflow), acc.debit(very_big_number));
    }

    #[test]
    fn test_covers() {
        let acc = Account::new("1001", "USA", dec!(500.00));

        for (amount, want) in vec![
            (dec!(0), true),
            (dec!(499.99), true),
            (dec!(500.00), true),
            (dec!(500.01), false),
            (dec!(600), false),
        ] {
            assert_eq!(want, acc.covers(amount), "covering {}", amount);
        }
    }
}
