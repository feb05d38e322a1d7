//! Handles user balances through a ledger, and the transfers applied to it.
//!
//! Ledger: contains the accounts of all the users, keyed by user ID.
//! Transfer: one of the three request variants the service accepts.
//! Engine: validates a transfer against the ledger, applies it and persists the result.

pub mod account;
pub mod engine;
pub mod error;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod transfer;

pub use account::Account;
pub use engine::{Receipt, TransferEngine};
pub use error::{EngineError, TransferError};
pub use ledger::Ledger;
pub use transfer::TransferRequest;

// Using named types doesn't provide any compiler help, but it helps a lot with
// readability.
// Consider the following, when creating the ledger HashMap:
// (1) accounts: HashMap<String, Account>
// (2) accounts: HashMap<AccountId, Account>
// Implementation (2) is self-explanatory.
pub type AccountId = String;
pub type CountryCode = String;
pub type Iban = String;

// Money is never stored as a float: balances are loaded from text, and
// repeated float arithmetic would drift across transfers.
pub type Amount = rust_decimal::Decimal;

/// Currency minor unit. Amounts and fees are rounded to this many places.
pub const DECIMAL_PRECISION: u32 = 2;

/// Round an amount to the currency minor unit, half to even.
pub fn round_to_minor_unit(amount: Amount) -> Amount {
    amount.round_dp_with_strategy(
        DECIMAL_PRECISION,
        rust_decimal::RoundingStrategy::MidpointNearestEven,
    )
}
