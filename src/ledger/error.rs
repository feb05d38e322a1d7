use crate::repository::RepositoryError;

use thiserror::Error;

/// A business rule refused the transfer.
///
/// When several rules are broken at once, only one is reported. The engine
/// checks them in the order of declaration below, policy first, then account
/// existence, then funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TransferError {
    /// A cross-border transfer involves a blacklisted country.
    #[error("Transaction rejected, blacklisted country involved")]
    BlacklistedCountry,

    /// A remittance is sent to the IBAN it comes from.
    #[error("Transaction rejected, sender and receiver IBAN cannot be the same")]
    SameIban,

    #[error("Invalid sender account ID, transaction was not processed")]
    UnknownSender,

    #[error("Invalid receiver account ID, transaction was not processed")]
    UnknownReceiver,

    /// The sender cannot cover the amount plus fee.
    #[error("Invalid balance, transaction was not processed")]
    InsufficientBalance,
}

impl TransferError {
    /// Stable identifier, safe to match on from clients.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BlacklistedCountry => "blacklisted_country",
            Self::SameIban => "same_iban",
            Self::UnknownSender => "unknown_sender",
            Self::UnknownReceiver => "unknown_receiver",
            Self::InsufficientBalance => "insufficient_balance",
        }
    }
}

/// Balance arithmetic left the range of the decimal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("balance arithmetic overflowed")]
pub struct Overflow;

/// Everything `TransferEngine::execute` can fail with.
///
/// Only `Transfer` is the caller's fault. The other variants are
/// infrastructure failures, and the ledger is left untouched when they happen.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("failed to persist the ledger: {0}")]
    Persistence(#[from] RepositoryError),

    #[error(transparent)]
    Overflow(#[from] Overflow),
}

impl EngineError {
    /// The business rule failure, if that is what this is.
    pub fn as_transfer(&self) -> Option<TransferError> {
        match self {
            Self::Transfer(err) => Some(*err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TransferError;

    #[test]
    // Messages are part of the wire contract with existing clients.
    fn test_messages() {
        for (err, kind, message) in vec![
            (
                TransferError::BlacklistedCountry,
                "blacklisted_country",
                "Transaction rejected, blacklisted country involved",
            ),
            (
                TransferError::SameIban,
                "same_iban",
                "Transaction rejected, sender and receiver IBAN cannot be the same",
            ),
            (
                TransferError::UnknownSender,
                "unknown_sender",
                "Invalid sender account ID, transaction was not processed",
            ),
            (
                TransferError::UnknownReceiver,
                "unknown_receiver",
                "Invalid receiver account ID, transaction was not processed",
            ),
            (
                TransferError::InsufficientBalance,
                "insufficient_balance",
                "Invalid balance, transaction was not processed",
            ),
        ] {
            assert_eq!(kind, err.kind());
            assert_eq!(message, err.to_string());
        }
    }
}
