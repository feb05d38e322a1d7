use super::error::{EngineError, Overflow, TransferError};
use super::transfer::TransferRequest;
use super::{Account, AccountId, Amount, CountryCode, Ledger};
use crate::repository::{RepositoryError, UserRepository};

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Countries no cross-border transfer may involve, unless configured otherwise.
pub const DEFAULT_BLACKLIST: [&str; 3] = ["RUS", "PRK", "IRN"];

/// What a successful transfer reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub fee: Amount,
    pub message: String,
}

/// Validates transfers against the ledger and applies them.
///
/// The ledger sits behind a mutex. Checking the accounts, moving the funds and
/// persisting the result happen under a single lock, so two concurrent
/// transfers from the same account can never both pass the balance check.
pub struct TransferEngine {
    ledger: Mutex<Ledger>,
    repository: Arc<dyn UserRepository>,
    blacklist: HashSet<CountryCode>,
}

impl TransferEngine {
    pub fn new(ledger: Ledger, repository: Arc<dyn UserRepository>) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            repository,
            blacklist: DEFAULT_BLACKLIST.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Load the ledger from the repository and build an engine on top of it.
    pub fn load(repository: Arc<dyn UserRepository>) -> Result<Self, RepositoryError> {
        let ledger = repository.load()?;
        if ledger.is_empty() {
            tracing::warn!("ledger loaded without any account, every transfer will be rejected");
        } else {
            tracing::info!(accounts = ledger.len(), "ledger loaded");
        }

        Ok(Self::new(ledger, repository))
    }

    pub fn with_blacklist<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CountryCode>,
    {
        self.blacklist = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_blacklisted(&self, country: &str) -> bool {
        self.blacklist.contains(country)
    }

    /// Current state of one account.
    pub fn account(&self, id: &str) -> Option<Account> {
        self.ledger.lock().get(id).cloned()
    }

    pub fn balance(&self, id: &str) -> Option<Amount> {
        self.ledger.lock().get(id).map(Account::balance)
    }

    /// A copy of the whole ledger.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.lock().clone()
    }

    /// Validate the request, move the funds, persist the ledger.
    ///
    /// Checks run in a fixed order, and the first failing one is reported:
    /// 1. policy: blacklisted country (cross-border), same IBAN (remittance);
    /// 2. the sender exists;
    /// 3. the receiver exists;
    /// 4. the sender covers the amount plus the fee.
    ///
    /// Nothing is mutated unless every check passes. If persisting fails, the
    /// ledger is restored to what it was before the call.
    pub fn execute(&self, request: &TransferRequest) -> Result<Receipt, EngineError> {
        let sender_id = request.sender();
        let receiver_id = request.receiver();
        let amount = request.amount();

        // Policy checks don't need the ledger.
        self.check_policy(request)?;

        let mut ledger = self.ledger.lock();

        let sender = ledger
            .get(sender_id)
            .ok_or(TransferError::UnknownSender)?;
        if !ledger.contains(receiver_id) {
            return Err(TransferError::UnknownReceiver.into());
        }

        let fee = request.fee();
        // A debit too large to represent is one no balance covers.
        let total_debit = match amount.checked_add(fee) {
            Some(total) if sender.covers(total) => total,
            _ => return Err(TransferError::InsufficientBalance.into()),
        };

        let previous = (
            snapshot_balance(&ledger, sender_id),
            snapshot_balance(&ledger, receiver_id),
        );

        if let Err(err) = apply(&mut ledger, sender_id, receiver_id, total_debit, amount) {
            restore(&mut ledger, previous);
            return Err(err.into());
        }

        if let Err(err) = self.repository.save(&ledger) {
            restore(&mut ledger, previous);
            tracing::error!(
                error = %err,
                sender = sender_id,
                receiver = receiver_id,
                "ledger could not be persisted, transfer rolled back"
            );
            return Err(err.into());
        }

        tracing::info!(
            variant = request.variant(),
            sender = sender_id,
            receiver = receiver_id,
            %amount,
            %fee,
            "transfer applied"
        );

        Ok(Receipt {
            fee,
            message: success_message(request, fee),
        })
    }

    fn check_policy(&self, request: &TransferRequest) -> Result<(), TransferError> {
        match request {
            TransferRequest::CrossBorder {
                sender_country,
                receiver_country,
                ..
            } => {
                if self.is_blacklisted(sender_country) || self.is_blacklisted(receiver_country) {
                    return Err(TransferError::BlacklistedCountry);
                }
            }
            TransferRequest::Remittance {
                sender_iban,
                receiver_iban,
                ..
            } => {
                if sender_iban == receiver_iban {
                    return Err(TransferError::SameIban);
                }
            }
            TransferRequest::Simple { .. } => {}
        }

        Ok(())
    }
}

// Both accounts were checked to exist before this is called. Sender and
// receiver may be the same account, in which case only the fee leaves it.
fn apply(
    ledger: &mut Ledger,
    sender_id: &str,
    receiver_id: &str,
    total_debit: Amount,
    amount: Amount,
) -> Result<(), Overflow> {
    if let Some(sender) = ledger.get_mut(sender_id) {
        sender.debit(total_debit)?;
    }
    if let Some(receiver) = ledger.get_mut(receiver_id) {
        receiver.credit(amount)?;
    }

    Ok(())
}

type Previous = ((AccountId, Option<Amount>), (AccountId, Option<Amount>));

fn snapshot_balance(ledger: &Ledger, id: &str) -> (AccountId, Option<Amount>) {
    (id.to_string(), ledger.get(id).map(Account::balance))
}

// Both balances were captured before either side was touched, so restoring
// them in any order is fine, even when sender and receiver are the same.
fn restore(ledger: &mut Ledger, (sender, receiver): Previous) {
    for (id, balance) in [receiver, sender] {
        if let (Some(account), Some(balance)) = (ledger.get_mut(&id), balance) {
            account.balance = balance;
        }
    }
}

fn success_message(request: &TransferRequest, fee: Amount) -> String {
    match request {
        TransferRequest::Remittance { .. } => format!(
            "Successful transaction, fee applied: {}, ledger has been updated",
            fee
        ),
        TransferRequest::Simple { .. } | TransferRequest::CrossBorder { .. } => {
            "Successful transaction, ledger has been updated".to_string()
        }
    }
}
