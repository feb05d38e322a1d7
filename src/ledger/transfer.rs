use super::{round_to_minor_unit, AccountId, Amount, CountryCode, Iban};

use rust_decimal_macros::dec;

/// Fee rate for a remittance with structured remittance information.
pub const STRUCTURED_FEE_RATE: Amount = dec!(0.01);

/// Fee rate for a remittance with unstructured remittance information.
pub const UNSTRUCTURED_FEE_RATE: Amount = dec!(0.015);

/// A normalized transfer request, whatever wire format it came in.
///
/// All three variants move `amount` from `sender` to `receiver`. They only
/// differ in the policy checks applied before, and in the fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    Simple {
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        // Informational only, balances are not converted.
        currency: String,
    },
    CrossBorder {
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        sender_country: CountryCode,
        receiver_country: CountryCode,
    },
    Remittance {
        sender: AccountId,
        receiver: AccountId,
        sender_iban: Iban,
        receiver_iban: Iban,
        amount: Amount,
        structured: bool,
        unstructured: bool,
    },
}

// The constructors ensure amounts carry at most the currency minor unit precision.
impl TransferRequest {
    pub fn simple(
        sender: impl Into<AccountId>,
        receiver: impl Into<AccountId>,
        amount: Amount,
        currency: impl Into<String>,
    ) -> Self {
        Self::Simple {
            sender: sender.into(),
            receiver: receiver.into(),
            amount: round_to_minor_unit(amount),
            currency: currency.into(),
        }
    }

    pub fn cross_border(
        sender: impl Into<AccountId>,
        receiver: impl Into<AccountId>,
        amount: Amount,
        sender_country: impl Into<CountryCode>,
        receiver_country: impl Into<CountryCode>,
    ) -> Self {
        Self::CrossBorder {
            sender: sender.into(),
            receiver: receiver.into(),
            amount: round_to_minor_unit(amount),
            sender_country: sender_country.into(),
            receiver_country: receiver_country.into(),
        }
    }

    pub fn remittance(
        sender: impl Into<AccountId>,
        receiver: impl Into<AccountId>,
        sender_iban: impl Into<Iban>,
        receiver_iban: impl Into<Iban>,
        amount: Amount,
        structured: bool,
        unstructured: bool,
    ) -> Self {
        Self::Remittance {
            sender: sender.into(),
            receiver: receiver.into(),
            sender_iban: sender_iban.into(),
            receiver_iban: receiver_iban.into(),
            amount: round_to_minor_unit(amount),
            structured,
            unstructured,
        }
    }

    pub fn sender(&self) -> &str {
        match self {
            Self::Simple { sender, .. }
            | Self::CrossBorder { sender, .. }
            | Self::Remittance { sender, .. } => sender,
        }
    }

    pub fn receiver(&self) -> &str {
        match self {
            Self::Simple { receiver, .. }
            | Self::CrossBorder { receiver, .. }
            | Self::Remittance { receiver, .. } => receiver,
        }
    }

    /// The amount credited to the receiver.
    pub fn amount(&self) -> Amount {
        match self {
            Self::Simple { amount, .. }
            | Self::CrossBorder { amount, .. }
            | Self::Remittance { amount, .. } => *amount,
        }
    }

    /// The fee retained on top of the amount.
    ///
    /// Only remittances bear a fee. Structured remittance information takes
    /// precedence over unstructured when both flags are set. The fee is
    /// rounded to the minor unit before anything else looks at it, so the
    /// balance check, the debit and the reported fee all agree.
    pub fn fee(&self) -> Amount {
        match self {
            Self::Remittance {
                amount,
                structured,
                unstructured,
                ..
            } => {
                let rate = if *structured {
                    STRUCTURED_FEE_RATE
                } else if *unstructured {
                    UNSTRUCTURED_FEE_RATE
                } else {
                    return Amount::ZERO;
                };
                round_to_minor_unit(*amount * rate)
            }
            Self::Simple { .. } | Self::CrossBorder { .. } => Amount::ZERO,
        }
    }

    /// Short name of the variant, for logs.
    pub const fn variant(&self) -> &'static str {
        match self {
            Self::Simple { .. } => "simple",
            Self::CrossBorder { .. } => "cross_border",
            Self::Remittance { .. } => "remittance",
        }
    }
}
