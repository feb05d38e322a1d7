//! Decoding wire payloads into transfer requests.
//!
//! Simple transfers come as JSON, cross-border transfers and remittances as
//! XML. Each wire shape has its own record type, converted into the domain
//! `TransferRequest` once it has been deserialised.

use crate::ledger::{Amount, TransferRequest, DECIMAL_PRECISION};

use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed XML request: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("request body is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid amount `{0}`")]
    Amount(String),

    #[error("amount cannot be negative: {0}")]
    NegativeAmount(Amount),

    #[error("amount has more than 2 decimal places: {0}")]
    Precision(Amount),
}

/// The three kinds of requests the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Transfer,
    CrossBorder,
    Remittance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl RequestKind {
    pub const fn format(&self) -> Format {
        match self {
            Self::Transfer => Format::Json,
            Self::CrossBorder | Self::Remittance => Format::Xml,
        }
    }
}

/// Decode a payload of the given kind.
pub fn decode(payload: &[u8], kind: RequestKind) -> Result<TransferRequest, DecodeError> {
    match kind {
        RequestKind::Transfer => decode_json(payload),
        RequestKind::CrossBorder => decode_cross_border_xml(payload),
        RequestKind::Remittance => decode_remittance_xml(payload),
    }
}

pub fn decode_json(payload: &[u8]) -> Result<TransferRequest, DecodeError> {
    let record: TransferRecord = serde_json::from_slice(payload)?;
    record.try_into()
}

pub fn decode_cross_border_xml(payload: &[u8]) -> Result<TransferRequest, DecodeError> {
    let record: CrossBorderRecord = quick_xml::de::from_str(std::str::from_utf8(payload)?)?;
    record.try_into()
}

pub fn decode_remittance_xml(payload: &[u8]) -> Result<TransferRequest, DecodeError> {
    let record: RemittanceRecord = quick_xml::de::from_str(std::str::from_utf8(payload)?)?;
    record.try_into()
}

// JSON clients send IDs either as strings or as bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(id) => id,
            RawId::Number(id) => id.to_string(),
        }
    }
}

/// `{"sender_id": "1001", "receiver_id": "1005", "amount": 100.00, "currency": "USD"}`
#[derive(Debug, Deserialize)]
struct TransferRecord {
    sender_id: RawId,
    receiver_id: RawId,
    // A JSON number or a string.
    amount: Amount,
    currency: String,
}

impl TryFrom<TransferRecord> for TransferRequest {
    type Error = DecodeError;
    fn try_from(record: TransferRecord) -> Result<Self, Self::Error> {
        let amount = checked_amount(record.amount)?;

        Ok(Self::simple(
            record.sender_id,
            record.receiver_id,
            amount,
            record.currency,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct CrossBorderRecord {
    #[serde(rename = "Payer")]
    payer: CrossBorderPayer,

    #[serde(rename = "Payee")]
    payee: CrossBorderPayee,

    #[serde(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Deserialize)]
struct CrossBorderPayer {
    #[serde(rename = "SenderID")]
    sender_id: String,

    #[serde(rename = "CountryCodeSender")]
    country: String,
}

#[derive(Debug, Deserialize)]
struct CrossBorderPayee {
    #[serde(rename = "ReceiverID")]
    receiver_id: String,

    #[serde(rename = "CountryCodeReceiver")]
    country: String,
}

impl TryFrom<CrossBorderRecord> for TransferRequest {
    type Error = DecodeError;
    fn try_from(record: CrossBorderRecord) -> Result<Self, Self::Error> {
        let amount = parse_amount(&record.amount)?;

        Ok(Self::cross_border(
            record.payer.sender_id.trim(),
            record.payee.receiver_id.trim(),
            amount,
            record.payer.country.trim(),
            record.payee.country.trim(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct RemittanceRecord {
    #[serde(rename = "Payer")]
    payer: RemittancePayer,

    #[serde(rename = "Payee")]
    payee: RemittancePayee,

    #[serde(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Deserialize)]
struct RemittancePayer {
    #[serde(rename = "SenderIBAN")]
    iban: String,

    #[serde(rename = "SenderID")]
    sender_id: String,

    #[serde(rename = "RemittanceStructured", default)]
    structured: Option<String>,

    #[serde(rename = "RemittanceUnstructured", default)]
    unstructured: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemittancePayee {
    // Existing clients spell it this way.
    #[serde(rename = "RecieverIBAN", alias = "ReceiverIBAN")]
    iban: String,

    #[serde(rename = "ReceiverID")]
    receiver_id: String,
}

impl TryFrom<RemittanceRecord> for TransferRequest {
    type Error = DecodeError;
    fn try_from(record: RemittanceRecord) -> Result<Self, Self::Error> {
        let amount = parse_amount(&record.amount)?;

        Ok(Self::remittance(
            record.payer.sender_id.trim(),
            record.payee.receiver_id.trim(),
            record.payer.iban.trim(),
            record.payee.iban.trim(),
            amount,
            is_set(record.payer.structured.as_deref()),
            is_set(record.payer.unstructured.as_deref()),
        ))
    }
}

fn parse_amount(text: &str) -> Result<Amount, DecodeError> {
    let amount =
        Amount::from_str(text.trim()).map_err(|_| DecodeError::Amount(text.trim().to_string()))?;
    checked_amount(amount)
}

// Amounts must be non-negative and in whole minor units. Trailing zeros
// (`100.000`) are fine.
fn checked_amount(amount: Amount) -> Result<Amount, DecodeError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DecodeError::NegativeAmount(amount));
    }
    if amount.normalize().scale() > DECIMAL_PRECISION {
        return Err(DecodeError::Precision(amount));
    }
    Ok(amount)
}

// Remittance flags are `Yes`/`No` on the wire.
fn is_set(flag: Option<&str>) -> bool {
    matches!(flag.map(str::trim), Some(f) if f.eq_ignore_ascii_case("yes") || f.eq_ignore_ascii_case("true"))
}
