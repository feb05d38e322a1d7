//! HTTP routes.
//!
//! - `POST /transfer`: simple transfer, JSON
//! - `POST /xmltransfer`: cross-border transfer, XML
//! - `POST /remittance`: remittance, XML
//! - `GET /accounts/{id}`: current state of an account
//! - `GET /health`
//!
//! Failures are answered with `{"error": <message>, "kind": <stable id>}`.

use crate::input::{self, RequestKind};
use crate::ledger::{
    round_to_minor_unit, Account, Amount, EngineError, TransferEngine, TransferError,
    DECIMAL_PRECISION,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// How business rule failures are turned into status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCodes {
    /// 4xx codes.
    Conventional,
    /// The non-standard 512-516 codes older clients were built against.
    Legacy,
}

impl StatusCodes {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            Self::Legacy
        } else {
            Self::Conventional
        }
    }

    pub fn for_error(self, err: TransferError) -> StatusCode {
        match self {
            Self::Conventional => match err {
                TransferError::BlacklistedCountry => StatusCode::FORBIDDEN,
                TransferError::SameIban => StatusCode::UNPROCESSABLE_ENTITY,
                TransferError::UnknownSender | TransferError::UnknownReceiver => {
                    StatusCode::NOT_FOUND
                }
                TransferError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Legacy => {
                let code = match err {
                    TransferError::InsufficientBalance => 512,
                    TransferError::UnknownSender => 513,
                    TransferError::UnknownReceiver => 514,
                    TransferError::BlacklistedCountry => 515,
                    TransferError::SameIban => 516,
                };
                StatusCode::from_u16(code).unwrap_or(StatusCode::UNPROCESSABLE_ENTITY)
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    engine: Arc<TransferEngine>,
    status_codes: StatusCodes,
}

impl AppState {
    pub fn new(engine: Arc<TransferEngine>, status_codes: StatusCodes) -> Self {
        Self {
            engine,
            status_codes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/transfer", post(transfer))
        .route("/xmltransfer", post(xml_transfer))
        .route("/remittance", post(remittance))
        .route("/accounts/{id}", get(account))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct TransferResponse {
    message: String,
    fee: String,
}

#[derive(Debug, Serialize)]
struct AccountResponse {
    user_id: String,
    country: String,
    balance: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            balance: format_amount(account.balance()),
            user_id: account.id,
            country: account.country,
        }
    }
}

async fn transfer(State(state): State<AppState>, body: Bytes) -> Response {
    handle(state, RequestKind::Transfer, body).await
}

async fn xml_transfer(State(state): State<AppState>, body: Bytes) -> Response {
    handle(state, RequestKind::CrossBorder, body).await
}

async fn remittance(State(state): State<AppState>, body: Bytes) -> Response {
    handle(state, RequestKind::Remittance, body).await
}

async fn account(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.engine.account(&id) {
        Some(account) => Json(AccountResponse::from(account)).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "not_found", "account not found"),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle(state: AppState, kind: RequestKind, body: Bytes) -> Response {
    let request = match input::decode(&body, kind) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(?kind, error = %err, "malformed transfer request");
            return json_error(StatusCode::BAD_REQUEST, "malformed_request", err.to_string());
        }
    };

    // Persisting rewrites a file while holding the ledger lock, keep it off
    // the async workers.
    let engine = Arc::clone(&state.engine);
    let result = tokio::task::spawn_blocking(move || engine.execute(&request)).await;

    match result {
        Ok(Ok(receipt)) => (
            StatusCode::OK,
            Json(TransferResponse {
                message: receipt.message,
                fee: format_amount(receipt.fee),
            }),
        )
            .into_response(),
        Ok(Err(EngineError::Transfer(err))) => {
            tracing::warn!(?kind, kind_id = err.kind(), "transfer rejected: {}", err);
            json_error(state.status_codes.for_error(err), err.kind(), err.to_string())
        }
        Ok(Err(err)) => {
            tracing::error!(?kind, error = %err, "transfer failed");
            internal_error()
        }
        Err(err) => {
            tracing::error!(?kind, error = %err, "transfer task did not complete");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal error, transaction was not processed",
    )
}

pub fn json_error(status: StatusCode, kind: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": message.into(),
            "kind": kind,
        })),
    )
        .into_response()
}

// Amounts always go out with the minor unit, e.g. `1.00` rather than `1`.
fn format_amount(amount: Amount) -> String {
    let mut amount = round_to_minor_unit(amount);
    amount.rescale(DECIMAL_PRECISION);
    amount.to_string()
}
