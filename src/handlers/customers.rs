use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use super::decode_rows;
use crate::errors::AppError;
use crate::models::{SaleRecord, CUSTOMERS};
use crate::query::CustomerFilter;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub rows: Vec<SaleRecord>,
    pub seq: u64,
    pub stale: bool,
}

impl CustomerListResponse {
    fn stale(seq: u64) -> Self {
        Self {
            rows: Vec::new(),
            seq,
            stale: true,
        }
    }
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<CustomerListResponse>, AppError> {
    let seq = state.sequences.customers.begin();
    let fetched = state.gateway.select(&filter.to_select()).await;
    if !state.sequences.customers.is_current(seq) {
        return Ok(Json(CustomerListResponse::stale(seq)));
    }

    let rows: Vec<SaleRecord> = decode_rows(fetched?)?;
    Ok(Json(CustomerListResponse {
        rows,
        seq,
        stale: false,
    }))
}

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending: i64,
}

pub async fn request_delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<PendingResponse> {
    state.pending.lock().await.customers.request(id);
    Json(PendingResponse { pending: id })
}

pub async fn confirm_delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut pending = state.pending.lock().await;
    if !pending.customers.matches(id) {
        return Err(AppError::conflict("no delete pending for this record"));
    }
    // A failed remote delete leaves the mark in place for another confirm.
    state.gateway.delete(CUSTOMERS, id).await?;
    pending.customers.clear();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_delete_customer(State(state): State<AppState>) -> StatusCode {
    state.pending.lock().await.customers.cancel();
    StatusCode::NO_CONTENT
}
