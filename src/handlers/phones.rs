use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use super::{decode_row, decode_rows};
use crate::errors::AppError;
use crate::models::{Phone, PhonePayload, SaleForm, SaleRecord, PHONES};
use crate::query::{Op, PhoneFilter, Predicate, Select};
use crate::workflow::SaleDraft;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PhoneListResponse {
    pub rows: Vec<Phone>,
    pub total_stock: i64,
    pub seq: u64,
    pub stale: bool,
}

impl PhoneListResponse {
    fn stale(seq: u64) -> Self {
        Self {
            rows: Vec::new(),
            total_stock: 0,
            seq,
            stale: true,
        }
    }
}

/// Inventory list. A response that lost the race to a newer filter request
/// is flagged stale and carries no rows.
pub async fn list_phones(
    State(state): State<AppState>,
    Query(filter): Query<PhoneFilter>,
) -> Result<Json<PhoneListResponse>, AppError> {
    let seq = state.sequences.phones.begin();
    let fetched = state.gateway.select(&filter.to_select()).await;
    if !state.sequences.phones.is_current(seq) {
        return Ok(Json(PhoneListResponse::stale(seq)));
    }

    let rows: Vec<Phone> = decode_rows(fetched?)?;
    let total_stock = rows.iter().map(|p| p.stock).sum();
    Ok(Json(PhoneListResponse {
        rows,
        total_stock,
        seq,
        stale: false,
    }))
}

pub async fn create_phone(
    State(state): State<AppState>,
    Json(payload): Json<PhonePayload>,
) -> Result<(StatusCode, Json<Phone>), AppError> {
    payload.validate().map_err(AppError::Validation)?;
    let created = state.gateway.insert(PHONES, &payload.to_record()).await?;
    let phone: Phone = decode_row(created)?;
    Ok((StatusCode::CREATED, Json(phone)))
}

pub async fn update_phone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PhonePayload>,
) -> Result<Json<Phone>, AppError> {
    payload.validate().map_err(AppError::Validation)?;
    let updated = state
        .gateway
        .update(PHONES, id, &payload.to_record())
        .await?;
    if updated.is_null() {
        return Err(AppError::NotFound);
    }
    let phone: Phone = decode_row(updated)?;
    Ok(Json(phone))
}

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending: i64,
}

pub async fn request_delete_phone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<PendingResponse> {
    state.pending.lock().await.phones.request(id);
    Json(PendingResponse { pending: id })
}

pub async fn confirm_delete_phone(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut pending = state.pending.lock().await;
    if !pending.phones.matches(id) {
        return Err(AppError::conflict("no delete pending for this record"));
    }
    // A failed remote delete leaves the mark in place for another confirm.
    state.gateway.delete(PHONES, id).await?;
    pending.phones.clear();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_delete_phone(State(state): State<AppState>) -> StatusCode {
    state.pending.lock().await.phones.cancel();
    StatusCode::NO_CONTENT
}

/// Opens the sale dialog: fetches the phone fresh and captures the snapshot
/// the sale will be built from.
pub async fn open_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SaleDraft>, AppError> {
    let query = Select::new(PHONES).filter(Predicate::new("id", Op::Eq, id.to_string()));
    let rows = state.gateway.select(&query).await?;
    let row = rows.into_iter().next().ok_or(AppError::NotFound)?;
    let snapshot: Phone = decode_row(row)?;

    let draft = state.sale.lock().await.open(snapshot);
    Ok(Json(draft))
}

pub async fn submit_sale(
    State(state): State<AppState>,
    Json(form): Json<SaleForm>,
) -> Result<(StatusCode, Json<SaleRecord>), AppError> {
    let record = state
        .sale
        .lock()
        .await
        .submit(state.gateway.as_ref(), &form)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn cancel_sale(State(state): State<AppState>) -> StatusCode {
    state.sale.lock().await.cancel();
    StatusCode::NO_CONTENT
}
