pub mod customers;
pub mod phones;
pub mod sales;

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::gateway::GatewayError;
use crate::models::{Phone, CUSTOMERS, PHONES};
use crate::query::Select;
use crate::AppState;

pub(crate) fn decode_row<T: serde::de::DeserializeOwned>(row: Value) -> Result<T, AppError> {
    serde_json::from_value(row)
        .map_err(|e| AppError::Gateway(GatewayError::Decode(e.to_string())))
}

pub(crate) fn decode_rows<T: serde::de::DeserializeOwned>(
    rows: Vec<Value>,
) -> Result<Vec<T>, AppError> {
    rows.into_iter().map(decode_row).collect()
}

pub async fn banner() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub inventory_models: usize,
    pub inventory_units: i64,
    pub sale_records: usize,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, AppError> {
    let phones: Vec<Phone> = decode_rows(state.gateway.select(&Select::new(PHONES)).await?)?;
    let sale_records = state.gateway.select(&Select::new(CUSTOMERS)).await?.len();

    Ok(Json(Stats {
        inventory_models: phones.len(),
        inventory_units: phones.iter().map(|p| p.stock).sum(),
        sale_records,
    }))
}

#[derive(Debug, Serialize)]
pub struct BrandSummary {
    pub brand: String,
    pub models: usize,
    pub units: i64,
}

/// Distinct brands currently in stock, derived from the inventory table.
pub async fn brands(State(state): State<AppState>) -> Result<Json<Vec<BrandSummary>>, AppError> {
    let query = Select::new(PHONES).columns("brand,stock");
    let rows = state.gateway.select(&query).await?;

    let mut by_brand: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for row in rows {
        let brand = row
            .get("brand")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("(unknown)")
            .to_string();
        let stock = row.get("stock").and_then(Value::as_i64).unwrap_or(0);
        let entry = by_brand.entry(brand).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += stock;
    }

    let summaries = by_brand
        .into_iter()
        .map(|(brand, (models, units))| BrandSummary {
            brand,
            models,
            units,
        })
        .collect();
    Ok(Json(summaries))
}
