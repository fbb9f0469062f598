use axum::extract::State;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decode_rows;
use crate::errors::AppError;
use crate::models::{Sale, SALES};
use crate::query::{Dir, Select};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SaleView {
    pub id: i64,
    pub phone_id: i64,
    pub display_name: String,
    pub imei: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub price_at_sale: f64,
    pub sold_at: DateTime<Utc>,
}

impl From<Sale> for SaleView {
    fn from(sale: Sale) -> Self {
        // A deleted phone leaves the join empty; fall back to the raw id.
        let display_name = sale
            .phone
            .map(|p| p.name)
            .unwrap_or_else(|| sale.phone_id.to_string());
        Self {
            id: sale.id,
            phone_id: sale.phone_id,
            display_name,
            imei: sale.imei,
            customer_name: sale.customer_name,
            customer_phone: sale.customer_phone,
            price_at_sale: sale.price_at_sale,
            sold_at: sale.sold_at,
        }
    }
}

/// Normalized sale history, newest first, device names resolved through the
/// gateway join.
pub async fn list_sales(State(state): State<AppState>) -> Result<Json<Vec<SaleView>>, AppError> {
    let query = Select::new(SALES)
        .columns("*, phone:phones(name)")
        .order("sold_at", Dir::Desc);
    let rows = state.gateway.select(&query).await?;
    let sales: Vec<Sale> = decode_rows(rows)?;
    Ok(Json(sales.into_iter().map(SaleView::from).collect()))
}
