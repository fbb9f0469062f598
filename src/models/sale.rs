use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A completed sale as stored in the customer history table. Device fields
/// are copied from the inventory snapshot at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub device_name: String,
    pub brand: String,
    pub battery: i64,
    pub imei: String,
    pub price_original: f64,
    pub price_sold: f64,
    pub sold_at: DateTime<Utc>,
}

/// Sale dialog submission. Everything arrives raw; validation happens in the
/// workflow so a bad field is a clear message, not a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaleForm {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub price_sold: Value,
    pub sold_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneRef {
    pub name: String,
}

/// A row of the normalized sales table. `phone` resolves through the gateway
/// join and is `None` once the referenced inventory row is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub phone_id: i64,
    pub imei: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub price_at_sale: f64,
    pub sold_at: DateTime<Utc>,
    #[serde(default)]
    pub phone: Option<PhoneRef>,
}
