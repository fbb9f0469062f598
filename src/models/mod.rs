pub mod phone;
pub mod sale;

// Re-export only the types we actually use
pub use phone::{Phone, PhonePayload};
pub use sale::{PhoneRef, Sale, SaleForm, SaleRecord};

/// Gateway table names.
pub const PHONES: &str = "phones";
pub const CUSTOMERS: &str = "customers";
pub const SALES: &str = "sales";

pub(crate) fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub(crate) fn coerce_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}
