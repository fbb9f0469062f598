use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{coerce_f64, coerce_i64};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub battery: i64,
    pub price: f64,
    pub stock: i64,
    pub imei: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/update body for an inventory record. Numeric fields accept either
/// JSON numbers or strings and coerce to zero when unparsable, matching the
/// form behavior the views rely on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhonePayload {
    pub name: String,
    pub brand: String,
    pub battery: Value,
    pub price: Value,
    pub stock: Value,
    pub imei: String,
}

impl Default for PhonePayload {
    fn default() -> Self {
        Self {
            name: String::new(),
            brand: String::new(),
            battery: Value::Null,
            price: Value::Null,
            stock: Value::Null,
            imei: String::new(),
        }
    }
}

impl PhonePayload {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.brand.trim().is_empty() {
            return Err("brand is required".to_string());
        }
        if self.imei.trim().is_empty() {
            return Err("imei is required".to_string());
        }
        Ok(())
    }

    pub fn to_record(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "brand": self.brand.trim(),
            "battery": coerce_i64(&self.battery).unwrap_or(0),
            "price": coerce_f64(&self.price).unwrap_or(0.0),
            "stock": coerce_i64(&self.stock).unwrap_or(0),
            "imei": self.imei.trim(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_coerces_string_numerics() {
        let payload: PhonePayload = serde_json::from_value(json!({
            "name": " X1 ",
            "brand": "Acme",
            "battery": "4000",
            "price": 500,
            "stock": "3",
            "imei": "IMEI1"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(
            payload.to_record(),
            json!({
                "name": "X1",
                "brand": "Acme",
                "battery": 4000,
                "price": 500.0,
                "stock": 3,
                "imei": "IMEI1"
            })
        );
    }

    #[test]
    fn unparsable_numerics_coerce_to_zero() {
        let payload: PhonePayload = serde_json::from_value(json!({
            "name": "X1",
            "brand": "Acme",
            "battery": "lots",
            "price": null,
            "imei": "IMEI1"
        }))
        .unwrap();
        let record = payload.to_record();
        assert_eq!(record["battery"], json!(0));
        assert_eq!(record["price"], json!(0.0));
        assert_eq!(record["stock"], json!(0));
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let payload: PhonePayload = serde_json::from_value(json!({
            "name": "  ",
            "brand": "Acme",
            "imei": "IMEI1"
        }))
        .unwrap();
        assert_eq!(payload.validate(), Err("name is required".to_string()));
    }
}
