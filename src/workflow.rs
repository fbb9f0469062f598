use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::models::{coerce_f64, Phone, SaleForm, SaleRecord, CUSTOMERS, PHONES};

/// Resting states of the sale transfer. Validation and submission run to
/// completion inside `submit`, so only these two persist between requests.
#[derive(Debug, Clone, PartialEq)]
pub enum SaleState {
    Idle,
    SellRequested { workflow_id: Uuid, snapshot: Phone },
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleDraft {
    pub snapshot: Phone,
    pub price_sold: f64,
}

/// Moves one phone from inventory into the customer history table. The
/// history insert always runs first; the inventory delete only runs once the
/// insert has succeeded.
#[derive(Debug)]
pub struct SaleWorkflow {
    state: SaleState,
}

impl Default for SaleWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleWorkflow {
    pub fn new() -> Self {
        Self {
            state: SaleState::Idle,
        }
    }

    pub fn state(&self) -> &SaleState {
        &self.state
    }

    /// Captures the snapshot the sale will be built from. Opening while a
    /// previous request is pending replaces it.
    pub fn open(&mut self, snapshot: Phone) -> SaleDraft {
        let workflow_id = Uuid::new_v4();
        log::info!(
            "sale {} opened for phone {} ({})",
            workflow_id,
            snapshot.id,
            snapshot.name
        );
        let draft = SaleDraft {
            price_sold: snapshot.price,
            snapshot: snapshot.clone(),
        };
        self.state = SaleState::SellRequested {
            workflow_id,
            snapshot,
        };
        draft
    }

    pub fn cancel(&mut self) -> bool {
        if let SaleState::SellRequested { workflow_id, .. } = &self.state {
            log::info!("sale {} cancelled", workflow_id);
            self.state = SaleState::Idle;
            true
        } else {
            false
        }
    }

    pub async fn submit(
        &mut self,
        gateway: &dyn Gateway,
        form: &SaleForm,
    ) -> Result<SaleRecord, AppError> {
        let (workflow_id, snapshot) = match &self.state {
            SaleState::SellRequested {
                workflow_id,
                snapshot,
            } => (*workflow_id, snapshot.clone()),
            SaleState::Idle => return Err(AppError::conflict("no sale in progress")),
        };

        // Validation failures keep the request pending and touch nothing.
        let input = validate_sale_form(form)?;

        let record = json!({
            "customer_name": input.customer_name,
            "customer_phone": input.customer_phone,
            "device_name": snapshot.name,
            "brand": snapshot.brand,
            "battery": snapshot.battery,
            "imei": snapshot.imei,
            "price_original": snapshot.price,
            "price_sold": input.price_sold,
            "sold_at": input.sold_at.to_rfc3339(),
        });

        let inserted = match gateway.insert(CUSTOMERS, &record).await {
            Ok(row) => row,
            Err(e) => {
                // Inventory untouched; the operator can retry the same sale.
                log::warn!("sale {}: history insert failed: {}", workflow_id, e);
                return Err(AppError::Gateway(e));
            }
        };
        let sale_id = inserted.get("id").and_then(Value::as_i64);

        if let Err(e) = gateway.delete(PHONES, snapshot.id).await {
            self.state = SaleState::Idle;
            log::error!(
                "sale {}: history row {:?} written but phone {} is still in inventory: {}",
                workflow_id,
                sale_id,
                snapshot.id,
                e
            );
            return Err(AppError::PartialSale {
                sale_id,
                phone_id: snapshot.id,
                message: e.to_string(),
            });
        }

        self.state = SaleState::Idle;
        log::info!("sale {} completed for phone {}", workflow_id, snapshot.id);

        Ok(SaleRecord {
            id: sale_id.unwrap_or_default(),
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            device_name: snapshot.name,
            brand: snapshot.brand,
            battery: snapshot.battery,
            imei: snapshot.imei,
            price_original: snapshot.price,
            price_sold: input.price_sold,
            sold_at: input.sold_at,
        })
    }
}

struct SaleInput {
    customer_name: String,
    customer_phone: String,
    price_sold: f64,
    sold_at: DateTime<Utc>,
}

fn validate_sale_form(form: &SaleForm) -> Result<SaleInput, AppError> {
    let customer_name = trimmed(&form.customer_name)
        .ok_or_else(|| AppError::validation("customer name is required"))?;
    let customer_phone = trimmed(&form.customer_phone)
        .ok_or_else(|| AppError::validation("customer phone is required"))?;

    let price_sold = coerce_f64(&form.price_sold)
        .ok_or_else(|| AppError::validation("sale price must be a number"))?;
    if price_sold < 0.0 {
        return Err(AppError::validation("sale price must be zero or greater"));
    }

    let date = trimmed(&form.sold_on)
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
        .ok_or_else(|| AppError::validation("sale date is required"))?;
    let sold_at = date
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| AppError::validation("sale date is required"))?;

    Ok(SaleInput {
        customer_name,
        customer_phone,
        price_sold,
        sold_at,
    })
}

fn trimmed(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// One pending destructive action per view. A delete only reaches the
/// gateway when the confirmed id matches the mark; the mark survives a
/// failed remote delete, and only a successful delete or an explicit
/// cancel clears it.
#[derive(Debug, Default)]
pub struct PendingDelete {
    id: Option<i64>,
}

impl PendingDelete {
    pub fn request(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub fn matches(&self, id: i64) -> bool {
        self.id == Some(id)
    }

    pub fn clear(&mut self) {
        self.id = None;
    }

    pub fn cancel(&mut self) -> bool {
        self.id.take().is_some()
    }

    pub fn pending(&self) -> Option<i64> {
        self.id
    }
}

#[derive(Debug, Default)]
pub struct PendingDeletes {
    pub phones: PendingDelete,
    pub customers: PendingDelete,
}

/// Monotonic request sequence for one list view. A response is only
/// deliverable when its sequence number is still the latest issued.
#[derive(Debug, Default)]
pub struct ViewSequence(AtomicU64);

impl ViewSequence {
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.0.load(Ordering::SeqCst) == seq
    }
}

#[derive(Debug, Default)]
pub struct ViewSequences {
    pub phones: ViewSequence,
    pub customers: ViewSequence,
}
