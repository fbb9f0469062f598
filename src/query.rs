use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{CUSTOMERS, PHONES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Ilike,
    Eq,
    Gte,
    Lte,
    Gt,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Ilike => "ilike",
            Op::Eq => "eq",
            Op::Gte => "gte",
            Op::Lte => "lte",
            Op::Gt => "gt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    Asc,
    Desc,
}

impl Dir {
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: &'static str,
    pub op: Op,
    pub value: String,
}

impl Predicate {
    pub fn new(field: &'static str, op: Op, value: impl Into<String>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}.{}.{}", self.field, self.op.as_str(), self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub field: &'static str,
    pub dir: Dir,
}

/// A fully-specified read query: table, column projection, ANDed predicates,
/// an optional OR-group for multi-column text search, and one order clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: &'static str,
    pub columns: &'static str,
    pub predicates: Vec<Predicate>,
    pub or_group: Vec<Predicate>,
    pub order: Option<OrderClause>,
}

impl Select {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: "*",
            predicates: Vec::new(),
            or_group: Vec::new(),
            order: None,
        }
    }

    pub fn columns(mut self, columns: &'static str) -> Self {
        self.columns = columns;
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn or_any(mut self, predicates: Vec<Predicate>) -> Self {
        self.or_group = predicates;
        self
    }

    pub fn order(mut self, field: &'static str, dir: Dir) -> Self {
        self.order = Some(OrderClause { field, dir });
        self
    }
}

/// Backslash-escapes pattern wildcards (`%`, `_`) and the gateway's
/// predicate-list separators (`,`, `(`, `)`) so free text searches match
/// literally and cannot restructure an OR-group.
pub fn escape_search_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | ',' | '(' | ')') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Lenient numeric parse: empty or unparsable input means "no filter".
fn parse_number(raw: &Option<String>) -> Option<f64> {
    present(raw)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn parse_date(raw: &Option<String>) -> Option<NaiveDate> {
    present(raw).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn is_truthy(raw: &Option<String>) -> bool {
    matches!(present(raw), Some("true") | Some("1"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneSortKey {
    #[default]
    Id,
    Name,
    Brand,
    Battery,
    Price,
    Stock,
    CreatedAt,
}

impl PhoneSortKey {
    pub fn column(self) -> &'static str {
        match self {
            PhoneSortKey::Id => "id",
            PhoneSortKey::Name => "name",
            PhoneSortKey::Brand => "brand",
            PhoneSortKey::Battery => "battery",
            PhoneSortKey::Price => "price",
            PhoneSortKey::Stock => "stock",
            PhoneSortKey::CreatedAt => "created_at",
        }
    }
}

/// Inventory list filters, straight off the query string. Numeric fields stay
/// raw strings here: an unparsable value silently drops the filter instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhoneFilter {
    pub search: Option<String>,
    pub brand: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub battery_min: Option<String>,
    pub battery_max: Option<String>,
    pub in_stock: Option<String>,
    pub sort_by: Option<PhoneSortKey>,
    pub sort_dir: Option<Dir>,
}

impl PhoneFilter {
    pub fn to_select(&self) -> Select {
        let mut query = Select::new(PHONES);

        if let Some(raw) = present(&self.search) {
            let pattern = format!("%{}%", escape_search_token(raw));
            let mut parts = vec![
                Predicate::new("name", Op::Ilike, pattern.clone()),
                Predicate::new("imei", Op::Ilike, pattern),
            ];
            // Whole-token integers also match battery capacity exactly.
            if let Ok(num) = raw.parse::<i64>() {
                parts.push(Predicate::new("battery", Op::Eq, num.to_string()));
            }
            query = query.or_any(parts);
        }

        if let Some(brand) = present(&self.brand) {
            query = query.filter(Predicate::new("brand", Op::Ilike, format!("%{}%", brand)));
        }

        if let Some(min) = parse_number(&self.price_min) {
            query = query.filter(Predicate::new("price", Op::Gte, min.to_string()));
        }
        if let Some(max) = parse_number(&self.price_max) {
            query = query.filter(Predicate::new("price", Op::Lte, max.to_string()));
        }
        if let Some(min) = parse_number(&self.battery_min) {
            query = query.filter(Predicate::new("battery", Op::Gte, min.to_string()));
        }
        if let Some(max) = parse_number(&self.battery_max) {
            query = query.filter(Predicate::new("battery", Op::Lte, max.to_string()));
        }

        if is_truthy(&self.in_stock) {
            query = query.filter(Predicate::new("stock", Op::Gt, "0"));
        }

        let key = self.sort_by.unwrap_or_default();
        let dir = self.sort_dir.unwrap_or(Dir::Asc);
        query.order(key.column(), dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSortKey {
    #[default]
    SoldAt,
    PriceSold,
    PriceOriginal,
    Brand,
    DeviceName,
}

impl CustomerSortKey {
    pub fn column(self) -> &'static str {
        match self {
            CustomerSortKey::SoldAt => "sold_at",
            CustomerSortKey::PriceSold => "price_sold",
            CustomerSortKey::PriceOriginal => "price_original",
            CustomerSortKey::Brand => "brand",
            CustomerSortKey::DeviceName => "device_name",
        }
    }
}

/// Sale-history list filters. Date bounds are inclusive whole days.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub brand: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort_by: Option<CustomerSortKey>,
    pub sort_dir: Option<Dir>,
}

impl CustomerFilter {
    pub fn to_select(&self) -> Select {
        let mut query = Select::new(CUSTOMERS);

        if let Some(raw) = present(&self.search) {
            let pattern = format!("%{}%", escape_search_token(raw));
            query = query.or_any(vec![
                Predicate::new("customer_name", Op::Ilike, pattern.clone()),
                Predicate::new("customer_phone", Op::Ilike, pattern.clone()),
                Predicate::new("imei", Op::Ilike, pattern.clone()),
                Predicate::new("device_name", Op::Ilike, pattern.clone()),
                Predicate::new("brand", Op::Ilike, pattern),
            ]);
        }

        if let Some(brand) = present(&self.brand) {
            query = query.filter(Predicate::new("brand", Op::Ilike, format!("%{}%", brand)));
        }

        if let Some(min) = parse_number(&self.price_min) {
            query = query.filter(Predicate::new("price_sold", Op::Gte, min.to_string()));
        }
        if let Some(max) = parse_number(&self.price_max) {
            query = query.filter(Predicate::new("price_sold", Op::Lte, max.to_string()));
        }

        if let Some(from) = parse_date(&self.date_from) {
            let bound = format!("{}T00:00:00Z", from);
            query = query.filter(Predicate::new("sold_at", Op::Gte, bound));
        }
        if let Some(to) = parse_date(&self.date_to) {
            let bound = format!("{}T23:59:59Z", to);
            query = query.filter(Predicate::new("sold_at", Op::Lte, bound));
        }

        let key = self.sort_by.unwrap_or_default();
        let dir = self.sort_dir.unwrap_or(Dir::Desc);
        query.order(key.column(), dir)
    }
}
