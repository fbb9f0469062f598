use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::query::{Predicate, Select};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("remote gateway is not configured")]
    NotConfigured,

    /// Non-success response; `message` is the gateway's own error text.
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("unexpected gateway payload: {0}")]
    Decode(String),
}

/// The remote data gateway contract. Injected everywhere as a trait object so
/// views and the sale workflow never reach for a global client handle.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, GatewayError>;
    async fn insert(&self, table: &str, record: &Value) -> Result<Value, GatewayError>;
    async fn update(&self, table: &str, id: i64, patch: &Value) -> Result<Value, GatewayError>;
    async fn delete(&self, table: &str, id: i64) -> Result<(), GatewayError>;
}

/// PostgREST-style HTTP implementation: predicates become query-string pairs,
/// OR-groups become a single `or=(...)` parameter.
pub struct RestGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl RestGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn credentials(&self) -> Result<(&str, &str), GatewayError> {
        match (&self.config.url, &self.config.key) {
            (Some(url), Some(key)) => Ok((url.trim_end_matches('/'), key.as_str())),
            _ => Err(GatewayError::NotConfigured),
        }
    }

    fn table_url(&self, table: &str) -> Result<(String, &str), GatewayError> {
        let (base, key) = self.credentials()?;
        Ok((format!("{}/rest/v1/{}", base, table), key))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message")?.as_str().map(str::to_string))
            .unwrap_or(body);
        Err(GatewayError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    fn first_row(mut rows: Vec<Value>) -> Value {
        if rows.is_empty() {
            Value::Null
        } else {
            rows.swap_remove(0)
        }
    }
}

/// Renders the query-string for a select. Values inside the OR-group are
/// encoded as one unit so their dots stay part of the grammar.
pub(crate) fn render_query(query: &Select) -> String {
    let mut parts = vec![format!("select={}", urlencoding::encode(query.columns))];

    for p in &query.predicates {
        parts.push(format!(
            "{}={}.{}",
            p.field,
            p.op.as_str(),
            urlencoding::encode(&p.value)
        ));
    }

    if !query.or_group.is_empty() {
        let inner = query
            .or_group
            .iter()
            .map(Predicate::render)
            .collect::<Vec<_>>()
            .join(",");
        parts.push(format!(
            "or={}",
            urlencoding::encode(&format!("({})", inner))
        ));
    }

    if let Some(order) = &query.order {
        parts.push(format!("order={}.{}", order.field, order.dir.as_str()));
    }

    parts.join("&")
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, GatewayError> {
        let (url, key) = self.table_url(query.table)?;
        let url = format!("{}?{}", url, render_query(query));
        log::debug!("gateway select: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {}", key))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn insert(&self, table: &str, record: &Value) -> Result<Value, GatewayError> {
        let (url, key) = self.table_url(table)?;
        log::debug!("gateway insert into {}", table);

        let response = self
            .client
            .post(&url)
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {}", key))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let rows = Self::check(response)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(Self::first_row(rows))
    }

    async fn update(&self, table: &str, id: i64, patch: &Value) -> Result<Value, GatewayError> {
        let (url, key) = self.table_url(table)?;
        let url = format!("{}?id=eq.{}", url, id);
        log::debug!("gateway update {} id {}", table, id);

        let response = self
            .client
            .patch(&url)
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {}", key))
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let rows = Self::check(response)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(Self::first_row(rows))
    }

    async fn delete(&self, table: &str, id: i64) -> Result<(), GatewayError> {
        let (url, key) = self.table_url(table)?;
        let url = format!("{}?id=eq.{}", url, id);
        log::debug!("gateway delete {} id {}", table, id);

        let response = self
            .client
            .delete(&url)
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {}", key))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use crate::query::{Dir, Op, Predicate, Select};

    use super::render_query;

    #[test]
    fn plain_select_renders_projection_and_order() {
        let query = Select::new("phones").order("id", Dir::Asc);
        assert_eq!(render_query(&query), "select=%2A&order=id.asc");
    }

    #[test]
    fn single_predicates_become_query_pairs() {
        let query = Select::new("phones")
            .filter(Predicate::new("price", Op::Gte, "100"))
            .filter(Predicate::new("stock", Op::Gt, "0"));
        assert_eq!(
            render_query(&query),
            "select=%2A&price=gte.100&stock=gt.0"
        );
    }

    #[test]
    fn or_group_is_encoded_as_one_parameter() {
        let query = Select::new("phones").or_any(vec![
            Predicate::new("name", Op::Ilike, "%nova%"),
            Predicate::new("imei", Op::Ilike, "%nova%"),
        ]);
        assert_eq!(
            render_query(&query),
            "select=%2A&or=%28name.ilike.%25nova%25%2Cimei.ilike.%25nova%25%29"
        );
    }

    #[test]
    fn join_projection_is_percent_encoded() {
        let query = Select::new("sales")
            .columns("*, phone:phones(name)")
            .order("sold_at", Dir::Desc);
        assert_eq!(
            render_query(&query),
            "select=%2A%2C%20phone%3Aphones%28name%29&order=sold_at.desc"
        );
    }
}
