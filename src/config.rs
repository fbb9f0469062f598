use std::env;

/// Connection settings for the hosted data gateway. Both values come from the
/// environment; a missing value is a warning rather than a startup failure,
/// because the service can still run and report configuration errors on each
/// request.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub url: Option<String>,
    pub key: Option<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let config = Self {
            url: non_empty_var("GATEWAY_URL"),
            key: non_empty_var("GATEWAY_KEY"),
        };

        if !config.is_configured() {
            log::warn!(
                "GATEWAY_URL / GATEWAY_KEY not set; remote requests will fail until configured"
            );
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
