use ::config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::services::FetchSettings;

pub const DEFAULT_BASE_URL: &str = "https://api.gdax.com";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    /// Assumed maximum number of candles the exchange returns per call.
    pub batch_limit: u32,
    /// Courtesy delay between two requests.
    pub request_delay_ms: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Defaults, then `gdax_history.{toml,yaml,json}` if present, then `GDAX_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::with_name("gdax_history").required(false))
            .add_source(Environment::with_prefix("GDAX"))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let settings = FetchSettings::default();
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("batch_limit", i64::from(settings.batch_limit))?
            .set_default("request_delay_ms", settings.request_delay.as_millis() as i64)?
            .set_default(
                "user_agent",
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            batch_limit: self.batch_limit,
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }
}
