use chrono_tz::Tz;
use serde::Deserialize;
use std::env;
use tourbook_core::{CoreError, CoreResult};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub checkout: CheckoutConfig,
    pub payment: PaymentConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub views: ViewsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// JSON array of tours loaded by the memory backend.
    pub seed_file: Option<String>,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    pub default_capacity: i32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_require_email")]
    pub require_email: bool,
    #[serde(default = "default_min_height")]
    pub min_height: u16,
    #[serde(default = "default_max_height")]
    pub max_height: u16,
    /// IANA zone tour times are shown in, e.g. `America/New_York`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_currency() -> String { "usd".to_string() }
fn default_require_email() -> bool { true }
fn default_min_height() -> u16 { 36 }
fn default_max_height() -> u16 { 84 }
fn default_timezone() -> String { "America/New_York".to_string() }

impl CheckoutConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.default_capacity < 1 {
            return Err(CoreError::ValidationError(format!(
                "checkout.default_capacity must be positive, got {}",
                self.default_capacity
            )));
        }
        if self.min_height > self.max_height {
            return Err(CoreError::ValidationError(format!(
                "checkout.min_height ({}) exceeds checkout.max_height ({})",
                self.min_height, self.max_height
            )));
        }
        self.timezone()?;
        if self.currency.trim().is_empty() {
            return Err(CoreError::ValidationError("checkout.currency is empty".to_string()));
        }
        Ok(())
    }

    pub fn timezone(&self) -> CoreResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            CoreError::ValidationError(format!("checkout.timezone {:?}: {}", self.timezone, e))
        })
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub provider: PaymentProvider,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_stripe_api")]
    pub api_base: String,
}

fn default_stripe_api() -> String { "https://api.stripe.com".to_string() }

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    Sendgrid,
    Log,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub provider: MailProvider,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_sendgrid_api")]
    pub api_base: String,
    pub from_name: String,
    pub from_address: String,
    pub operator_address: String,
    #[serde(default = "default_bcc_operator")]
    pub bcc_operator: bool,
}

fn default_sendgrid_api() -> String { "https://api.sendgrid.com".to_string() }
fn default_bcc_operator() -> bool { true }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ViewsConfig {
    pub templates_dir: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `TOURBOOK__PAYMENT__SECRET_KEY=sk_live_...`
            .add_source(config::Environment::with_prefix("TOURBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
