use async_trait::async_trait;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use uuid::Uuid;

use crate::domain::gateway::{GatewayConfig, GatewayError, TenantConfigSource};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub gateway: GatewayConfig,
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Configuration is loaded in the following order (later sources override
  /// earlier ones):
  /// 1. config/default.toml
  /// 2. config/local.toml (if exists)
  /// 3. config/{RUN_MODE}.toml (if exists)
  /// 4. Environment variables with FATURALINK_ prefix
  ///
  /// Environment variables use double underscores as separators:
  /// - `FATURALINK_GATEWAY__VKN=1234567890`
  /// - `FATURALINK_GATEWAY__ERP_CODE=ERP01`
  /// - `FATURALINK_GATEWAY__IS_TEST=false`
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      .add_source(File::with_name("config/default").required(true))
      .add_source(File::with_name("config/local").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      .add_source(
        Environment::with_prefix("FATURALINK")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    config.try_deserialize()
  }
}

/// Single-tenant `TenantConfigSource` backed by the loaded configuration.
/// Multi-tenant deployments supply their own source reading per-tenant
/// settings from the record store.
pub struct StaticTenantConfig {
  config: GatewayConfig,
}

impl StaticTenantConfig {
  pub fn new(config: GatewayConfig) -> Self {
    Self { config }
  }
}

#[async_trait]
impl TenantConfigSource for StaticTenantConfig {
  async fn gateway_config(&self, _tenant_id: Uuid) -> Result<GatewayConfig, GatewayError> {
    Ok(self.config.clone())
  }
}
