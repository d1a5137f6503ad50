//! Per-guild configuration

use analytics_core::{ConfigField, DomainError, GuildConfig, Snowflake};
use serde_json::Value;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Config service
pub struct ConfigService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConfigService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Stored configuration, or the defaults when none exists
    #[instrument(skip(self))]
    pub async fn get(&self, guild_id: Snowflake) -> ServiceResult<GuildConfig> {
        Ok(self
            .ctx
            .config_repo()
            .find(guild_id)
            .await?
            .unwrap_or_else(|| GuildConfig::new(guild_id)))
    }

    /// Apply one validated field and persist the result
    #[instrument(skip(self))]
    pub async fn set(&self, guild_id: Snowflake, field: ConfigField) -> ServiceResult<GuildConfig> {
        let mut config = self.get(guild_id).await?;
        let name = field.name();
        config.apply(field);
        self.ctx.config_repo().save(&config).await?;

        info!(guild_id = %guild_id, field = name, "Guild config updated");
        Ok(config)
    }

    /// Update from an untyped `(field, value)` pair as sent by the dashboard
    pub async fn update(
        &self,
        guild_id: &str,
        field: &str,
        value: &Value,
    ) -> ServiceResult<GuildConfig> {
        let guild_id = Snowflake::parse(guild_id)
            .map_err(|_| ServiceError::validation("Invalid guild_id format"))?;
        let field = ConfigField::parse(field, value).map_err(|e| match e {
            DomainError::UnknownConfigField(name) => {
                ServiceError::validation(format!("Invalid field: {name}"))
            }
            other => ServiceError::Domain(other),
        })?;
        self.set(guild_id, field).await
    }
}
