//! Application state
//!
//! Holds the service context, the configuration and the bot trigger client.

use std::sync::Arc;

use analytics_common::{ApiToken, AppConfig};
use analytics_service::{BotTrigger, ServiceContext};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    /// Forwards snapshot and member-fetch requests to the bot
    trigger: Arc<dyn BotTrigger>,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        trigger: Arc<dyn BotTrigger>,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            trigger,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn trigger(&self) -> &dyn BotTrigger {
        self.trigger.as_ref()
    }

    /// Shared secret expected on protected endpoints
    pub fn api_token(&self) -> &ApiToken {
        &self.config.api_token
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("trigger", &"BotTrigger")
            .finish()
    }
}
