//! Gateway state

use std::sync::Arc;

use analytics_common::ApiToken;
use analytics_core::GuildSource;
use analytics_service::ServiceContext;

/// Shared dependencies of the trigger routes
#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    /// Live view of the guilds the bot is in
    source: Arc<dyn GuildSource>,
    token: ApiToken,
}

impl GatewayState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        source: Arc<dyn GuildSource>,
        token: ApiToken,
    ) -> Self {
        Self {
            service_context,
            source,
            token,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub(crate) fn context_handle(&self) -> Arc<ServiceContext> {
        self.service_context.clone()
    }

    pub(crate) fn source_handle(&self) -> Arc<dyn GuildSource> {
        self.source.clone()
    }

    pub fn source(&self) -> &dyn GuildSource {
        self.source.as_ref()
    }

    pub fn token(&self) -> &ApiToken {
        &self.token
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("service_context", &self.service_context)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
