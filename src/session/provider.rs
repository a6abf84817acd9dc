//! Session provider
//!
//! The client handle is built behind a `OnceCell`: concurrent first callers
//! block on one initialiser and all see the same handle. A failed build is
//! not cached, so a later call can succeed once a credential is available.

use crate::api::PagerDutyClient;
use crate::auth::{resolve_credential, Credential};
use crate::config::{ConnectionConfig, TOKEN_ENV_VAR};
use crate::error::Result;
use crate::retry::RetryPolicy;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Builds the client once a credential is resolved
pub trait ClientFactory: Send + Sync {
    /// Construct a client bound to `credential`
    fn build(&self, config: &ConnectionConfig, credential: Credential) -> Result<PagerDutyClient>;
}

/// Factory producing the real HTTP-backed client
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClientFactory;

impl ClientFactory for DefaultClientFactory {
    fn build(&self, config: &ConnectionConfig, credential: Credential) -> Result<PagerDutyClient> {
        PagerDutyClient::from_config(config, credential)
    }
}

/// One logical connection and its memoised client
pub struct ConnectionSession {
    config: ConnectionConfig,
    env_var: String,
    factory: Arc<dyn ClientFactory>,
    client: OnceCell<Arc<PagerDutyClient>>,
}

impl ConnectionSession {
    /// Create a session; nothing is resolved until [`client`](Self::client) is called
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            env_var: TOKEN_ENV_VAR.to_string(),
            factory: Arc::new(DefaultClientFactory),
            client: OnceCell::new(),
        }
    }

    /// Use a different client factory
    #[must_use]
    pub fn with_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Read the fallback token from a different environment variable
    #[must_use]
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    /// Connection settings
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Retry policy configured for this connection
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.config.retry)
    }

    /// The shared client, built on first use
    pub fn client(&self) -> Result<Arc<PagerDutyClient>> {
        self.client
            .get_or_try_init(|| {
                let credential = resolve_credential(
                    self.config.configured_token(),
                    std::env::var(&self.env_var).ok(),
                )?;
                debug!(
                    source = ?credential.source(),
                    api_url = self.config.api_url(),
                    "building PagerDuty client"
                );
                self.factory.build(&self.config, credential).map(Arc::new)
            })
            .cloned()
    }

    /// True once a client has been built
    pub fn is_connected(&self) -> bool {
        self.client.get().is_some()
    }
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("config", &self.config)
            .field("env_var", &self.env_var)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
