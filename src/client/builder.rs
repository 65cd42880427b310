use crate::client::core::MerlinClient;
use crate::config::ClientConfig;
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`MerlinClient`].
///
/// Starts from [`ClientConfig::default`]; call [`MerlinClientBuilder::from_env`]
/// to start from the environment instead.
pub struct MerlinClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for MerlinClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MerlinClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            config: ClientConfig::from_env()?,
            transport: None,
        })
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config = self.config.with_api_key(key);
        self
    }

    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.config = self.config.with_organization(org);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.config = self.config.with_project(project);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config = self.config.with_proxy(proxy);
        self
    }

    /// Use a custom transport. The HTTP settings above are then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<MerlinClient> {
        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };
        Ok(MerlinClient::with_transport(transport))
    }
}
