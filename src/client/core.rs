use crate::client::builder::MerlinClientBuilder;
use crate::config::ClientConfig;
use crate::files::Files;
use crate::responses::Responses;
use crate::transport::{HttpTransport, Transport};
use crate::uploads::Uploads;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Entry point for every resource.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct MerlinClient {
    transport: Arc<dyn Transport>,
}

impl MerlinClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        debug!(base_url = config.base_url.as_str(), "creating merlin client");
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }

    /// Configuration from `MERLIN_*` / `OPENAI_*` variables and the OS keyring.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn builder() -> MerlinClientBuilder {
        MerlinClientBuilder::new()
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn responses(&self) -> Responses {
        Responses::new(Arc::clone(&self.transport))
    }

    pub fn uploads(&self) -> Uploads {
        Uploads::new(Arc::clone(&self.transport))
    }

    pub fn files(&self) -> Files {
        Files::new(Arc::clone(&self.transport))
    }
}
