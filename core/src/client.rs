//! Client facade: one discovery resource, one HTTP client, explicit
//! acquire-at-construction / release-on-close lifecycle.

use std::net::IpAddr;
use std::time::Duration;

use portgate_common::error::{Error, Result};
use portgate_protocols::ssdp::SsdpClient;
use tracing::info;

use crate::discovery::{self, DEFAULT_TIMEOUT, DiscoveryTransport};
use crate::gateway::Gateway;

/// Bound on any single HTTP exchange with a gateway; embedded gateway HTTP
/// servers hang more often than they refuse.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Client {
    transport: Box<dyn DiscoveryTransport>,
    http: reqwest::Client,
    timeout: Duration,
}

impl Client {
    /// Bind the discovery socket and prepare a bounded-timeout HTTP client.
    pub async fn new() -> Result<Self> {
        let ssdp = SsdpClient::bind()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        Self::with_transport(Box::new(ssdp))
    }

    /// Use a custom discovery collaborator instead of the SSDP transport.
    pub fn with_transport(transport: Box<dyn DiscoveryTransport>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| Error::Transport(err.to_string()))?;
        Ok(Self {
            transport,
            http,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the discovery deadline (default 1800 ms).
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Discover a gateway, optionally probing a known address instead of
    /// broadcasting.
    pub async fn find_gateway(&self, address: Option<IpAddr>) -> Result<Gateway> {
        let handle = discovery::locate(self.transport.as_ref(), address, self.timeout).await?;
        info!("gateway found: {} at {}", handle.location, handle.remote);
        Ok(Gateway::new(handle, self.http.clone()))
    }

    /// Release the discovery socket.
    pub fn close(self) {}
}
