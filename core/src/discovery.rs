//! Gateway discovery: one search request raced against a deadline.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use portgate_common::error::{Error, Result};
use portgate_protocols::ssdp::{IGD_DEVICE, SsdpClient, SsdpSearch};
use tracing::debug;

use crate::gateway::GatewayHandle;

/// Default time to wait for a gateway to answer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1800);

/// The discovery collaborator the locator drives.
///
/// `address` switches between broad discovery and a targeted probe of one
/// gateway.
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    async fn search(&self, search_target: &str, address: Option<IpAddr>) -> Result<SsdpSearch>;
}

#[async_trait]
impl DiscoveryTransport for SsdpClient {
    async fn search(&self, search_target: &str, address: Option<IpAddr>) -> Result<SsdpSearch> {
        Ok(SsdpClient::search(self, search_target, address))
    }
}

/// Wait for exactly one gateway, or fail with [`Error::Timeout`].
///
/// The first of "device found" and "deadline passed" wins. The search is
/// stopped either way so the socket is freed, and the losing event is
/// ignored even if it arrives later; exactly one resolution per call.
pub async fn locate(
    transport: &dyn DiscoveryTransport,
    address: Option<IpAddr>,
    timeout: Duration,
) -> Result<GatewayHandle> {
    let mut search = transport.search(IGD_DEVICE, address).await?;

    let winner = tokio::select! {
        found = search.recv() => found,
        _ = tokio::time::sleep(timeout) => None,
    };
    search.stop();

    match winner {
        Some(found) => {
            debug!("gateway found at {} via {}", found.remote, found.location);
            Ok(GatewayHandle::new(found))
        }
        None => Err(Error::Timeout),
    }
}
