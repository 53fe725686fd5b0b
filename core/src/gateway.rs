//! The gateway handle and its SOAP action surface.

use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use portgate_common::error::{Error, Result};
use portgate_common::mapping::{AddMapping, MappingFilter, PortMapping, RemoveMapping};
use portgate_protocols::soap;
use portgate_protocols::ssdp::DeviceFound;
use reqwest::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE};
use tracing::debug;
use xmltree::Element;

use crate::{catalog, device};

/// Service types exposing the port-mapping actions, tried in this order
/// against each description document.
const WAN_CONNECTION_SERVICES: [&str; 2] = [
    "urn:schemas-upnp-org:service:WANIPConnection:1",
    "urn:schemas-upnp-org:service:WANPPPConnection:1",
];

/// Immutable identity of a discovered gateway.
#[derive(Debug, Clone)]
pub struct GatewayHandle {
    /// URL of the gateway's description document.
    pub location: String,
    /// Local interface address the gateway was reached from.
    pub local_addr: IpAddr,
    /// The gateway's own address and port.
    pub remote: SocketAddr,
    /// Candidate service types for control-endpoint resolution. Never empty.
    pub service_types: Vec<String>,
}

impl GatewayHandle {
    pub(crate) fn new(found: DeviceFound) -> Self {
        Self {
            location: found.location,
            local_addr: found.local_addr,
            remote: found.remote,
            service_types: WAN_CONNECTION_SERVICES
                .iter()
                .map(|service| service.to_string())
                .collect(),
        }
    }
}

/// Executes one named SOAP action against a gateway and returns the reply
/// body.
///
/// The catalog is written against this seam so its sequencing logic can be
/// exercised without a live gateway.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    async fn invoke(&self, action: &str, arguments: &[soap::Argument<'_>]) -> Result<Element>;
}

/// A discovered gateway plus the HTTP client used to drive it.
///
/// Holds no mutable state; independent gateways may be operated
/// concurrently.
pub struct Gateway {
    handle: GatewayHandle,
    http: reqwest::Client,
}

impl Gateway {
    pub(crate) fn new(handle: GatewayHandle, http: reqwest::Client) -> Self {
        Self { handle, http }
    }

    /// The gateway's address and port.
    pub fn addr(&self) -> SocketAddr {
        self.handle.remote
    }

    /// URL of the gateway's description document.
    pub fn location(&self) -> &str {
        &self.handle.location
    }

    /// Local interface address the gateway was discovered from.
    pub fn local_addr(&self) -> IpAddr {
        self.handle.local_addr
    }

    /// The gateway account's configured username.
    pub async fn user_name(&self) -> Result<String> {
        catalog::single_field(self, "GetUserName", "NewUserName").await
    }

    /// The gateway account's configured password.
    pub async fn password(&self) -> Result<String> {
        catalog::single_field(self, "GetPassword", "NewPassword").await
    }

    /// The external IP address, returned exactly as the gateway reports it.
    pub async fn external_ip(&self) -> Result<String> {
        catalog::single_field(self, "GetExternalIPAddress", "NewExternalIPAddress").await
    }

    /// Create a forwarding rule.
    pub async fn add_mapping(&self, request: &AddMapping) -> Result<()> {
        catalog::add(self, self.handle.local_addr, request).await
    }

    /// Delete a forwarding rule.
    pub async fn remove_mapping(&self, request: &RemoveMapping) -> Result<()> {
        catalog::remove(self, request).await
    }

    /// Enumerate active forwarding rules, filtered client-side.
    pub async fn mappings(&self, filter: &MappingFilter) -> Result<Vec<PortMapping>> {
        catalog::enumerate(self, self.handle.local_addr, filter).await
    }
}

#[async_trait]
impl ActionInvoker for Gateway {
    /// One SOAP exchange: resolve the control endpoint fresh, post the
    /// envelope, hand back the reply body.
    async fn invoke(&self, action: &str, arguments: &[soap::Argument<'_>]) -> Result<Element> {
        let service = device::resolve_service(&self.http, &self.handle).await?;
        let envelope = soap::request_envelope(&service.service_type, action, arguments);
        debug!("invoking {action} at {}", service.control_url);

        let response = self
            .http
            .post(service.control_url.clone())
            .header(CONTENT_TYPE, "text/xml; charset=\"utf-8\"")
            .header(CONTENT_LENGTH, envelope.len())
            .header(CONNECTION, "close")
            .header(
                "SOAPAction",
                soap::action_header(&service.service_type, action),
            )
            .body(envelope)
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RequestFailed(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let parsed = soap::parse(&body)?;
        soap::body(&parsed)
            .cloned()
            .ok_or_else(|| Error::IncorrectResponse(action.to_string()))
    }
}
