//! Port-mapping catalog operations, composed entirely from SOAP
//! invocations through the [`ActionInvoker`] seam.

use std::net::IpAddr;

use portgate_common::error::{Error, Result};
use portgate_common::mapping::{
    AddMapping, Endpoint, MappingFilter, PortMapping, RemoveMapping,
};
use portgate_protocols::{soap, xml};
use tracing::debug;
use xmltree::Element;

use crate::gateway::ActionInvoker;

/// Tag stamped on mappings created without an explicit description.
pub const DEFAULT_DESCRIPTION: &str = "portgate:nat:upnp";
/// Default lease duration, in seconds.
pub const DEFAULT_LEASE_SECS: u32 = 1800;

/// Invoke a no-argument action and pull one field out of its response
/// element.
pub async fn single_field(
    invoker: &dyn ActionInvoker,
    action: &str,
    field: &str,
) -> Result<String> {
    let body = invoker.invoke(action, &[]).await?;
    let response = soap::response_element(&body, action)
        .ok_or_else(|| Error::IncorrectResponse(action.to_string()))?;
    xml::child_text(response, field).ok_or_else(|| Error::IncorrectResponse(action.to_string()))
}

/// Invoke `AddPortMapping` with normalized endpoints and defaults applied.
///
/// A missing internal host defaults to the local interface address the
/// gateway was discovered from.
pub async fn add(
    invoker: &dyn ActionInvoker,
    local_addr: IpAddr,
    request: &AddMapping,
) -> Result<()> {
    let protocol = request.protocol.unwrap_or_default();
    let internal_host = request
        .private
        .host
        .clone()
        .unwrap_or_else(|| local_addr.to_string());
    let description = request
        .description
        .clone()
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let lease = request.ttl.unwrap_or(DEFAULT_LEASE_SECS);

    invoker
        .invoke(
            "AddPortMapping",
            &[
                ("NewRemoteHost", request.public.host.clone()),
                ("NewExternalPort", request.public.port.map(|p| p.to_string())),
                ("NewProtocol", Some(protocol.to_string())),
                ("NewInternalPort", request.private.port.map(|p| p.to_string())),
                ("NewInternalClient", Some(internal_host)),
                ("NewEnabled", Some("1".to_string())),
                ("NewPortMappingDescription", Some(description)),
                ("NewLeaseDuration", Some(lease.to_string())),
            ],
        )
        .await?;
    Ok(())
}

/// Invoke `DeletePortMapping` for the public side of a rule.
pub async fn remove(invoker: &dyn ActionInvoker, request: &RemoveMapping) -> Result<()> {
    let protocol = request.protocol.unwrap_or_default();

    invoker
        .invoke(
            "DeletePortMapping",
            &[
                ("NewRemoteHost", request.public.host.clone()),
                ("NewExternalPort", request.public.port.map(|p| p.to_string())),
                ("NewProtocol", Some(protocol.to_string())),
            ],
        )
        .await?;
    Ok(())
}

/// Walk the gateway's mapping table by 1-based index, one exchange in
/// flight at a time, then apply the client-side filter.
///
/// The first failing lookup of any kind ends the walk and is read as "no
/// more entries": gateways signal an out-of-range index with a SOAP fault,
/// so a genuine transport failure mid-walk is indistinguishable from the
/// end of the table here. The entries collected so far are returned either
/// way.
pub async fn enumerate(
    invoker: &dyn ActionInvoker,
    local_addr: IpAddr,
    filter: &MappingFilter,
) -> Result<Vec<PortMapping>> {
    let mut entries = Vec::new();
    let mut index: u32 = 1;

    loop {
        let lookup = invoker
            .invoke(
                "GetGenericPortMappingEntry",
                &[("NewPortMappingIndex", Some(index.to_string()))],
            )
            .await;
        let body = match lookup {
            Ok(body) => body,
            Err(err) => {
                debug!("mapping enumeration ended at index {index}: {err}");
                break;
            }
        };
        let Some(entry) = parse_entry(&body, local_addr) else {
            debug!("mapping enumeration ended at index {index}: undecodable entry");
            break;
        };
        entries.push(entry);
        index += 1;
    }

    entries.retain(|entry| filter.accepts(entry));
    Ok(entries)
}

/// Decode one `GetGenericPortMappingEntryResponse` into a catalog entry.
fn parse_entry(body: &Element, local_addr: IpAddr) -> Option<PortMapping> {
    let response = soap::response_element(body, "GetGenericPortMappingEntry")?;
    let field = |name: &str| xml::child_text(response, name);

    let private_host = field("NewInternalClient")?;
    Some(PortMapping {
        public: Endpoint {
            host: field("NewRemoteHost").unwrap_or_default(),
            port: field("NewExternalPort")?.parse().ok()?,
        },
        private: Endpoint {
            host: private_host.clone(),
            port: field("NewInternalPort")?.parse().ok()?,
        },
        protocol: field("NewProtocol")?.parse().ok()?,
        enabled: field("NewEnabled").as_deref() == Some("1"),
        description: field("NewPortMappingDescription").unwrap_or_default(),
        ttl: field("NewLeaseDuration")?.parse().ok()?,
        local: private_host == local_addr.to_string(),
    })
}
