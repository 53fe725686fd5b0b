//! Control-endpoint resolution from a gateway's description document.

use portgate_common::error::{Error, Result};
use portgate_protocols::description::{DeviceDescription, ServiceEntry};
use url::Url;

use crate::gateway::GatewayHandle;

/// A usable control endpoint with both URLs resolved to absolute form.
///
/// Absence of either URL is a resolution failure, never a partially valid
/// descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub service_type: String,
    pub control_url: Url,
    pub scpd_url: Url,
}

/// Fetch the description document and resolve the first candidate service.
///
/// Runs fresh on every action invocation so a gateway may rewrite its
/// description between calls; the cost is one extra round trip per action.
pub(crate) async fn resolve_service(
    http: &reqwest::Client,
    handle: &GatewayHandle,
) -> Result<ServiceDescriptor> {
    let response = http
        .get(handle.location.as_str())
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
    let document = DeviceDescription::parse(&body)?;

    pick_service(&document, handle)
}

/// Document order breaks ties between eligible services, not the order of
/// the candidate list.
fn pick_service(document: &DeviceDescription, handle: &GatewayHandle) -> Result<ServiceDescriptor> {
    let entry = document
        .services()
        .into_iter()
        .find(|service| {
            handle
                .service_types
                .iter()
                .any(|candidate| candidate == &service.service_type)
        })
        .ok_or(Error::NoServiceFound)?;

    let base = document
        .base_url()
        .unwrap_or_else(|| handle.location.clone());
    resolve_entry(&base, entry)
}

fn resolve_entry(base: &str, entry: ServiceEntry) -> Result<ServiceDescriptor> {
    let base = Url::parse(base).map_err(|_| Error::NoServiceFound)?;
    let control_url = entry
        .control_url
        .as_deref()
        .and_then(|raw| resolve(&base, raw))
        .ok_or(Error::NoServiceFound)?;
    let scpd_url = entry
        .scpd_url
        .as_deref()
        .and_then(|raw| resolve(&base, raw))
        .ok_or(Error::NoServiceFound)?;

    Ok(ServiceDescriptor {
        service_type: entry.service_type,
        control_url,
        scpd_url,
    })
}

/// Absolute URLs pass through; relative ones resolve against `base`.
fn resolve(base: &Url, candidate: &str) -> Option<Url> {
    match Url::parse(candidate) {
        Ok(url) => Some(url),
        Err(_) => base.join(candidate).ok(),
    }
}
