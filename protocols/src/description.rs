//! UPnP device description documents.
//!
//! A gateway's description nests devices inside `deviceList` elements and
//! services inside `serviceList` elements to arbitrary depth. Callers get a
//! flat, document-ordered view of every service entry plus the document's
//! declared URL base.

use xmltree::{Element, XMLNode};

use crate::xml;

/// A service entry as it appears in the document; URLs are raw and possibly
/// relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub service_type: String,
    pub control_url: Option<String>,
    pub scpd_url: Option<String>,
}

/// A parsed description document.
#[derive(Debug)]
pub struct DeviceDescription {
    root: Element,
}

impl DeviceDescription {
    pub fn parse(body: &[u8]) -> Result<Self, xmltree::ParseError> {
        Element::parse(body).map(|root| Self { root })
    }

    /// The document's declared base for relative URL resolution, if any.
    pub fn base_url(&self) -> Option<String> {
        xml::child_text(&self.root, "URLBase")
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty())
    }

    /// Every service entry in the document, flattened depth-first in
    /// document order.
    pub fn services(&self) -> Vec<ServiceEntry> {
        let mut services = Vec::new();
        if let Some(device) = xml::child(&self.root, "device") {
            collect_services(device, &mut services);
        }
        services
    }
}

fn collect_services(device: &Element, out: &mut Vec<ServiceEntry>) {
    for node in device.children.iter().filter_map(XMLNode::as_element) {
        match node.name.as_str() {
            "serviceList" => {
                for service in xml::children(node, "service") {
                    if let Some(service_type) = xml::child_text(service, "serviceType") {
                        out.push(ServiceEntry {
                            service_type: service_type.trim().to_string(),
                            control_url: xml::child_text(service, "controlURL"),
                            scpd_url: xml::child_text(service, "SCPDURL"),
                        });
                    }
                }
            }
            "deviceList" => {
                for nested in xml::children(node, "device") {
                    collect_services(nested, out);
                }
            }
            _ => {}
        }
    }
}
