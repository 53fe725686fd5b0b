//! SOAP envelope construction and reply dissection.
//!
//! Requests use the fixed UPnP control template; replies are dissected by
//! resolving the envelope namespace from the document's own declarations
//! rather than assuming a prefix, since gateways disagree on what to call it
//! (`s:`, `SOAP-ENV:`, `soap:`, ...).

use std::fmt::Write;

use xmltree::{Element, XMLNode};

use crate::xml;

pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// One `(name, value)` action argument; `None` serializes to an empty element.
pub type Argument<'a> = (&'a str, Option<String>);

/// Render the request envelope for `action`, namespaced to `service_type`,
/// with arguments emitted in the given order.
pub fn request_envelope(service_type: &str, action: &str, arguments: &[Argument]) -> String {
    let mut args = String::new();
    for (name, value) in arguments {
        match value {
            Some(value) => {
                let _ = write!(args, "<{name}>{}</{name}>", xml::escape(value));
            }
            None => {
                let _ = write!(args, "<{name}></{name}>");
            }
        }
    }

    format!(
        "<?xml version=\"1.0\"?>\
         <s:Envelope xmlns:s=\"{ENVELOPE_NS}\" s:encodingStyle=\"{ENCODING_NS}\">\
         <s:Body>\
         <u:{action} xmlns:u=\"{service_type}\">{args}</u:{action}>\
         </s:Body>\
         </s:Envelope>"
    )
}

/// The quoted `SOAPAction` header value for `action` on `service_type`.
pub fn action_header(service_type: &str, action: &str) -> String {
    format!("\"{service_type}#{action}\"")
}

/// Parse a reply document.
pub fn parse(body: &[u8]) -> Result<Element, xmltree::ParseError> {
    Element::parse(body)
}

/// The `Body` element of a parsed envelope, matched by the namespace URI it
/// was declared under.
pub fn body(envelope: &Element) -> Option<&Element> {
    envelope
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .find(|element| element.name == "Body" && element.namespace.as_deref() == Some(ENVELOPE_NS))
}

/// The `{action}Response` element inside a reply body, matched by local name
/// regardless of prefix.
pub fn response_element<'a>(body: &'a Element, action: &str) -> Option<&'a Element> {
    let wanted = format!("{action}Response");
    body.children
        .iter()
        .filter_map(XMLNode::as_element)
        .find(|element| element.name == wanted)
}
