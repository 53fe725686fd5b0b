//! Wire-level building blocks of the UPnP IGD control protocol: SSDP
//! discovery, SOAP envelopes and device description documents.

pub mod description;
pub mod soap;
pub mod ssdp;
pub mod xml;
