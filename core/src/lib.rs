//! # portgate core
//!
//! Protocol-handling core of the UPnP IGD client: gateway discovery,
//! control-endpoint resolution, SOAP action invocation and the port-mapping
//! catalog.
//!
//! The usual entry point is [`Client`]: bind it once, discover a
//! [`Gateway`], operate on the gateway, then close the client to release the
//! discovery socket.

pub mod catalog;
pub mod client;
pub mod device;
pub mod discovery;
pub mod gateway;

pub use client::Client;
pub use device::ServiceDescriptor;
pub use discovery::{DiscoveryTransport, locate};
pub use gateway::{ActionInvoker, Gateway, GatewayHandle};
pub use portgate_common::error::{Error, Result};
