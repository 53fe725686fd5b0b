//! Error taxonomy shared by every public gateway operation.
//!
//! Each operation resolves with exactly one value or exactly one of these
//! variants; nothing is retried internally.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The discovery deadline passed without any gateway answering.
    #[error("timed out waiting for a gateway")]
    Timeout,

    /// The gateway answered an HTTP request with a non-2xx status.
    #[error("request failed with status {0}")]
    RequestFailed(u16),

    /// A device description or SOAP reply was not well-formed XML.
    #[error("malformed xml: {0}")]
    Parse(#[from] xmltree::ParseError),

    /// No candidate service type resolved to a usable control endpoint.
    #[error("no matching service found in device description")]
    NoServiceFound,

    /// A SOAP reply lacked the expected `{action}Response` element or field.
    #[error("missing {0}Response element in reply")]
    IncorrectResponse(String),

    /// A connection-level failure below the HTTP status line.
    #[error("transport error: {0}")]
    Transport(String),
}
