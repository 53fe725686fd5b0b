//! SSDP discovery transport.
//!
//! Sends a single M-SEARCH request, multicast for broad discovery or unicast
//! to probe one address, and surfaces matching responses as a stream of
//! [`DeviceFound`] events with an explicit stop signal.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tracing::{trace, warn};

/// Search target for a NAT gateway root device.
pub const IGD_DEVICE: &str = "urn:schemas-upnp-org:device:InternetGatewayDevice:1";

const SSDP_PORT: u16 = 1900;
const SSDP_MULTICAST: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(239, 255, 255, 250)), SSDP_PORT);
const RECV_BUFFER: usize = 1500;

/// One "device found" notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFound {
    /// URL of the device's description document.
    pub location: String,
    /// Address of the local interface the response arrived on.
    pub local_addr: IpAddr,
    /// The responding device's address and port.
    pub remote: SocketAddr,
}

/// A running search. Stopping (or dropping) it signals the listener task to
/// exit and release its hold on the socket.
pub struct SsdpSearch {
    events: mpsc::UnboundedReceiver<DeviceFound>,
    stop: Option<oneshot::Sender<()>>,
}

impl SsdpSearch {
    /// Next notification, or `None` once the search has ended.
    pub async fn recv(&mut self) -> Option<DeviceFound> {
        self.events.recv().await
    }

    /// Signal the listener to stop; late responses are discarded.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for SsdpSearch {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A detached search fed manually, for callers that source "device found"
/// events from somewhere other than the network.
pub fn channel() -> (mpsc::UnboundedSender<DeviceFound>, SsdpSearch) {
    let (events_tx, events) = mpsc::unbounded_channel();
    let search = SsdpSearch { events, stop: None };
    (events_tx, search)
}

/// A discovery handle owning its UDP socket for the lifetime of the client.
///
/// The socket is acquired at construction and released when the client and
/// any running searches are dropped.
pub struct SsdpClient {
    socket: Arc<UdpSocket>,
}

impl SsdpClient {
    /// Bind the discovery socket.
    pub async fn bind() -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    /// Issue one M-SEARCH for `search_target` and stream matching responses.
    ///
    /// `address` switches from multicast discovery to a unicast probe of a
    /// specific gateway.
    pub fn search(&self, search_target: &str, address: Option<IpAddr>) -> SsdpSearch {
        let destination = match address {
            Some(ip) => SocketAddr::new(ip, SSDP_PORT),
            None => SSDP_MULTICAST,
        };
        let request = m_search(search_target, destination);
        let (events_tx, events) = mpsc::unbounded_channel();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let socket = Arc::clone(&self.socket);
        let search_target = search_target.to_string();

        tokio::spawn(async move {
            if let Err(err) = socket.send_to(request.as_bytes(), destination).await {
                warn!("failed to send M-SEARCH to {destination}: {err}");
                return;
            }
            let mut buf = vec![0u8; RECV_BUFFER];
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    received = socket.recv_from(&mut buf) => {
                        let (len, remote) = match received {
                            Ok(pair) => pair,
                            Err(err) => {
                                warn!("ssdp receive failed: {err}");
                                break;
                            }
                        };
                        let response = String::from_utf8_lossy(&buf[..len]);
                        let Some(location) = parse_response(&response, &search_target) else {
                            trace!("ignoring non-matching ssdp datagram from {remote}");
                            continue;
                        };
                        let local_addr = match local_addr_for(remote) {
                            Ok(addr) => addr,
                            Err(err) => {
                                warn!("cannot determine local address towards {remote}: {err}");
                                continue;
                            }
                        };
                        if events_tx.send(DeviceFound { location, local_addr, remote }).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        SsdpSearch {
            events,
            stop: Some(stop_tx),
        }
    }

    /// Release the underlying socket.
    pub fn close(self) {}
}

fn m_search(search_target: &str, destination: SocketAddr) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {destination}\r\n\
         ST: {search_target}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 3\r\n\r\n"
    )
}

/// Extract the LOCATION header from a response whose ST or USN names the
/// search target. Header names are case-insensitive.
fn parse_response(response: &str, search_target: &str) -> Option<String> {
    let mut location = None;
    let mut matches = false;
    for line in response.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "location" => location = Some(value.to_string()),
            "st" | "usn" if value.contains(search_target) => matches = true,
            _ => {}
        }
    }
    if matches { location } else { None }
}

/// The local interface address the OS routes towards `remote`.
///
/// The probe socket never sends a datagram; connecting is enough to make the
/// OS pick a source address.
fn local_addr_for(remote: SocketAddr) -> io::Result<IpAddr> {
    let probe = std::net::UdpSocket::bind(("0.0.0.0", 0))?;
    probe.connect(remote)?;
    Ok(probe.local_addr()?.ip())
}
