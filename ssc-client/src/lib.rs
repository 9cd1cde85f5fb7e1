//! Private SSC transport clients for EW-DX device communication
//!
//! Two transports, one per protocol generation:
//!
//! - [`UdpLink`]: fire-and-forget JSON datagrams on port 45 (generation 1)
//! - [`RestClient`]: HTTPS REST with Basic auth plus a long-lived
//!   `text/event-stream` response (generation 2)
//!
//! Both sit behind async traits ([`DatagramLink`], [`RestTransport`]) so the
//! session layer can be driven by in-memory links in tests.

mod datagram;
mod error;
mod rest;

pub use datagram::{DatagramLink, UdpLink, SSC_UDP_PORT};
pub use error::{ClientError, Result};
pub use rest::{EventStream, RestClient, RestConfig, RestTransport, API_USER, DEFAULT_TIMEOUT};
