//! # ewdx-stream
//!
//! Transport sessions for EW-DX devices. A session keeps the
//! [`DeviceStore`](ewdx_state::DeviceStore) in sync with one physical device
//! and carries outbound commands to it.
//!
//! - [`DatagramSession`]: generation 1, JSON over UDP port 45. Liveness is
//!   inferred from inbound traffic with a re-armed watchdog.
//! - [`StreamSession`]: generation 2, HTTPS REST plus one long-lived
//!   server-sent-event stream scoped by a session lease.
//!
//! Each session is a single actor task that owns its link and every timer,
//! so all model mutation happens on one logical thread and dropping or
//! shutting down the session cancels everything it scheduled. Connectivity is
//! published to the host through a [`StatusPublisher`].

mod backoff;
mod config;
pub mod datagram;
mod error;
mod scheduler;
mod session;
mod status;
pub mod stream;

pub use backoff::ReconnectPolicy;
pub use config::{DatagramTiming, StreamTiming};
pub use datagram::{DatagramProfile, DatagramSender, DatagramSession};
pub use error::{Result, SessionError};
pub use scheduler::ScheduledTasks;
pub use session::SHUTDOWN_TIMEOUT;
pub use status::{ConnectionStatus, StatusPublisher};
pub use stream::{subscription_resources, LeaseRequest, SessionPhase, StreamSession};
