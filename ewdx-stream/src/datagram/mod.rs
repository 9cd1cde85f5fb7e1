//! Generation-1 datagram session
//!
//! One actor task owns the UDP link, the watchdog deadline and every
//! periodic timer of a generation-1 device. Controllers hand it documents
//! through [`DatagramSession::send`]; all inbound datagrams are decoded into
//! the [`DeviceStore`] on the actor task, in arrival order.
//!
//! # Liveness
//!
//! The link has no handshake. The device counts as online from the first
//! datagram it sends and as offline once a send goes unanswered for
//! [`DatagramTiming::response_timeout`]. Every send re-arms the watchdog and
//! every inbound datagram clears it. A periodic probe of `/device/name` keeps
//! the watchdog exercised when the host is idle.
//!
//! Going offline resets the model to unknown and publishes
//! [`ConnectionStatus::Disconnected`], once per outage.

mod profile;

pub use profile::DatagramProfile;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ewdx_state::decoders::decoder_for;
use ewdx_state::{DeviceStore, MessageDecoder, Protocol};
use serde_json::Value;
use ssc_client::DatagramLink;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::DatagramTiming;
use crate::error::{Result, SessionError};
use crate::scheduler::ScheduledTasks;
use crate::session::{expire, join_actor};
use crate::status::{ConnectionStatus, StatusPublisher};

/// Status reason published when the watchdog fires
pub const NOT_RESPONDING: &str = "Device not responding - make sure its connected and turned on.";

const COMMAND_BUFFER: usize = 64;
const TICK_BUFFER: usize = 16;

/// Pause after a failed receive before listening again
const RECV_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug)]
enum DatagramCommand {
    Send(Value),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Probe,
    Refresh,
    StaticInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    /// Nothing received yet
    Pending,
    Online,
    Offline,
}

/// Handle to a running datagram session
///
/// Dropping the handle aborts the actor; [`DatagramSession::shutdown`] stops
/// it gracefully.
#[derive(Debug)]
pub struct DatagramSession {
    commands: mpsc::Sender<DatagramCommand>,
    task: Option<JoinHandle<()>>,
    device: SocketAddr,
}

/// Send-only handle to a [`DatagramSession`]
///
/// Sends fail with [`SessionError::Closed`] once the session has stopped.
#[derive(Debug, Clone)]
pub struct DatagramSender {
    commands: mpsc::Sender<DatagramCommand>,
}

impl DatagramSender {
    pub async fn send(&self, document: Value) -> Result<()> {
        self.commands
            .send(DatagramCommand::Send(document))
            .await
            .map_err(|_| SessionError::Closed)
    }
}

impl DatagramSession {
    /// Spawn the session actor and send the initial subscriptions
    pub fn start(
        link: Arc<dyn DatagramLink>,
        store: Arc<DeviceStore>,
        profile: DatagramProfile,
        timing: DatagramTiming,
        status: StatusPublisher,
    ) -> Self {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (ticks_tx, ticks) = mpsc::channel(TICK_BUFFER);
        let device = link.device_addr();

        let actor = DatagramActor {
            decoder: decoder_for(profile.model(), Protocol::Scp1),
            link,
            store,
            profile,
            timing,
            status,
            state: LinkState::Pending,
            watchdog: None,
            recv_retry: None,
            commands,
            ticks,
            tasks: ScheduledTasks::new(ticks_tx),
        };

        Self {
            commands: commands_tx,
            task: Some(tokio::spawn(actor.run())),
            device,
        }
    }

    pub fn device_addr(&self) -> SocketAddr {
        self.device
    }

    /// Queue one document for sending
    ///
    /// Returns once the document is queued; delivery is fire-and-forget.
    pub async fn send(&self, document: Value) -> Result<()> {
        self.commands
            .send(DatagramCommand::Send(document))
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Cloneable handle that can only send
    pub fn sender(&self) -> DatagramSender {
        DatagramSender {
            commands: self.commands.clone(),
        }
    }

    /// Stop all timers and the actor
    pub async fn shutdown(mut self) -> Result<()> {
        let _ = self.commands.send(DatagramCommand::Shutdown).await;
        match self.task.take() {
            Some(task) => join_actor(task, "datagram").await,
            None => Ok(()),
        }
    }
}

impl Drop for DatagramSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct DatagramActor {
    link: Arc<dyn DatagramLink>,
    store: Arc<DeviceStore>,
    decoder: Box<dyn MessageDecoder>,
    profile: DatagramProfile,
    timing: DatagramTiming,
    status: StatusPublisher,
    state: LinkState,
    watchdog: Option<Instant>,
    /// Receiving is paused until this deadline after a failed receive
    recv_retry: Option<Instant>,
    commands: mpsc::Receiver<DatagramCommand>,
    ticks: mpsc::Receiver<Tick>,
    tasks: ScheduledTasks<Tick>,
}

impl DatagramActor {
    async fn run(mut self) {
        let model = self.profile.model();
        info!(device = %self.link.device_addr(), %model, "Datagram session started");
        self.status.set(ConnectionStatus::Connecting);

        self.tasks.every(self.timing.probe_interval, Tick::Probe);
        self.tasks.every(self.timing.refresh_interval(model), Tick::Refresh);
        self.tasks.after(self.timing.static_info_delay, Tick::StaticInfo);
        self.subscribe().await;

        loop {
            let watchdog = self.watchdog;
            let recv_retry = self.recv_retry;
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(DatagramCommand::Send(document)) => self.send(&document).await,
                    Some(DatagramCommand::Shutdown) | None => break,
                },
                received = self.link.recv(), if recv_retry.is_none() => match received {
                    Ok(payload) => self.on_datagram(&payload),
                    Err(e) => {
                        warn!(error = %e, "Receive failed");
                        self.recv_retry = Some(Instant::now() + RECV_RETRY_DELAY);
                    }
                },
                Some(tick) = self.ticks.recv() => self.on_tick(tick).await,
                _ = expire(watchdog) => self.on_watchdog(),
                _ = expire(recv_retry) => self.recv_retry = None,
            }
        }

        self.tasks.cancel_all();
        info!(device = %self.link.device_addr(), "Datagram session stopped");
    }

    async fn send(&mut self, document: &Value) {
        let payload = ssc_codec::to_wire(document);
        debug!(device = %self.link.device_addr(), %document, "Sending");
        if let Err(e) = self.link.send(&payload).await {
            warn!(error = %e, "Send failed");
        }
        self.watchdog = Some(Instant::now() + self.timing.response_timeout);
    }

    async fn subscribe(&mut self) {
        for document in self.profile.subscriptions().to_vec() {
            self.send(&document).await;
        }
    }

    async fn query_static_info(&mut self) {
        for document in self.profile.static_queries().to_vec() {
            self.send(&document).await;
        }
    }

    async fn on_tick(&mut self, tick: Tick) {
        trace!(?tick, "Timer tick");
        match tick {
            Tick::Probe => {
                let probe = self.profile.probe().clone();
                self.send(&probe).await;
            }
            Tick::Refresh => {
                self.subscribe().await;
                self.query_static_info().await;
            }
            Tick::StaticInfo => self.query_static_info().await,
        }
    }

    fn on_datagram(&mut self, payload: &[u8]) {
        self.watchdog = None;
        if self.state != LinkState::Online {
            info!(device = %self.link.device_addr(), "Device online");
            self.state = LinkState::Online;
            self.status.set(ConnectionStatus::Ok);
        }

        match self.store.apply_payload(self.decoder.as_ref(), payload) {
            Ok(report) => trace!(changed = report.has_changes(), "Applied datagram"),
            Err(e) => warn!(error = %e, bytes = payload.len(), "Dropping malformed datagram"),
        }
    }

    fn on_watchdog(&mut self) {
        self.watchdog = None;
        if self.state == LinkState::Offline {
            return;
        }

        warn!(
            device = %self.link.device_addr(),
            timeout_ms = self.timing.response_timeout.as_millis() as u64,
            "Device not responding"
        );
        self.state = LinkState::Offline;
        self.store.reset();
        self.status
            .set(ConnectionStatus::Disconnected(NOT_RESPONDING.to_string()));
    }
}
