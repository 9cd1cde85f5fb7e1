//! Generation-2 stream session
//!
//! One actor task owns the event stream, the session lease, the heartbeat
//! timer and the reconnect deadline of a generation-2 receiver.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──► Subscribing ──► Active
//!     ▲              │             │  stream error / end
//!     │              └──────┬──────┘
//!     └──── Reconnecting ◄──┘ ──(budget spent)──► Failed
//! ```
//!
//! - **Connecting**: `GET /api/device/identity` proves reachability and
//!   credentials, then the event stream is opened.
//! - **Subscribing**: the first event on the stream announces the lease;
//!   the resource list is `PUT` against it before any later event is read.
//! - **Active**: events are decoded into the [`DeviceStore`]; a heartbeat
//!   reads the lease periodically. Heartbeat failures are only logged.
//! - **Reconnecting**: entered on any failed connect, failed subscribe,
//!   stream error or stream end. Scheduling is idempotent, so a second
//!   disconnect during the wait does not touch the attempt counter. The
//!   counter only resets once a subscription is active again; running out of
//!   attempts is the one terminal state.
//!
//! Shutdown releases the lease with `DELETE` before the stream is closed.

mod resources;

pub use resources::subscription_resources;

use std::sync::Arc;

use bytes::Bytes;
use ewdx_state::decoders::ResourceDecoder;
use ewdx_state::DeviceStore;
use futures::StreamExt;
use serde_json::{json, Value};
use ssc_client::{EventStream, RestTransport};
use ssc_codec::resource::{
    dedup_paths, lease_add_path, lease_path, lease_remove_path, DeviceResource,
    SUBSCRIPTIONS_ENDPOINT,
};
use ssc_codec::{LeaseAnnouncement, Resource, SseDecoder, SseEvent};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::backoff::ReconnectPolicy;
use crate::config::StreamTiming;
use crate::error::{Result, SessionError};
use crate::scheduler::ScheduledTasks;
use crate::session::{expire, join_actor};
use crate::status::{ConnectionStatus, StatusPublisher};

/// Status reason published when the stream drops
pub const CONNECTION_LOST: &str = "Connection lost, attempting to reconnect...";

const COMMAND_BUFFER: usize = 16;
const TICK_BUFFER: usize = 4;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Subscribing,
    Active,
    Reconnecting,
    /// No further attempts will be made
    Failed,
}

/// Operation against the current session lease
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseRequest {
    /// Read the lease's resource list
    Status,
    Add(Vec<String>),
    Remove(Vec<String>),
    /// Replace the whole resource list
    Replace(Vec<String>),
}

#[derive(Debug)]
enum StreamCommand {
    Lease(LeaseRequest, oneshot::Sender<Result<Value>>),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Heartbeat,
}

/// Handle to a running stream session
#[derive(Debug)]
pub struct StreamSession {
    commands: mpsc::Sender<StreamCommand>,
    phase: watch::Receiver<SessionPhase>,
    task: Option<JoinHandle<()>>,
}

impl StreamSession {
    /// Spawn the session actor; connecting starts immediately
    pub fn start(
        rest: Arc<dyn RestTransport>,
        store: Arc<DeviceStore>,
        resources: Vec<String>,
        timing: StreamTiming,
        status: StatusPublisher,
    ) -> Self {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (ticks_tx, ticks) = mpsc::channel(TICK_BUFFER);
        let (phase_tx, phase) = watch::channel(SessionPhase::Connecting);

        let actor = StreamActor {
            rest,
            store,
            resources: dedup_paths(resources),
            policy: ReconnectPolicy::from(&timing),
            timing,
            status,
            phase: phase_tx,
            commands,
            ticks,
            tasks: ScheduledTasks::new(ticks_tx),
            events: None,
            sse: SseDecoder::new(),
            lease: None,
            attempts: 0,
            reconnect_at: None,
            connect_pending: true,
        };

        Self {
            commands: commands_tx,
            phase,
            task: Some(tokio::spawn(actor.run())),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.clone()
    }

    /// Resource list the device holds for the current lease
    pub async fn lease_status(&self) -> Result<Value> {
        self.lease(LeaseRequest::Status).await
    }

    pub async fn add_resources(&self, paths: Vec<String>) -> Result<Value> {
        self.lease(LeaseRequest::Add(paths)).await
    }

    pub async fn remove_resources(&self, paths: Vec<String>) -> Result<Value> {
        self.lease(LeaseRequest::Remove(paths)).await
    }

    pub async fn replace_resources(&self, paths: Vec<String>) -> Result<Value> {
        self.lease(LeaseRequest::Replace(paths)).await
    }

    /// Run any lease operation
    pub async fn lease(&self, request: LeaseRequest) -> Result<Value> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(StreamCommand::Lease(request, reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)?
    }

    /// Release the lease, close the stream and stop the actor
    pub async fn shutdown(mut self) -> Result<()> {
        let _ = self.commands.send(StreamCommand::Shutdown).await;
        match self.task.take() {
            Some(task) => join_actor(task, "stream").await,
            None => Ok(()),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct StreamActor {
    rest: Arc<dyn RestTransport>,
    store: Arc<DeviceStore>,
    resources: Vec<String>,
    policy: ReconnectPolicy,
    timing: StreamTiming,
    status: StatusPublisher,
    phase: watch::Sender<SessionPhase>,
    commands: mpsc::Receiver<StreamCommand>,
    ticks: mpsc::Receiver<Tick>,
    tasks: ScheduledTasks<Tick>,
    events: Option<EventStream>,
    sse: SseDecoder,
    lease: Option<String>,
    attempts: u32,
    reconnect_at: Option<Instant>,
    connect_pending: bool,
}

impl StreamActor {
    async fn run(mut self) {
        info!(resources = self.resources.len(), "Stream session started");
        self.status.set(ConnectionStatus::Connecting);

        loop {
            if std::mem::take(&mut self.connect_pending) {
                if !self.connect().await {
                    break;
                }
                continue;
            }

            let reconnect_at = self.reconnect_at;
            tokio::select! {
                biased;
                command = self.commands.recv() => {
                    if !self.on_command(command).await {
                        break;
                    }
                }
                chunk = next_chunk(&mut self.events) => self.on_chunk(chunk).await,
                Some(Tick::Heartbeat) = self.ticks.recv() => self.on_heartbeat().await,
                _ = expire(reconnect_at) => self.on_reconnect_due(),
            }
        }

        self.teardown().await;
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.phase.send_if_modified(|current| {
            if *current == phase {
                return false;
            }
            debug!(from = ?*current, to = ?phase, "Session phase changed");
            *current = phase;
            true
        });
    }

    /// One connection attempt; returns `false` if shutdown was requested meanwhile
    async fn connect(&mut self) -> bool {
        self.set_phase(SessionPhase::Connecting);

        let establish = establish(Arc::clone(&self.rest), self.status.clone());
        tokio::pin!(establish);
        let outcome = loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(StreamCommand::Lease(_, reply)) => {
                        let _ = reply.send(Err(SessionError::NoLease));
                    }
                    Some(StreamCommand::Shutdown) | None => return false,
                },
                outcome = &mut establish => break outcome,
            }
        };

        match outcome {
            Ok(stream) => {
                info!("Event stream open, waiting for lease");
                self.events = Some(stream);
                self.sse = SseDecoder::new();
                self.lease = None;
                self.set_phase(SessionPhase::Subscribing);
                self.tasks
                    .every(self.timing.heartbeat_interval, Tick::Heartbeat);
            }
            Err(e) => {
                warn!(error = %e, attempt = self.attempts, "Connection attempt failed");
                self.schedule_reconnect(connect_failure_reason(&e));
            }
        }
        true
    }

    async fn on_command(&mut self, command: Option<StreamCommand>) -> bool {
        match command {
            Some(StreamCommand::Lease(request, reply)) => {
                let result = self.lease_request(request).await;
                let _ = reply.send(result);
                true
            }
            Some(StreamCommand::Shutdown) | None => false,
        }
    }

    async fn lease_request(&mut self, request: LeaseRequest) -> Result<Value> {
        let lease = self.lease.clone().ok_or(SessionError::NoLease)?;
        debug!(%lease, ?request, "Lease request");

        match request {
            LeaseRequest::Status => Ok(self.rest.get(&lease_path(&lease)).await?),
            LeaseRequest::Add(paths) => {
                let response = self.rest.put(&lease_add_path(&lease), &json!(paths)).await?;
                let merged = self.resources.drain(..).chain(paths);
                self.resources = dedup_paths(merged);
                Ok(response)
            }
            LeaseRequest::Remove(paths) => {
                let response = self
                    .rest
                    .put(&lease_remove_path(&lease), &json!(paths))
                    .await?;
                self.resources.retain(|path| !paths.contains(path));
                Ok(response)
            }
            LeaseRequest::Replace(paths) => {
                let paths = dedup_paths(paths);
                let response = self.rest.put(&lease_path(&lease), &json!(paths)).await?;
                self.resources = paths;
                Ok(response)
            }
        }
    }

    async fn on_chunk(&mut self, chunk: Option<ssc_client::Result<Bytes>>) {
        match chunk {
            Some(Ok(bytes)) => {
                trace!(bytes = bytes.len(), "Stream chunk");
                for event in self.sse.feed(&bytes) {
                    // A failed subscribe closes the stream mid-chunk
                    if self.events.is_none() {
                        break;
                    }
                    self.on_event(event).await;
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, "Event stream error");
                self.schedule_reconnect(CONNECTION_LOST.to_string());
            }
            None => {
                if let Some(event) = self.sse.finish() {
                    self.on_event(event).await;
                }
                info!("Event stream ended by device");
                self.schedule_reconnect(CONNECTION_LOST.to_string());
            }
        }
    }

    async fn on_event(&mut self, event: SseEvent) {
        if self.lease.is_none() {
            match LeaseAnnouncement::from_event_data(&event.data) {
                Ok(Some(announcement)) => {
                    self.subscribe(announcement).await;
                    return;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Dropping malformed event");
                    return;
                }
            }
        }

        match self.store.apply_text(&ResourceDecoder, &event.data) {
            Ok(report) => trace!(changed = report.has_changes(), "Applied event"),
            Err(e) => warn!(error = %e, "Dropping malformed event"),
        }
    }

    async fn subscribe(&mut self, announcement: LeaseAnnouncement) {
        let lease = announcement.session_uuid;
        info!(%lease, path = %announcement.path, "Lease granted");
        self.lease = Some(lease.clone());

        match self.rest.put(&lease_path(&lease), &json!(self.resources)).await {
            Ok(_) => {
                info!(%lease, resources = self.resources.len(), "Resources subscribed");
                self.attempts = 0;
                self.set_phase(SessionPhase::Active);
            }
            Err(e) => {
                warn!(%lease, error = %e, "Resource subscription failed");
                self.schedule_reconnect(CONNECTION_LOST.to_string());
            }
        }
    }

    async fn on_heartbeat(&mut self) {
        let Some(lease) = self.lease.as_deref() else {
            return;
        };
        match self.rest.get(&lease_path(lease)).await {
            Ok(_) => debug!(lease, "Heartbeat ok"),
            Err(e) => warn!(lease, error = %e, "Heartbeat failed"),
        }
    }

    fn schedule_reconnect(&mut self, reason: String) {
        if self.reconnect_at.is_some() || *self.phase.borrow() == SessionPhase::Failed {
            debug!("Reconnect already pending");
            return;
        }

        self.status.set(ConnectionStatus::Disconnected(reason));
        self.events = None;
        if let Some(lease) = self.lease.take() {
            self.release_in_background(lease);
        }
        self.tasks.cancel_all();

        self.attempts += 1;
        let max = self.policy.max_attempts();
        match self.policy.delay(self.attempts) {
            Some(delay) => {
                info!(
                    attempt = self.attempts,
                    max,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnect scheduled"
                );
                self.reconnect_at = Some(Instant::now() + delay);
                self.set_phase(SessionPhase::Reconnecting);
            }
            None => {
                error!(max, "Reconnect budget exhausted");
                self.status.set(ConnectionStatus::ConnectionFailure(format!(
                    "Failed to reconnect after {} attempts",
                    max
                )));
                self.set_phase(SessionPhase::Failed);
            }
        }
    }

    /// Best-effort `DELETE` of a lease the session is walking away from
    fn release_in_background(&self, lease: String) {
        let rest = Arc::clone(&self.rest);
        tokio::spawn(async move {
            match rest.delete(&lease_path(&lease)).await {
                Ok(()) => debug!(%lease, "Abandoned lease released"),
                Err(e) => debug!(%lease, error = %e, "Abandoned lease release failed"),
            }
        });
    }

    fn on_reconnect_due(&mut self) {
        self.reconnect_at = None;
        info!(
            "Reconnecting... (attempt {}/{})",
            self.attempts,
            self.policy.max_attempts()
        );
        self.status.set(ConnectionStatus::Connecting);
        self.connect_pending = true;
    }

    async fn teardown(&mut self) {
        self.tasks.cancel_all();
        self.reconnect_at = None;

        if let Some(lease) = self.lease.take() {
            match self.rest.delete(&lease_path(&lease)).await {
                Ok(()) => info!(%lease, "Lease released"),
                Err(e) => warn!(%lease, error = %e, "Lease release failed"),
            }
        }
        self.events = None;
        info!("Stream session stopped");
    }
}

/// Status text for a connect attempt that failed
///
/// Rejected credentials and unexpected answers are still retried, but the
/// host gets told what went wrong instead of a generic connection loss.
fn connect_failure_reason(error: &SessionError) -> String {
    match error {
        SessionError::Client(e) if !e.is_transient() => {
            format!("Connection failed: {}, retrying...", e)
        }
        _ => CONNECTION_LOST.to_string(),
    }
}

/// Identity probe, then open the event stream
async fn establish(rest: Arc<dyn RestTransport>, status: StatusPublisher) -> Result<EventStream> {
    let identity_path = Resource::Device(DeviceResource::Identity).path();
    let identity = rest.get(&identity_path).await?;
    debug!(%identity, "Device identity");
    status.set(ConnectionStatus::Ok);

    Ok(rest.open_event_stream(SUBSCRIPTIONS_ENDPOINT).await?)
}

async fn next_chunk(events: &mut Option<EventStream>) -> Option<ssc_client::Result<Bytes>> {
    match events {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
