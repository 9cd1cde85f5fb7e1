//! In-memory transports for driving sessions in tests.
//!
//! `MockDevice` stands in for a generation-1 device behind a UDP link and
//! `MockRest` for a generation-2 device behind the HTTPS client. Both record
//! every outbound request so tests can assert on wire traffic.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::mpsc as stream_channel;
use parking_lot::Mutex;
use serde_json::Value;
use ssc_client::{ClientError, DatagramLink, EventStream, RestTransport};
use tokio::sync::mpsc;

/// Let spawned tasks run; the paused clock advances by `ms`
pub async fn settle_for(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub async fn settle() {
    settle_for(10).await;
}

// ============================================================================
// Generation 1
// ============================================================================

/// A generation-1 device reachable through [`DatagramLink`]
pub struct MockDevice {
    addr: SocketAddr,
    sent: Mutex<Vec<Value>>,
    inbound_tx: mpsc::UnboundedSender<Vec<u8>>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    auto_reply: Mutex<Option<Vec<u8>>>,
    recv_fails: AtomicBool,
}

impl MockDevice {
    pub fn new() -> Arc<Self> {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            addr: "192.168.1.50:45".parse().unwrap(),
            sent: Mutex::new(Vec::new()),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            auto_reply: Mutex::new(None),
            recv_fails: AtomicBool::new(false),
        })
    }

    /// Deliver a datagram from the device
    pub fn reply(&self, payload: &str) {
        self.inbound_tx.send(payload.as_bytes().to_vec()).unwrap();
    }

    /// Answer every send with `payload`
    pub fn always_reply(&self, payload: &str) {
        *self.auto_reply.lock() = Some(payload.as_bytes().to_vec());
    }

    /// Make every receive fail immediately with a socket error
    pub fn set_recv_fails(&self, fails: bool) {
        self.recv_fails.store(fails, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl DatagramLink for MockDevice {
    async fn send(&self, payload: &[u8]) -> ssc_client::Result<()> {
        let document = serde_json::from_slice(payload)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.sent.lock().push(document);
        if let Some(reply) = self.auto_reply.lock().clone() {
            let _ = self.inbound_tx.send(reply);
        }
        Ok(())
    }

    async fn recv(&self) -> ssc_client::Result<Vec<u8>> {
        if self.recv_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Socket("connection refused".into()));
        }
        let mut inbound = self.inbound_rx.lock().await;
        inbound
            .recv()
            .await
            .ok_or_else(|| ClientError::Socket("link closed".into()))
    }

    fn device_addr(&self) -> SocketAddr {
        self.addr
    }
}

// ============================================================================
// Generation 2
// ============================================================================

/// One recorded REST call
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// A generation-2 device reachable through [`RestTransport`]
#[derive(Default)]
pub struct MockRest {
    requests: Mutex<Vec<Request>>,
    unreachable: AtomicBool,
    unauthorized: AtomicBool,
    heartbeat_fails: AtomicBool,
    identity_status: Mutex<Option<u16>>,
    close_streams: AtomicBool,
    streams: Mutex<Vec<stream_channel::UnboundedSender<ssc_client::Result<Bytes>>>>,
}

impl MockRest {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.unauthorized.store(unauthorized, Ordering::SeqCst);
    }

    pub fn set_heartbeat_fails(&self, fails: bool) {
        self.heartbeat_fails.store(fails, Ordering::SeqCst);
    }

    /// Answer the identity probe with this HTTP status until cleared
    pub fn set_identity_status(&self, status: Option<u16>) {
        *self.identity_status.lock() = status;
    }

    /// Close every new event stream right after it opens
    pub fn set_close_streams(&self, close: bool) {
        self.close_streams.store(close, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn streams_opened(&self) -> usize {
        self.streams.lock().len()
    }

    /// Write one `data:` event on the most recent stream
    pub fn push_event(&self, data: &str) {
        self.push_raw(format!("data: {}\n\n", data).as_bytes());
    }

    pub fn push_raw(&self, bytes: &[u8]) {
        let streams = self.streams.lock();
        let stream = streams.last().expect("no stream open");
        stream
            .unbounded_send(Ok(Bytes::copy_from_slice(bytes)))
            .unwrap();
    }

    /// Fail the most recent stream with a transport error
    pub fn break_stream(&self) {
        let streams = self.streams.lock();
        if let Some(stream) = streams.last() {
            let _ = stream.unbounded_send(Err(ClientError::Network("connection reset".into())));
        }
    }

    /// Close the most recent stream from the device side
    pub fn end_stream(&self) {
        if let Some(stream) = self.streams.lock().last() {
            stream.close_channel();
        }
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Value>) {
        self.requests.lock().push(Request {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
    }

    fn check_reachable(&self, path: &str) -> ssc_client::Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection refused".into()));
        }
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(ClientError::Unauthorized(path.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RestTransport for MockRest {
    async fn get(&self, path: &str) -> ssc_client::Result<Value> {
        self.record("GET", path, None);
        self.check_reachable(path)?;
        if path.starts_with("/api/ssc/state/subscriptions/") && self.heartbeat_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 404,
                path: path.to_string(),
            });
        }
        if path == "/api/device/identity" {
            if let Some(status) = *self.identity_status.lock() {
                return Err(ClientError::Status {
                    status,
                    path: path.to_string(),
                });
            }
            return Ok(serde_json::json!({"product": "EW-DX EM 2", "serial": "1234567"}));
        }
        Ok(Value::Array(Vec::new()))
    }

    async fn put(&self, path: &str, body: &Value) -> ssc_client::Result<Value> {
        self.record("PUT", path, Some(body));
        self.check_reachable(path)?;
        Ok(Value::Null)
    }

    async fn delete(&self, path: &str) -> ssc_client::Result<()> {
        self.record("DELETE", path, None);
        self.check_reachable(path)
    }

    async fn open_event_stream(&self, path: &str) -> ssc_client::Result<EventStream> {
        self.record("STREAM", path, None);
        self.check_reachable(path)?;
        let (tx, rx) = stream_channel::unbounded();
        if self.close_streams.load(Ordering::SeqCst) {
            tx.close_channel();
        }
        self.streams.lock().push(tx);
        Ok(Box::pin(rx))
    }
}
