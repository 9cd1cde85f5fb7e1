//! Adapter - main entry point of the SDK
//!
//! An [`Adapter`] manages exactly one device. It owns the host-facing status
//! channel for its whole life and swaps everything else (model, session,
//! controller) as a unit whenever it is reconfigured.
//!
//! Replacing a device is atomic with respect to the transport: the old
//! session is shut down, its timers cancelled and its lease released before
//! the next session is constructed.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use ewdx_state::{DeviceStore, Protocol, StateReader, VariableValue};
use ewdx_stream::{
    subscription_resources, ConnectionStatus, DatagramProfile, DatagramSession, LeaseRequest,
    StatusPublisher, StreamSession,
};
use serde_json::Value;
use ssc_client::{ClientError, DatagramLink, RestClient, RestConfig, RestTransport, UdpLink};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::config::{AdapterConfig, ConfigError};
use crate::control::{DeviceControl, Scp1Charger, Scp1Receiver, Scp2Receiver};
use crate::error::{Result, SdkError};

/// Wire link to a device, matching its protocol generation
#[derive(Clone)]
pub enum DeviceLink {
    Datagram(Arc<dyn DatagramLink>),
    Rest(Arc<dyn RestTransport>),
}

impl DeviceLink {
    fn protocol(&self) -> Protocol {
        match self {
            DeviceLink::Datagram(_) => Protocol::Scp1,
            DeviceLink::Rest(_) => Protocol::Scp2,
        }
    }

    /// Open the link a configuration describes
    pub async fn open(config: &AdapterConfig) -> Result<Self> {
        match config.protocol {
            Protocol::Scp1 => {
                let device = resolve(&config.host, config.device_port).await?;
                let unspecified = match device.ip() {
                    IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
                };
                let local = SocketAddr::new(unspecified, config.local_port);
                let link = UdpLink::bind(local, device).await?;
                Ok(DeviceLink::Datagram(Arc::new(link)))
            }
            Protocol::Scp2 => {
                let password = config.password.clone().unwrap_or_default();
                let client = RestClient::new(RestConfig::for_host(&config.host, password)?)?;
                Ok(DeviceLink::Rest(Arc::new(client)))
            }
        }
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let mut addresses = tokio::net::lookup_host((host, port))
        .await
        .map_err(ClientError::from)?;
    addresses
        .next()
        .ok_or_else(|| ClientError::Socket(format!("{} did not resolve", host)).into())
}

enum Session {
    Datagram(DatagramSession),
    Stream(StreamSession),
}

impl Session {
    async fn shutdown(self) -> ewdx_stream::Result<()> {
        match self {
            Session::Datagram(session) => session.shutdown().await,
            Session::Stream(session) => session.shutdown().await,
        }
    }
}

struct ActiveDevice {
    config: AdapterConfig,
    store: Arc<DeviceStore>,
    controller: Arc<dyn DeviceControl>,
    session: Session,
}

/// One managed device
///
/// # Example
///
/// ```rust,no_run
/// use ewdx_sdk::{Adapter, AdapterConfig, DeviceModel};
///
/// #[tokio::main]
/// async fn main() -> Result<(), ewdx_sdk::SdkError> {
///     let adapter = Adapter::new();
///     adapter
///         .configure(AdapterConfig::scp2("192.168.1.20", DeviceModel::Em4, "secret"))
///         .await?;
///
///     let mut status = adapter.watch_status();
///     status.changed().await.ok();
///     println!("status: {}", *status.borrow());
///
///     adapter.controller().await?.set_mute(0, true).await?;
///     adapter.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct Adapter {
    status: StatusPublisher,
    active: Mutex<Option<ActiveDevice>>,
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter {
    /// An adapter with no device yet
    pub fn new() -> Self {
        Self {
            status: StatusPublisher::new(),
            active: Mutex::new(None),
        }
    }

    /// Validate, open the link and start managing the device
    ///
    /// Any previously managed device is released first, also when the new
    /// configuration turns out to be invalid.
    pub async fn configure(&self, config: AdapterConfig) -> Result<()> {
        let mut active = self.active.lock().await;
        Self::release(&mut active).await;
        self.check(&config)?;

        let link = match DeviceLink::open(&config).await {
            Ok(link) => link,
            Err(e) => {
                self.status
                    .set(ConnectionStatus::ConnectionFailure(format!("Connection failed: {}", e)));
                return Err(e);
            }
        };
        *active = Some(self.start(config, link)?);
        Ok(())
    }

    /// Like [`configure`](Adapter::configure) over an already opened link
    pub async fn attach(&self, config: AdapterConfig, link: DeviceLink) -> Result<()> {
        let mut active = self.active.lock().await;
        Self::release(&mut active).await;
        self.check(&config)?;
        *active = Some(self.start(config, link)?);
        Ok(())
    }

    /// Release the device; the adapter can be configured again later
    pub async fn shutdown(&self) {
        let mut active = self.active.lock().await;
        Self::release(&mut active).await;
    }

    fn check(&self, config: &AdapterConfig) -> Result<()> {
        config.validate().map_err(|e| {
            warn!(error = %e, "Configuration rejected");
            self.status.set(ConnectionStatus::BadConfig(e.to_string()));
            SdkError::Config(e)
        })
    }

    async fn release(active: &mut Option<ActiveDevice>) {
        let Some(device) = active.take() else {
            return;
        };
        info!(host = %device.config.host, "Releasing device");
        if let Err(e) = device.session.shutdown().await {
            warn!(host = %device.config.host, error = %e, "Session did not stop cleanly");
        }
    }

    fn start(&self, config: AdapterConfig, link: DeviceLink) -> Result<ActiveDevice> {
        if link.protocol() != config.protocol {
            let err = ConfigError::LinkMismatch(config.protocol);
            self.status.set(ConnectionStatus::BadConfig(err.to_string()));
            return Err(err.into());
        }

        info!(
            host = %config.host,
            model = %config.model,
            protocol = %config.protocol,
            "Starting device session"
        );
        let store = Arc::new(DeviceStore::new(config.model));

        let (session, controller): (Session, Arc<dyn DeviceControl>) = match link {
            DeviceLink::Datagram(link) => {
                let profile = DatagramProfile::for_model(config.model)?;
                let session = DatagramSession::start(
                    link,
                    Arc::clone(&store),
                    profile,
                    config.datagram.clone(),
                    self.status.clone(),
                );
                let sink = Arc::new(session.sender());
                let controller: Arc<dyn DeviceControl> = if config.model.is_charger() {
                    Arc::new(Scp1Charger::new(sink, store.reader()))
                } else {
                    Arc::new(Scp1Receiver::new(sink, store.reader()))
                };
                (Session::Datagram(session), controller)
            }
            DeviceLink::Rest(rest) => {
                let session = StreamSession::start(
                    Arc::clone(&rest),
                    Arc::clone(&store),
                    subscription_resources(config.model),
                    config.stream.clone(),
                    self.status.clone(),
                );
                let controller: Arc<dyn DeviceControl> =
                    Arc::new(Scp2Receiver::new(rest, store.reader()));
                (Session::Stream(session), controller)
            }
        };

        Ok(ActiveDevice {
            config,
            store,
            controller,
            session,
        })
    }

    // ========================================================================
    // Host-facing accessors
    // ========================================================================

    pub fn status(&self) -> ConnectionStatus {
        self.status.current()
    }

    /// Status receiver that stays valid across reconfiguration
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub async fn config(&self) -> Option<AdapterConfig> {
        self.active.lock().await.as_ref().map(|d| d.config.clone())
    }

    /// Read access to the current device model
    ///
    /// The reader belongs to the current device; after reconfiguration a new
    /// one must be fetched.
    pub async fn reader(&self) -> Option<StateReader> {
        self.active.lock().await.as_ref().map(|d| d.store.reader())
    }

    pub async fn controller(&self) -> Result<Arc<dyn DeviceControl>> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|d| Arc::clone(&d.controller))
            .ok_or(SdkError::NotConfigured)
    }

    /// Host variables of the current model; empty without a device
    pub async fn variables(&self) -> BTreeMap<String, VariableValue> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|d| d.store.reader().read(|state| state.variables()))
            .unwrap_or_default()
    }

    /// Lease operation on an SCPv2 session
    pub async fn lease(&self, request: LeaseRequest) -> Result<Value> {
        let active = self.active.lock().await;
        let device = active.as_ref().ok_or(SdkError::NotConfigured)?;
        match &device.session {
            Session::Stream(session) => Ok(session.lease(request).await?),
            Session::Datagram(_) => Err(SdkError::Unsupported {
                operation: "lease",
                model: device.config.model,
            }),
        }
    }
}
