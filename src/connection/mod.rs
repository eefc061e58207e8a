//! Connection handle to the dashboard service.
//!
//! The handle owns one transport session. Writes go out pin by pin in
//! payload order and are followed by a single `sync()` that flushes them.

pub mod blynk;
pub mod recording;

pub use blynk::BlynkHttpTransport;
pub use recording::{RecordingTransport, TransportCall};

use crate::config::DashboardConfig;
use crate::error::TransportError;
use crate::pins::{PinPayload, PinValue};
use tracing::{debug, info};

/// The remote pin protocol: connect once, write pins, flush.
#[async_trait::async_trait]
pub trait PinTransport: Send + Sync {
    /// Establish the session (authentication / handshake).
    async fn connect(&self) -> Result<(), TransportError>;

    /// Queue or send a single pin write.
    async fn write_pin(&self, pin: u16, value: &PinValue) -> Result<(), TransportError>;

    /// Flush pending writes and service any inbound traffic.
    async fn sync(&self) -> Result<(), TransportError>;
}

/// An open, handshaken session to the dashboard.
pub struct Connection {
    transport: Box<dyn PinTransport>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

impl Connection {
    /// Open a Blynk HTTP session authenticated with `auth_token`.
    pub async fn open(auth_token: &str, config: &DashboardConfig) -> Result<Self, TransportError> {
        let transport = BlynkHttpTransport::new(auth_token, config)?;
        info!(server = %config.server_url, "opening dashboard connection");
        Self::with_transport(transport).await
    }

    /// Drive the handshake on an arbitrary transport.
    pub async fn with_transport<T>(transport: T) -> Result<Self, TransportError>
    where
        T: PinTransport + 'static,
    {
        transport.connect().await?;
        transport.sync().await?;
        debug!("dashboard handshake complete");
        Ok(Self {
            transport: Box::new(transport),
        })
    }

    /// Write every pin of `payload` in order, then flush once.
    pub async fn push(&self, payload: &PinPayload) -> Result<(), TransportError> {
        for (pin, value) in payload.iter() {
            debug!(pin, %value, "pin write");
            self.transport.write_pin(*pin, value).await?;
        }
        self.transport.sync().await?;
        debug!(pins = payload.len(), "payload flushed");
        Ok(())
    }
}
