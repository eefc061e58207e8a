//! Blynk HTTP API transport.
//!
//! Writes are buffered and sent as one `batch/update` request on `sync()`.

use super::PinTransport;
use crate::config::DashboardConfig;
use crate::error::TransportError;
use crate::pins::PinValue;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct BlynkHttpTransport {
    client: Client,
    base_url: String,
    token: String,
    connected: AtomicBool,
    pending: Mutex<Vec<(u16, String)>>,
}

impl BlynkHttpTransport {
    pub fn new(token: &str, config: &DashboardConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            connected: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/external/api/{}", self.base_url, path)
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<String, TransportError> {
        let resp = self
            .client
            .get(self.endpoint(path))
            .query(&[("token", self.token.as_str())])
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl PinTransport for BlynkHttpTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let online = self.get("isHardwareConnected", &[]).await?;
        self.connected.store(true, Ordering::Release);
        info!(device_online = %online.trim(), "authenticated with dashboard");
        Ok(())
    }

    async fn write_pin(&self, pin: u16, value: &PinValue) -> Result<(), TransportError> {
        self.ensure_connected()?;
        self.pending.lock().await.push((pin, value.to_string()));
        Ok(())
    }

    async fn sync(&self) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let batch = std::mem::take(&mut *self.pending.lock().await);
        if batch.is_empty() {
            return Ok(());
        }

        let query: Vec<(String, String)> = batch
            .into_iter()
            .map(|(pin, value)| (format!("V{}", pin), value))
            .collect();
        debug!(pins = query.len(), "sending batch update");
        self.get("batch/update", &query).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DashboardConfig {
        DashboardConfig {
            server_url: "http://127.0.0.1:9/".to_string(),
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let t = BlynkHttpTransport::new("tok", &config()).unwrap();
        assert_eq!(
            t.endpoint("batch/update"),
            "http://127.0.0.1:9/external/api/batch/update"
        );
    }

    #[tokio::test]
    async fn test_write_before_connect_is_rejected() {
        let t = BlynkHttpTransport::new("tok", &config()).unwrap();
        let err = t.write_pin(0, &PinValue::from("x")).await.unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));
        assert!(matches!(t.sync().await, Err(TransportError::NotConnected)));
    }
}
