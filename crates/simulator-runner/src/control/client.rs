//! Client for the control server.

use super::{ErrorBody, HealthBody, SubmitResponse};
use crate::error::ControlError;
use crate::registry::{ActiveRuns, JobQueue};
use crate::run::{RunId, RunRequest, WorkerStatus};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Handle to a remote worker pool.
///
/// Obtained with [`connect`](ControlClient::connect), which checks the server
/// is healthy, and released with [`disconnect`](ControlClient::disconnect).
/// Every request uses its own TCP connection.
#[derive(Debug, Clone)]
pub struct ControlClient {
    host: String,
    // A forceful revoke holds the request open for up to the server's grace.
    revoke_timeout: Duration,
}

/// Extract `host:port` from `http://host:port[/]`.
fn parse_base_url(url: &str) -> Result<String, ControlError> {
    let trimmed = url.trim();
    if trimmed.starts_with("https://") {
        return Err(ControlError::Protocol(format!(
            "TLS is not supported by the control API: {trimmed}"
        )));
    }
    let host = trimmed.strip_prefix("http://").unwrap_or(trimmed);
    let host = host.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(ControlError::Protocol(format!("invalid control URL: {url}")));
    }
    Ok(host.to_string())
}

/// Split a raw HTTP response into status code and body.
fn parse_response(raw: &str) -> Result<(u16, &str), ControlError> {
    let status_line = raw.lines().next().unwrap_or("(no status line)");
    let code = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| ControlError::Protocol(format!("bad status line: {status_line}")))?;
    let body = raw.split_once("\r\n\r\n").map_or("", |(_, body)| body);
    Ok((code, body))
}

fn revoke_timeout(health: &HealthBody) -> Duration {
    REQUEST_TIMEOUT.saturating_add(Duration::from_millis(health.grace_ms))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}

impl ControlClient {
    /// Connect to the control server at `url` (e.g., "http://127.0.0.1:9090").
    pub async fn connect(url: &str) -> Result<Self, ControlError> {
        let mut client = Self {
            host: parse_base_url(url)?,
            revoke_timeout: REQUEST_TIMEOUT,
        };
        let health: HealthBody = client.get("/health").await?;
        if health.status != "healthy" {
            return Err(ControlError::Protocol(format!(
                "control server reports status '{}'",
                health.status
            )));
        }
        client.revoke_timeout = revoke_timeout(&health);
        debug!("Connected to control server at {}", client.host);
        Ok(client)
    }

    /// Release the handle.
    pub fn disconnect(self) {
        debug!("Disconnected from control server at {}", self.host);
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Time allowed for a revoke request to complete.
    pub fn revoke_timeout(&self) -> Duration {
        self.revoke_timeout
    }

    /// Liveness of the remote pool's workers.
    pub async fn workers(&self) -> Result<Vec<WorkerStatus>, ControlError> {
        self.get("/workers").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ControlError> {
        let (code, body) = self.send("GET", path, None, REQUEST_TIMEOUT).await?;
        if code != 200 {
            return Err(ControlError::Protocol(format!(
                "GET {path} returned {code}: {}",
                error_message(&body)
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        timeout: Duration,
    ) -> Result<(u16, String), ControlError> {
        tokio::time::timeout(timeout, self.exchange(method, path, body))
            .await
            .map_err(|_| ControlError::Protocol(format!("{method} {path} timed out")))?
    }

    async fn exchange(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<(u16, String), ControlError> {
        let mut stream =
            TcpStream::connect(&self.host)
                .await
                .map_err(|source| ControlError::Unreachable {
                    address: self.host.clone(),
                    source,
                })?;

        let body = body.unwrap_or_default();
        let request = format!(
            "{} {} HTTP/1.1\r\n\
             Host: {}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            method,
            path,
            self.host,
            body.len(),
            body
        );
        stream.write_all(request.as_bytes()).await?;
        stream.flush().await?;

        let mut raw = String::new();
        stream.read_to_string(&mut raw).await?;
        let (code, body) = parse_response(&raw)?;
        Ok((code, body.to_string()))
    }
}

#[async_trait::async_trait]
impl JobQueue for ControlClient {
    async fn submit(&self, request: RunRequest) -> Result<RunId, ControlError> {
        let payload = serde_json::to_string(&request)?;
        let (code, body) = self
            .send("POST", "/runs", Some(payload), REQUEST_TIMEOUT)
            .await?;
        match code {
            200 | 201 => Ok(serde_json::from_str::<SubmitResponse>(&body)?.id),
            400 | 422 => Err(ControlError::Rejected(error_message(&body))),
            503 => Err(ControlError::ShutDown),
            _ => Err(ControlError::Protocol(format!(
                "POST /runs returned {code}: {}",
                error_message(&body)
            ))),
        }
    }

    async fn active(&self) -> Result<ActiveRuns, ControlError> {
        self.get("/active").await
    }

    async fn revoke(&self, id: &str, forceful: bool) -> Result<(), ControlError> {
        let path = format!("/runs/{id}/revoke?forceful={forceful}");
        let timeout = if forceful {
            self.revoke_timeout
        } else {
            REQUEST_TIMEOUT
        };
        let (code, body) = self.send("POST", &path, None, timeout).await?;
        if code != 200 {
            return Err(ControlError::Protocol(format!(
                "POST {path} returned {code}: {}",
                error_message(&body)
            )));
        }
        Ok(())
    }
}
