//! HTTP control server in front of a [`WorkerPool`].
//!
//! Routes:
//!
//! - `GET /health`
//! - `GET /active`
//! - `GET /workers`
//! - `POST /runs` (body: [`RunRequest`])
//! - `POST /runs/{id}/revoke?forceful=true|false`

use super::{parse_query_flag, ErrorBody, HealthBody, StatusBody, SubmitResponse};
use crate::error::ControlError;
use crate::pool::WorkerPool;
use crate::run::RunRequest;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

const IO_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_BODY: usize = 1024 * 1024;

/// Control server bound to a local address.
pub struct ControlServer {
    listener: TcpListener,
    pool: Arc<WorkerPool>,
}

struct Response {
    status: &'static str,
    body: String,
}

impl Response {
    fn json<T: Serialize>(status: &'static str, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error("500 Internal Server Error", &e.to_string()),
        }
    }

    fn error(status: &'static str, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody {
            error: message.to_string(),
        })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
        Self { status, body }
    }
}

impl ControlServer {
    /// Bind the listener. Use port 0 to pick a free port.
    pub async fn bind(addr: &str, pool: Arc<WorkerPool>) -> Result<Self, ControlError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, pool })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ControlError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` fires.
    pub async fn serve(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ControlError> {
        info!("Control server listening on {}", self.local_addr()?);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Control server received shutdown signal");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            debug!("Connection from {addr}");
                            let pool = self.pool.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, pool).await {
                                    error!("Error handling connection from {addr}: {e}");
                                }
                            });
                        }
                        Err(e) => error!("Error accepting connection: {e}"),
                    }
                }
            }
        }
        Ok(())
    }
}

async fn handle_connection(stream: TcpStream, pool: Arc<WorkerPool>) -> Result<(), ControlError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let response = match tokio::time::timeout(IO_TIMEOUT, read_request(&mut reader)).await {
        Ok(Ok((method, target, body))) => route(&pool, &method, &target, &body).await,
        Ok(Err(e)) => Response::error("400 Bad Request", &e.to_string()),
        Err(_) => Response::error("408 Request Timeout", "request timed out"),
    };

    let raw = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    );
    writer.write_all(raw.as_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await?;
    Ok(())
}

async fn read_request<R>(reader: &mut R) -> Result<(String, String, Vec<u8>), ControlError>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Err(ControlError::Protocol("empty request".to_string()));
    }
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(ControlError::Protocol(format!(
            "malformed request line: {}",
            request_line.trim_end()
        )));
    };
    let (method, target) = (method.to_string(), target.to_string());

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .map_err(|_| ControlError::Protocol(format!("bad Content-Length: {value}")))?;
            }
        }
    }
    if content_length > MAX_BODY {
        return Err(ControlError::Protocol(format!(
            "body too large: {content_length} bytes"
        )));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;
    Ok((method, target, body))
}

async fn route(pool: &WorkerPool, method: &str, target: &str, body: &[u8]) -> Response {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        ("GET", ["health"]) => Response::json("200 OK", &HealthBody::healthy(pool.grace())),
        ("GET", ["active"]) => Response::json("200 OK", &pool.active_runs()),
        ("GET", ["workers"]) => Response::json("200 OK", &pool.workers()),
        ("POST", ["runs"]) => match serde_json::from_slice::<RunRequest>(body) {
            Ok(request) => match pool.submit_run(request) {
                Ok(id) => Response::json("201 Created", &SubmitResponse { id }),
                Err(ControlError::ShutDown) => {
                    Response::error("503 Service Unavailable", "worker pool is shut down")
                }
                Err(e) => Response::error("422 Unprocessable Entity", &e.to_string()),
            },
            Err(e) => Response::error("400 Bad Request", &format!("invalid json: {e}")),
        },
        ("POST", ["runs", id, "revoke"]) => {
            let forceful = parse_query_flag(query, "forceful").unwrap_or(false);
            pool.revoke_run(id, forceful).await;
            Response::json("200 OK", &StatusBody::ok())
        }
        _ => Response::error("404 Not Found", "not found"),
    }
}
