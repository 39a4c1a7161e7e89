//! # TCP JSON-Lines Transport
//!
//! One JSON request per line in, one JSON response per line out:
//!
//! ```text
//! {"op":"create"}
//! {"op":"execute","game_id":"1","command":"w.move(3,2)"}
//! {"op":"end","game_id":"1"}
//! {"op":"status","game_id":"1"}
//! ```
//!
//! The registry sits behind an async mutex shared by all connections and is swept
//! after every request.

use crate::rendering::escape_log;
use crate::{DungeonError, DungeonResult, SessionId, SessionRegistry};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Operation requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestOp {
    Create,
    Execute,
    End,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub op: RequestOp,
    #[serde(default)]
    pub game_id: Option<SessionId>,
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub game_id: Option<SessionId>,
    pub response_content: String,
    /// Whether the game still accepts commands
    pub is_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn failure(game_id: Option<SessionId>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            game_id,
            response_content: error.clone(),
            is_on: false,
            error: Some(error),
        }
    }
}

fn required_id(request: &Request) -> DungeonResult<SessionId> {
    request.game_id.clone().ok_or_else(|| {
        DungeonError::InvalidRequest(format!("\"game_id\" is required for {:?}", request.op))
    })
}

fn dispatch(registry: &mut SessionRegistry, request: &Request) -> DungeonResult<Response> {
    match request.op {
        RequestOp::Create => {
            let (id, intro) = registry.create()?;
            Ok(Response {
                game_id: Some(id),
                response_content: intro,
                is_on: true,
                error: None,
            })
        }
        RequestOp::Execute => {
            let id = required_id(request)?;
            let command = request.command.as_deref().ok_or_else(|| {
                DungeonError::InvalidRequest("\"command\" is required for Execute".to_string())
            })?;
            let response = registry.execute(&id, command)?;
            Ok(Response {
                game_id: Some(id),
                error: response.rejected.map(|violation| violation.to_string()),
                response_content: response.text,
                is_on: response.running,
            })
        }
        RequestOp::End => {
            let id = required_id(request)?;
            let message = registry.force_end(&id)?;
            Ok(Response {
                game_id: Some(id),
                response_content: message,
                is_on: false,
                error: None,
            })
        }
        RequestOp::Status => {
            let id = required_id(request)?;
            let status = registry.status(&id)?;
            Ok(Response {
                game_id: Some(id),
                response_content: format!(
                    "Score: {}. Actions: {}.",
                    status.final_score.unwrap_or(status.score),
                    status.actions
                ),
                is_on: status.running,
                error: None,
            })
        }
    }
}

/// Handles one decoded request, then sweeps the registry.
pub fn handle_request(registry: &mut SessionRegistry, request: Request) -> Response {
    let response = match dispatch(registry, &request) {
        Ok(response) => response,
        Err(e) => {
            debug!("request {:?} failed: {}", request.op, e);
            let is_on = request
                .game_id
                .as_ref()
                .and_then(|id| registry.status(id).ok())
                .map(|status| status.running)
                .unwrap_or(false);
            Response {
                is_on,
                ..Response::failure(request.game_id.clone(), e.to_string())
            }
        }
    };

    let evicted = registry.sweep(Instant::now());
    if evicted > 0 {
        debug!("evicted {} sessions", evicted);
    }

    response
}

/// Decodes and handles one request line.
pub fn handle_line(registry: &mut SessionRegistry, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(registry, request),
        Err(e) => {
            debug!("malformed request '{}': {}", escape_log(line), e);
            Response::failure(None, format!("Malformed request: {}", e))
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    registry: Arc<Mutex<SessionRegistry>>,
) -> DungeonResult<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = {
            let mut registry = registry.lock().await;
            handle_line(&mut registry, &line)
        };

        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
    }

    Ok(())
}

/// Accepts connections forever, one task per client.
pub async fn serve(listener: TcpListener, registry: Arc<Mutex<SessionRegistry>>) -> DungeonResult<()> {
    info!("listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("client {} connected", peer);

        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, registry).await {
                warn!("client {} disconnected with error: {}", peer, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryAuditLog, RegistryConfig, SequentialIdGenerator};

    fn registry() -> SessionRegistry {
        SessionRegistry::new(
            RegistryConfig::default(),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(MemoryAuditLog::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_request_flow() {
        let mut registry = registry();

        let created = handle_line(&mut registry, r#"{"op":"create"}"#);
        assert_eq!(created.game_id, Some(SessionId::new("1")));
        assert!(created.is_on);

        let moved = handle_line(
            &mut registry,
            r#"{"op":"execute","game_id":"1","command":"w.move(3,2)"}"#,
        );
        assert_eq!(moved.response_content, "Warrior moved to cell (3, 2).");
        assert_eq!(moved.error, None);

        let rejected = handle_line(
            &mut registry,
            r#"{"op":"execute","game_id":"1","command":"w.move(0,0)"}"#,
        );
        assert!(rejected.is_on);
        assert!(rejected.error.is_some());
        assert!(rejected
            .response_content
            .starts_with("Operation cannot be performed."));

        let status = handle_line(&mut registry, r#"{"op":"status","game_id":"1"}"#);
        assert_eq!(status.response_content, "Score: 0. Actions: 1.");

        let ended = handle_line(&mut registry, r#"{"op":"end","game_id":"1"}"#);
        assert_eq!(ended.response_content, "Game over. Your score: -5.");
        assert!(!ended.is_on);

        let gone = handle_line(&mut registry, r#"{"op":"status","game_id":"1"}"#);
        assert_eq!(gone.error.as_deref(), Some("Game with ID 1 was not found"));
    }

    #[test]
    fn test_malformed_requests() {
        let mut registry = registry();
        let response = handle_line(&mut registry, "not json");
        assert!(response.error.unwrap().starts_with("Malformed request"));

        let response = handle_line(&mut registry, r#"{"op":"execute","command":"help"}"#);
        assert!(response.error.is_some());
        assert!(!response.is_on);
    }

    #[test]
    fn test_execute_requires_command() -> DungeonResult<()> {
        let mut registry = registry();
        let (id, _) = registry.create()?;

        let response = handle_line(
            &mut registry,
            &format!(r#"{{"op":"execute","game_id":"{}"}}"#, id),
        );
        assert_eq!(
            response.error.as_deref(),
            Some("Invalid request: \"command\" is required for Execute")
        );
        assert!(response.is_on);

        let status = registry.status(&id)?;
        assert!(status.running);
        assert_eq!(status.actions, 0);
        Ok(())
    }

    #[test]
    fn test_response_omits_empty_error() {
        let response = Response {
            game_id: Some(SessionId::new("7")),
            response_content: "ok".to_string(),
            is_on: true,
            error: None,
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"game_id":"7","response_content":"ok","is_on":true}"#
        );
    }

    #[tokio::test]
    async fn test_serve_over_socket() -> DungeonResult<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(serve(listener, Arc::new(Mutex::new(registry()))));

        let stream = TcpStream::connect(addr).await?;
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer.write_all(b"{\"op\":\"create\"}\n").await?;
        let line = lines.next_line().await?.unwrap_or_default();
        let response: Response = serde_json::from_str(&line)?;
        assert_eq!(response.game_id, Some(SessionId::new("1")));

        writer
            .write_all(b"{\"op\":\"execute\",\"game_id\":\"1\",\"command\":\"end_game\"}\n")
            .await?;
        let line = lines.next_line().await?.unwrap_or_default();
        let response: Response = serde_json::from_str(&line)?;
        assert!(response.response_content.starts_with("Are you sure"));
        assert!(response.is_on);
        Ok(())
    }
}
