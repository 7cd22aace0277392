//! Session driver
//!
//! Owns one WebSocket connection's lifecycle for one simulated user:
//! connect, periodic message emission, event reporting, timed forceful
//! close. Transport events drive an explicit state machine inside a
//! single `tokio::select!` loop; the send interval and the close
//! deadline are owned by that loop, so leaving the `Open` state stops
//! the periodic send deterministically.

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::check::CheckSet;
use crate::error::{Result, SessionError};
use crate::events::EventSink;
use crate::message::Outbound;

/// Name of the post-connection check recorded for every session
pub const CONNECTED_CHECK: &str = "Connected successfully";

/// How long a closing session waits for the peer to finish the close
/// handshake before abandoning the connection
const CLOSE_DRAIN: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Explicit per-session identity, threaded through instead of any
/// ambient per-task global
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// 1-based simulated-user id
    pub vu: u32,
    /// Free-form metadata tags for this session
    pub tags: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn new(vu: u32) -> Self {
        Self {
            vu,
            tags: BTreeMap::new(),
        }
    }
}

/// Timing drawn for one session before it starts
#[derive(Debug, Clone, Copy)]
pub struct SessionPlan {
    /// Randomized session lifetime
    pub duration: Duration,
    /// Randomized period between sends, fixed for the whole session
    pub send_interval: Duration,
    /// Fixed grace added to the lifetime before the forceful close
    pub close_grace: Duration,
}

impl SessionPlan {
    /// When the forceful close fires, measured from connection open
    pub fn deadline(&self) -> Duration {
        self.duration + self.close_grace
    }
}

/// Lifecycle states of one session
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// What one session did, reported back to the runner
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub vu: u32,
    /// Whether the handshake completed with status 101
    pub connected: bool,
    /// HTTP status of the handshake response, when the server answered
    pub status: Option<u16>,
    pub sent: u64,
    pub received: u64,
    pub state: SessionState,
}

impl SessionOutcome {
    fn not_connected(vu: u32, status: Option<u16>) -> Self {
        Self {
            vu,
            connected: false,
            status,
            sent: 0,
            received: 0,
            state: SessionState::Closed,
        }
    }
}

/// Perform the handshake, returning the open stream and the upgrade status
async fn establish(url: &str) -> Result<(WsStream, u16)> {
    let (ws, response) = connect_async(url).await.map_err(SessionError::from)?;
    Ok((ws, response.status().as_u16()))
}

/// Drive one session to completion.
///
/// Failures never propagate past this function: a failed handshake or a
/// dropped connection simply ends the session, leaving its trace in the
/// outcome and the check set. No retries, no backoff, no reconnection.
pub async fn run_session(
    url: &str,
    ctx: SessionContext,
    plan: SessionPlan,
    sink: &dyn EventSink,
    checks: &CheckSet,
) -> SessionOutcome {
    let vu = ctx.vu;
    let mut state = SessionState::Connecting;
    info!(vu, url, state = ?state, "connecting");

    let (mut ws, status) = match establish(url).await {
        Ok(pair) => pair,
        Err(err) => {
            let status = err.handshake_status();
            checks.record(CONNECTED_CHECK, false);
            warn!(vu, %err, "connect failed");
            return SessionOutcome::not_connected(vu, status);
        }
    };

    checks.record(CONNECTED_CHECK, status == 101);
    debug!(vu, status, tags = ?ctx.tags, "handshake response");

    state = SessionState::Open;
    let _ = sink.connected(vu).await;

    // First send happens one full period after open, as with a plain
    // repeating timer.
    let mut ticker = interval_at(Instant::now() + plan.send_interval, plan.send_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let deadline = tokio::time::sleep(plan.deadline());
    tokio::pin!(deadline);

    let mut sent = 0u64;
    let mut received = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick(), if state == SessionState::Open => {
                let text = Outbound::say().to_text();
                match ws.send(Message::Text(text)).await {
                    Ok(()) => sent += 1,
                    Err(err) => {
                        // Fire-and-forget: a send on a dead connection just
                        // ends the session.
                        debug!(vu, %err, "send failed");
                        state = SessionState::Closed;
                    }
                }
            }
            _ = &mut deadline => match state {
                SessionState::Open => {
                    info!(vu, "session deadline reached, closing the socket");
                    state = SessionState::Closing;
                    if ws.close(None).await.is_err() {
                        state = SessionState::Closed;
                    } else {
                        deadline.as_mut().reset(Instant::now() + CLOSE_DRAIN);
                    }
                }
                _ => {
                    // Peer never answered the close handshake.
                    debug!(vu, "close drain expired");
                    state = SessionState::Closed;
                }
            },
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(payload))) => {
                    received += 1;
                    let _ = sink.message_received(vu, &payload).await;
                }
                Some(Ok(Message::Binary(payload))) => {
                    received += 1;
                    let _ = sink
                        .message_received(vu, &String::from_utf8_lossy(&payload))
                        .await;
                }
                Some(Ok(Message::Ping(_))) => {
                    let _ = sink.ping(vu).await;
                }
                Some(Ok(Message::Pong(_))) => {
                    let _ = sink.pong(vu).await;
                }
                Some(Ok(Message::Close(_))) => {
                    state = SessionState::Closed;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(vu, %err, "read failed");
                    state = SessionState::Closed;
                }
                None => {
                    state = SessionState::Closed;
                }
            }
        }

        if state == SessionState::Closed {
            break;
        }
    }

    let _ = sink.closed(vu).await;

    SessionOutcome {
        vu,
        connected: status == 101,
        status: Some(status),
        sent,
        received,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_deadline() {
        let plan = SessionPlan {
            duration: Duration::from_millis(10_000),
            send_interval: Duration::from_millis(5),
            close_grace: Duration::from_millis(3_000),
        };
        assert_eq!(plan.deadline(), Duration::from_millis(13_000));
    }

    #[test]
    fn test_context_default_tags() {
        let ctx = SessionContext::new(42);
        assert_eq!(ctx.vu, 42);
        assert!(ctx.tags.is_empty());
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionState::Closing).unwrap(),
            "\"closing\""
        );
    }
}
