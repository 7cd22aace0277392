//! Event Sink Trait
//!
//! This module provides the EventSink trait for decoupling per-session
//! observability from the driver. Implementations can print to stdout
//! (CLI), record in memory (tests), or stay silent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Event sink for per-session transport events
///
/// Every hook carries the simulated-user id so output can be attributed
/// without any ambient per-task state.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// The handshake succeeded and the session is open
    async fn connected(&self, vu: u32) -> Result<(), String>;

    /// A text frame arrived; `payload` is the raw content, unparsed
    async fn message_received(&self, vu: u32, payload: &str) -> Result<(), String>;

    /// A ping frame arrived
    async fn ping(&self, vu: u32) -> Result<(), String>;

    /// A pong frame arrived
    async fn pong(&self, vu: u32) -> Result<(), String>;

    /// The connection terminated (peer-closed, self-closed, or forced)
    async fn closed(&self, vu: u32) -> Result<(), String>;
}

/// No-op event sink for tests or silent runs
#[derive(Default, Clone)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn connected(&self, _vu: u32) -> Result<(), String> {
        Ok(())
    }

    async fn message_received(&self, _vu: u32, _payload: &str) -> Result<(), String> {
        Ok(())
    }

    async fn ping(&self, _vu: u32) -> Result<(), String> {
        Ok(())
    }

    async fn pong(&self, _vu: u32) -> Result<(), String> {
        Ok(())
    }

    async fn closed(&self, _vu: u32) -> Result<(), String> {
        Ok(())
    }
}

/// Stdout event sink for CLI mode - prints events to console
#[derive(Default, Clone)]
pub struct StdoutEventSink {
    /// Whether to print in JSON format
    pub json_output: bool,
}

impl StdoutEventSink {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    fn emit(&self, event: &str, vu: u32, text: String) {
        if self.json_output {
            println!(
                r#"{{"ts":"{}","event":"{}","vu":{}}}"#,
                chrono::Utc::now().to_rfc3339(),
                event,
                vu
            );
        } else {
            println!("{text}");
        }
    }
}

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn connected(&self, vu: u32) -> Result<(), String> {
        self.emit("connected", vu, format!("VU {vu}: connected"));
        Ok(())
    }

    async fn message_received(&self, vu: u32, payload: &str) -> Result<(), String> {
        if self.json_output {
            let entry = serde_json::json!({
                "ts": chrono::Utc::now().to_rfc3339(),
                "event": "message",
                "vu": vu,
                "payload": payload,
            });
            println!("{entry}");
        } else {
            println!("VU {vu} received: {payload}");
        }
        Ok(())
    }

    async fn ping(&self, vu: u32) -> Result<(), String> {
        self.emit("ping", vu, "PING!".to_string());
        Ok(())
    }

    async fn pong(&self, vu: u32) -> Result<(), String> {
        self.emit("pong", vu, "PONG!".to_string());
        Ok(())
    }

    async fn closed(&self, vu: u32) -> Result<(), String> {
        self.emit("closed", vu, format!("VU {vu}: disconnected"));
        Ok(())
    }
}

/// One observed session event, in arrival order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum SessionEvent {
    Connected { vu: u32 },
    Message { vu: u32, payload: String },
    Ping { vu: u32 },
    Pong { vu: u32 },
    Closed { vu: u32 },
}

/// Recording sink that keeps every event in order, for assertions in tests
#[derive(Default, Clone)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn connected(&self, vu: u32) -> Result<(), String> {
        self.push(SessionEvent::Connected { vu });
        Ok(())
    }

    async fn message_received(&self, vu: u32, payload: &str) -> Result<(), String> {
        self.push(SessionEvent::Message {
            vu,
            payload: payload.to_string(),
        });
        Ok(())
    }

    async fn ping(&self, vu: u32) -> Result<(), String> {
        self.push(SessionEvent::Ping { vu });
        Ok(())
    }

    async fn pong(&self, vu: u32) -> Result<(), String> {
        self.push(SessionEvent::Pong { vu });
        Ok(())
    }

    async fn closed(&self, vu: u32) -> Result<(), String> {
        self.push(SessionEvent::Closed { vu });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpEventSink;
        assert!(sink.connected(1).await.is_ok());
        assert!(sink.closed(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_sink_preserves_order() {
        let sink = MemoryEventSink::new();
        sink.connected(3).await.unwrap();
        sink.message_received(3, "hello").await.unwrap();
        sink.ping(3).await.unwrap();
        sink.closed(3).await.unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], SessionEvent::Connected { vu: 3 });
        assert_eq!(
            events[1],
            SessionEvent::Message {
                vu: 3,
                payload: "hello".to_string()
            }
        );
        assert_eq!(events.last(), Some(&SessionEvent::Closed { vu: 3 }));
    }

    #[tokio::test]
    async fn test_memory_sink_shared_across_clones() {
        let sink = MemoryEventSink::new();
        let other = sink.clone();
        other.pong(7).await.unwrap();
        assert_eq!(sink.events(), vec![SessionEvent::Pong { vu: 7 }]);
    }

    #[test]
    fn test_session_event_serde() {
        let event = SessionEvent::Message {
            vu: 1,
            payload: "hi".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"message\""));
        assert!(json.contains("\"vu\":1"));
    }
}
