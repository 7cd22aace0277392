//! Run configuration
//!
//! Declarative knobs for a load run: target endpoint, concurrency,
//! per-session timing ranges, and free-form metadata tags. Defaults
//! reproduce the canonical echo scenario (700 users, one session each,
//! 10-60s sessions with 3s close grace).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SessionError};

/// Half-open interval `[min, max)` for per-session random draws
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawRange {
    pub min: u64,
    pub max: u64,
}

impl DrawRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Draw a value uniformly from `[min, max)`
    pub fn draw(&self) -> u64 {
        rand::thread_rng().gen_range(self.min..self.max)
    }

    pub fn is_empty(&self) -> bool {
        self.min >= self.max
    }
}

/// Configuration for one load run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target WebSocket endpoint (`ws://` or `wss://`)
    pub url: String,
    /// Number of concurrently running simulated users
    pub vus: u32,
    /// Total number of session executions across the run
    pub iterations: u32,
    /// Bounds for the per-session lifetime draw, in milliseconds
    pub session_duration_ms: DrawRange,
    /// Bounds for the per-session send-interval draw, in milliseconds.
    /// Drawn once per session, not re-drawn per tick.
    pub send_interval_ms: DrawRange,
    /// Fixed grace added to the session duration before the forceful close
    pub close_grace_ms: u64,
    /// Free-form metadata tags attached to every session
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9010/echo".to_string(),
            vus: 700,
            iterations: 700,
            session_duration_ms: DrawRange::new(10_000, 60_000),
            send_interval_ms: DrawRange::new(2, 20),
            close_grace_ms: 3_000,
            tags: BTreeMap::new(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(SessionError::InvalidConfig(format!(
                "url must use ws:// or wss:// scheme, got '{}'",
                self.url
            )));
        }
        if self.vus == 0 {
            return Err(SessionError::InvalidConfig(
                "vus must be at least 1".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(SessionError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.session_duration_ms.is_empty() {
            return Err(SessionError::InvalidConfig(
                "session duration range is empty".to_string(),
            ));
        }
        if self.send_interval_ms.is_empty() {
            return Err(SessionError::InvalidConfig(
                "send interval range is empty".to_string(),
            ));
        }
        if self.send_interval_ms.min == 0 {
            return Err(SessionError::InvalidConfig(
                "send interval must be at least 1ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Draw this session's lifetime in milliseconds
    pub fn draw_session_duration(&self) -> u64 {
        self.session_duration_ms.draw()
    }

    /// Draw this session's send interval in milliseconds
    pub fn draw_send_interval(&self) -> u64 {
        self.send_interval_ms.draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_canonical_scenario() {
        let config = RunConfig::default();
        assert_eq!(config.vus, 700);
        assert_eq!(config.iterations, 700);
        assert_eq!(config.session_duration_ms, DrawRange::new(10_000, 60_000));
        assert_eq!(config.send_interval_ms, DrawRange::new(2, 20));
        assert_eq!(config.close_grace_ms, 3_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_draw_stays_in_range() {
        let range = DrawRange::new(10, 20);
        for _ in 0..200 {
            let v = range.draw();
            assert!((10..20).contains(&v));
        }
    }

    #[test]
    fn test_single_value_range() {
        let range = DrawRange::new(5, 6);
        assert_eq!(range.draw(), 5);
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let config = RunConfig {
            url: "http://localhost:9010/echo".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_vus() {
        let config = RunConfig {
            vus: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_send_interval() {
        let config = RunConfig {
            send_interval_ms: DrawRange::new(0, 20),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_range() {
        let config = RunConfig {
            send_interval_ms: DrawRange::new(20, 20),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut config = RunConfig::default();
        config
            .tags
            .insert("my_tag".to_string(), "my ws session".to_string());

        let json = serde_json::to_string(&config).unwrap();
        let parsed: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.url, config.url);
        assert_eq!(parsed.session_duration_ms, config.session_duration_ms);
        assert_eq!(parsed.tags.get("my_tag").map(String::as_str), Some("my ws session"));
    }
}
