//! Run orchestration
//!
//! Executes the configured number of session iterations with a bounded
//! number of concurrently running simulated users. Every session is
//! fully isolated: its own connection, its own timers, its own random
//! draws. A session failing never aborts the run.
//!
//! VU ids are 1-based and assigned per iteration: they identify
//! sessions, not scheduler slots, so they keep counting past `vus`
//! when `iterations > vus`.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use crate::check::CheckSet;
use crate::config::RunConfig;
use crate::error::Result;
use crate::events::EventSink;
use crate::session::{run_session, SessionContext, SessionPlan};

/// Aggregated result of one load run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    /// Sessions that finished (connected or not)
    pub sessions: u64,
    /// Sessions whose handshake completed with status 101
    pub connected: u64,
    /// Sessions that never got a valid connection, plus panicked tasks
    pub failed: u64,
    pub sent: u64,
    pub received: u64,
    pub elapsed_ms: u64,
}

/// Drives a whole run: `iterations` sessions, at most `vus` in flight
pub struct Runner {
    config: RunConfig,
    sink: Arc<dyn EventSink>,
    checks: CheckSet,
}

impl Runner {
    pub fn new(config: RunConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sink,
            checks: CheckSet::new(),
        })
    }

    /// The shared check registry sessions record into
    pub fn checks(&self) -> CheckSet {
        self.checks.clone()
    }

    pub async fn run(&self) -> RunSummary {
        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        info!(
            run_id = %run_id,
            url = %self.config.url,
            vus = self.config.vus,
            iterations = self.config.iterations,
            "starting run"
        );

        let limiter = Arc::new(Semaphore::new(self.config.vus as usize));
        let mut tasks = JoinSet::new();

        for vu in 1..=self.config.iterations {
            let permit = match limiter.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let plan = SessionPlan {
                duration: Duration::from_millis(self.config.draw_session_duration()),
                send_interval: Duration::from_millis(self.config.draw_send_interval()),
                close_grace: Duration::from_millis(self.config.close_grace_ms),
            };
            let ctx = SessionContext {
                vu,
                tags: self.config.tags.clone(),
            };
            let url = self.config.url.clone();
            let sink = self.sink.clone();
            let checks = self.checks.clone();

            tasks.spawn(async move {
                let _permit = permit;
                run_session(&url, ctx, plan, sink.as_ref(), &checks).await
            });
        }

        let mut summary = RunSummary {
            run_id,
            sessions: 0,
            connected: 0,
            failed: 0,
            sent: 0,
            received: 0,
            elapsed_ms: 0,
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    summary.sessions += 1;
                    if outcome.connected {
                        summary.connected += 1;
                    } else {
                        summary.failed += 1;
                    }
                    summary.sent += outcome.sent;
                    summary.received += outcome.received;
                }
                Err(err) => {
                    error!(%err, "session task failed");
                    summary.sessions += 1;
                    summary.failed += 1;
                }
            }
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            run_id = %summary.run_id,
            sessions = summary.sessions,
            connected = summary.connected,
            failed = summary.failed,
            "run finished"
        );
        summary
    }
}
