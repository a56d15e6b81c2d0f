//! Periodic expired-session sweeping.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use agora_core::AppResult;

use crate::store::SessionStore;

/// Deletes expired and revoked sessions on a schedule.
///
/// Safe to run concurrently with every other session operation: a session
/// refreshed in the same instant it becomes sweep-eligible may be swept,
/// which the refresh path surfaces as `SessionNotFound`, the same as a
/// normal logout.
#[derive(Clone)]
pub struct SessionSweeper {
    sessions: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSweeper").finish()
    }
}

impl SessionSweeper {
    /// Creates a sweeper over the given session store.
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Runs a single sweep cycle. Returns the number of sessions removed.
    pub async fn run_once(&self) -> AppResult<u64> {
        let removed = self.sessions.sweep_expired().await?;
        if removed > 0 {
            info!(removed, "Session sweep completed");
        }
        Ok(removed)
    }

    /// Spawns the recurring sweep loop.
    ///
    /// Runs until the shutdown channel flips to `true`. Sweep failures are
    /// logged and the loop keeps going; a transient database outage must
    /// not kill maintenance permanently.
    pub fn spawn(
        self,
        interval_minutes: u64,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_secs(interval_minutes.max(1) * 60);
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it so startup isn't
            // serialized behind a sweep.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(error = %e, "Session sweep failed");
                        }
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("Session sweeper shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }
}
