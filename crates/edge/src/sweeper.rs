use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use adapt::session::SessionManager;

/// Evict expired sessions every `every` until the task is aborted.
pub fn spawn_sweeper(sessions: Arc<SessionManager>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let swept = sessions.sweep();
            if swept > 0 {
                debug!("sweeper evicted {} session(s), {} live", swept, sessions.len());
            }
        }
    })
}
