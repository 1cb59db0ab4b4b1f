//! Server-side admin sessions.
//!
//! A session is addressed by an opaque bearer token and expires on whichever
//! comes first: `idle` time since it was last used, or `absolute` time since
//! it was opened.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use domain::security::secrets::generate_session_token;
use domain::setting::SessionSettings;
use domain::AdminView;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub idle: TimeDelta,
    pub absolute: TimeDelta,
}

fn minutes(n: u64) -> TimeDelta {
    i64::try_from(n)
        .ok()
        .and_then(TimeDelta::try_minutes)
        .unwrap_or(TimeDelta::MAX)
}

fn hours(n: u64) -> TimeDelta {
    i64::try_from(n)
        .ok()
        .and_then(TimeDelta::try_hours)
        .unwrap_or(TimeDelta::MAX)
}

impl From<&SessionSettings> for SessionPolicy {
    fn from(s: &SessionSettings) -> Self {
        Self {
            idle: minutes(s.idle_minutes),
            absolute: hours(s.absolute_hours),
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip)]
    pub token: String,
    pub admin: AdminView,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn expires_at(&self, policy: &SessionPolicy) -> DateTime<Utc> {
        let idle_end = self
            .last_seen
            .checked_add_signed(policy.idle)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let hard_end = self
            .created_at
            .checked_add_signed(policy.absolute)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        idle_end.min(hard_end)
    }

    pub fn is_expired(&self, policy: &SessionPolicy, now: DateTime<Utc>) -> bool {
        now >= self.expires_at(policy)
    }
}

pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
    policy: SessionPolicy,
    clock: Clock,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.sessions.read().len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl SessionManager {
    pub fn new(policy: SessionPolicy) -> Self {
        Self::with_clock(policy, Arc::new(Utc::now))
    }

    pub fn with_clock(policy: SessionPolicy, clock: Clock) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn open(&self, admin: AdminView) -> Session {
        let now = (self.clock)();
        let session = Session {
            token: generate_session_token(),
            admin,
            created_at: now,
            last_seen: now,
        };
        self.sessions
            .write()
            .insert(session.token.clone(), session.clone());
        info!("session opened for admin {}", session.admin.id);
        session
    }

    /// Look up a live session and mark it used. Expired sessions are
    /// evicted and read as absent.
    pub fn resolve(&self, token: &str) -> Option<Session> {
        let now = (self.clock)();
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(token)?;
        if session.is_expired(&self.policy, now) {
            debug!("session for admin {} expired", session.admin.id);
            sessions.remove(token);
            return None;
        }
        session.last_seen = now;
        Some(session.clone())
    }

    /// Whether a session was actually closed.
    pub fn close(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// Drop every session belonging to `admin_id` (used when the admin is
    /// deleted).
    pub fn close_all_for(&self, admin_id: &str) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.admin.id != admin_id);
        before - sessions.len()
    }

    /// Evict expired sessions; returns how many went.
    pub fn sweep(&self) -> usize {
        let now = (self.clock)();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(&self.policy, now));
        let swept = before - sessions.len();
        if swept > 0 {
            debug!("swept {} expired session(s)", swept);
        }
        swept
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
