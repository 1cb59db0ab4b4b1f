use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use domain::AdminView;

use crate::service::admins::Admins;
use crate::session::{Session, SessionManager};
use crate::Result;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    pub password: SecretString,
}

/// What the admin UI asks for on page load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_authenticated: bool,
    pub admin: Option<AdminView>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            admin: None,
        }
    }
}

impl From<Option<Session>> for SessionState {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(s) => Self {
                is_authenticated: true,
                admin: Some(s.admin),
            },
            None => Self::anonymous(),
        }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    admins: Admins,
    sessions: Arc<SessionManager>,
}

impl Authenticator {
    pub fn new(admins: Admins, sessions: Arc<SessionManager>) -> Self {
        Self { admins, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Default admin first, then the admins collection. `None` on unknown
    /// email or wrong password; the two are not distinguished.
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(&self, creds: &Credentials) -> Result<Option<AdminView>> {
        let email = creds.email.trim();
        if email.is_empty() || creds.password.expose_secret().is_empty() {
            return Ok(None);
        }
        let Some(admin) = self.admins.find_by_email(email).await? else {
            warn!("login attempt for unknown email");
            return Ok(None);
        };
        if admin.verify_password(creds.password.expose_secret()) {
            Ok(Some(AdminView::from(&admin)))
        } else {
            warn!("wrong password for admin {}", admin.id);
            Ok(None)
        }
    }

    pub async fn login(&self, creds: &Credentials) -> Result<Option<Session>> {
        Ok(self
            .authenticate(creds)
            .await?
            .map(|admin| self.sessions.open(admin)))
    }

    pub fn logout(&self, token: &str) -> bool {
        let closed = self.sessions.close(token);
        if closed {
            info!("session closed");
        }
        closed
    }

    pub fn state(&self, token: Option<&str>) -> SessionState {
        SessionState::from(token.and_then(|t| self.sessions.resolve(t)))
    }
}
