pub mod admins;
pub mod cards;
pub mod invitees;

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use domain::listing::Totals;
use domain::setting::Settings;

use crate::auth::Authenticator;
use crate::session::{SessionManager, SessionPolicy};
use crate::store::DocumentStore;
use crate::Result;

pub use admins::Admins;
pub use cards::Cards;
pub use invitees::{PledgeBook, PledgeListing, Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_admins: usize,
    pub total_invitees: usize,
    pub total_cards: usize,
    /// Invitees with a pledge above zero.
    pub active_pledges: usize,
    pub total_pledged: f64,
    pub total_paid: f64,
}

/// Everything the HTTP layer needs, wired over one document store.
#[derive(Clone)]
pub struct Services {
    pub admins: Admins,
    pub auth: Authenticator,
    pub cards: Cards,
    pub pledges: Arc<PledgeBook>,
    pub sessions: Arc<SessionManager>,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, settings: &Settings) -> Result<Self> {
        let default_admin = settings
            .default_admin
            .as_ref()
            .map(admins::default_admin_from)
            .transpose()?;
        if default_admin.is_none() {
            info!("no default admin configured; only stored admins can log in");
        }
        Ok(Self::assemble(
            store,
            default_admin,
            SessionManager::new(SessionPolicy::from(&settings.session)),
        ))
    }

    pub fn assemble(
        store: Arc<dyn DocumentStore>,
        default_admin: Option<domain::Admin>,
        sessions: SessionManager,
    ) -> Self {
        let sessions = Arc::new(sessions);
        let admins = Admins::new(Arc::clone(&store), default_admin);
        Self {
            auth: Authenticator::new(admins.clone(), Arc::clone(&sessions)),
            admins,
            cards: Cards::new(Arc::clone(&store)),
            pledges: Arc::new(PledgeBook::new(store)),
            sessions,
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let invitees = self.pledges.load_sorted().await?;
        let totals = Totals::of(&invitees);
        Ok(DashboardStats {
            total_admins: self.admins.count().await?,
            total_invitees: invitees.len(),
            total_cards: self.cards.count().await?,
            active_pledges: invitees.iter().filter(|i| i.pledged() > 0.0).count(),
            total_pledged: totals.total_pledged,
            total_paid: totals.total_paid,
        })
    }
}
