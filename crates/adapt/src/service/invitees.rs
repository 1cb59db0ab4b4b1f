//! The pledge book: every read and write of invitee records goes through
//! here.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use domain::listing::{search, sort_by_pledge_desc, Totals};
use domain::pledge::InviteeForm;
use domain::report::{export_csv, InviteeReport};
use domain::{AdminView, Invitee, PledgeForm, PledgeUpdate, PledgeView};

use crate::store::{DocumentStore, Repo};
use crate::{Error, Result};

/// Search results plus totals over *all* invitees, not only the hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeListing {
    pub pledges: Vec<PledgeView>,
    pub total_pledged: f64,
    pub total_paid: f64,
}

/// Who is looking; decides phone masking and paid-amount edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Public,
    Admin,
}

pub struct PledgeBook {
    repo: Repo<Invitee>,
    // serializes read-modify-write of installments within this process
    payments: Mutex<()>,
}

impl PledgeBook {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repo::new(store),
            payments: Mutex::new(()),
        }
    }

    /// Every invitee, largest pledge first.
    pub async fn load_sorted(&self) -> Result<Vec<Invitee>> {
        let mut all = self.repo.all().await?;
        sort_by_pledge_desc(&mut all);
        Ok(all)
    }

    pub async fn get(&self, id: &str) -> Result<PledgeView> {
        Ok(PledgeView::of(&self.repo.require(id).await?))
    }

    #[tracing::instrument(skip_all)]
    pub async fn listing(&self, query: &str, viewer: Viewer) -> Result<PledgeListing> {
        let all = self.repo.all().await?;
        let totals = Totals::of(&all);
        let view = match viewer {
            Viewer::Public => PledgeView::masked,
            Viewer::Admin => PledgeView::of,
        };
        Ok(PledgeListing {
            pledges: search(&all, query).iter().map(view).collect(),
            total_pledged: totals.total_pledged,
            total_paid: totals.total_paid,
        })
    }

    #[tracing::instrument(skip_all)]
    pub async fn create(&self, form: PledgeForm) -> Result<PledgeView> {
        let invitee = self.repo.insert(form.into_invitee()?).await?;
        info!("pledge {} created for {}", invitee.id, invitee.pledged());
        Ok(PledgeView::of(&invitee))
    }

    /// Admin registers a guest, possibly with payments already collected.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, acting: &AdminView, form: InviteeForm) -> Result<PledgeView> {
        let invitee = self.repo.insert(form.into_invitee(&acting.id)?).await?;
        info!("admin {} registered invitee {}", acting.id, invitee.id);
        Ok(PledgeView::of(&invitee))
    }

    #[tracing::instrument(skip_all)]
    pub async fn update(&self, id: &str, update: PledgeUpdate, viewer: Viewer) -> Result<PledgeView> {
        if update.paid_amount.is_some() && viewer != Viewer::Admin {
            return Err(Error::forbidden("Only admins can change the paid amount"));
        }
        update.validate()?;

        let _guard = self.payments.lock().await;
        let mut invitee = self.repo.require(id).await?;
        if let Some(correction) = update.apply(&mut invitee)? {
            info!("paid amount of {} corrected by {}", id, correction);
        }
        self.repo.save(&invitee).await?;
        Ok(PledgeView::of(&invitee))
    }

    /// Append one installment. A rejected amount leaves the store untouched.
    #[tracing::instrument(skip_all)]
    pub async fn record_payment(&self, id: &str, amount: f64) -> Result<PledgeView> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Invalid(domain::FieldErrors::single(
                "amount",
                "Enter a valid payment amount",
            )));
        }

        let _guard = self.payments.lock().await;
        let mut invitee = self.repo.require(id).await?;
        let paid = invitee.record_payment(amount)?;
        self.repo.save(&invitee).await?;
        info!("recorded {} against {}; paid now {}", amount, id, paid);
        Ok(PledgeView::of(&invitee))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repo.require(id).await?;
        self.repo.remove(id).await?;
        info!("deleted invitee {}", id);
        Ok(())
    }

    pub async fn report(&self) -> Result<InviteeReport> {
        Ok(InviteeReport::of(&self.load_sorted().await?))
    }

    pub async fn export_csv(&self, currency: &str) -> Result<String> {
        Ok(export_csv(&self.load_sorted().await?, currency))
    }
}
