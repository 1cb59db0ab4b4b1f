use std::sync::Arc;
use tracing::info;

use domain::card::{decode_token, CardSummary, CardView};
use domain::pledge::PledgeDraft;
use domain::{CardForm, InvitationCard};

use crate::store::{DocumentStore, Repo};
use crate::Result;

#[derive(Clone)]
pub struct Cards {
    repo: Repo<InvitationCard>,
}

impl Cards {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repo::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<CardSummary>> {
        Ok(self
            .repo
            .all()
            .await?
            .into_iter()
            .map(CardSummary::from)
            .collect())
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.repo.all().await?.len())
    }

    #[tracing::instrument(skip_all)]
    pub async fn create(&self, form: CardForm) -> Result<CardSummary> {
        let mut card = InvitationCard {
            id: String::new(),
            name: String::new(),
            phone: String::new(),
        };
        form.apply(&mut card)?;
        let card = self.repo.insert(card).await?;
        info!("created invitation card {}", card.id);
        Ok(CardSummary::from(card))
    }

    #[tracing::instrument(skip_all)]
    pub async fn update(&self, id: &str, form: CardForm) -> Result<CardSummary> {
        form.validate()?;
        let mut card = self.repo.require(id).await?;
        form.apply(&mut card)?;
        self.repo.save(&card).await?;
        Ok(CardSummary::from(card))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repo.require(id).await?;
        self.repo.remove(id).await?;
        info!("deleted invitation card {}", id);
        Ok(())
    }

    /// Resolve a share token to its card.
    pub async fn by_token(&self, token: &str) -> Result<InvitationCard> {
        let id = decode_token(token)?;
        self.repo.require(&id).await
    }

    pub async fn view(&self, token: &str) -> Result<CardView> {
        Ok(CardView::from(&self.by_token(token).await?))
    }

    /// Name and phone from the card, ready to pre-fill a pledge form.
    pub async fn draft(&self, token: &str) -> Result<PledgeDraft> {
        Ok(self.by_token(token).await?.draft())
    }
}
