use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use domain::admin::DEFAULT_ADMIN_ID;
use domain::setting::DefaultAdminSettings;
use domain::{Admin, AdminView, NewAdmin, FieldErrors};

use crate::store::{DocumentStore, Repo};
use crate::{Error, Result};

pub const EMAIL_TAKEN: &str = "An admin with this email already exists";

/// Admin accounts: the configured default admin plus the `admins`
/// collection.
#[derive(Clone)]
pub struct Admins {
    repo: Repo<Admin>,
    default_admin: Option<Admin>,
    registrations: Arc<Mutex<()>>,
}

impl Admins {
    pub fn new(store: Arc<dyn DocumentStore>, default_admin: Option<Admin>) -> Self {
        Self {
            repo: Repo::new(store),
            default_admin,
            registrations: Arc::new(Mutex::new(())),
        }
    }

    /// Default admin first, then stored admins in store order.
    pub async fn all(&self) -> Result<Vec<Admin>> {
        let mut out: Vec<Admin> = self.default_admin.iter().cloned().collect();
        out.extend(self.repo.all().await?);
        Ok(out)
    }

    pub async fn list(&self) -> Result<Vec<AdminView>> {
        Ok(self.all().await?.iter().map(AdminView::from).collect())
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.all().await?.len())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        Ok(self.all().await?.into_iter().find(|a| a.has_email(email)))
    }

    #[tracing::instrument(skip_all)]
    pub async fn register(&self, form: NewAdmin) -> Result<AdminView> {
        form.validate()?;
        let admin = form.into_admin()?;

        // Uniqueness check and insert must not interleave with another registration.
        let _guard = self.registrations.lock().await;
        if self.find_by_email(&admin.email).await?.is_some() {
            return Err(Error::Conflict(EMAIL_TAKEN.to_owned()));
        }
        let admin = self.repo.insert(admin).await?;
        info!("registered admin {}", admin.id);
        Ok(AdminView::from(&admin))
    }

    /// `acting` may not remove themself, and nobody removes the default admin.
    #[tracing::instrument(skip_all)]
    pub async fn delete(&self, acting: &AdminView, id: &str) -> Result<()> {
        if id == acting.id {
            return Err(Error::forbidden("You cannot delete your own account"));
        }
        if id == DEFAULT_ADMIN_ID {
            return Err(Error::forbidden("The default admin cannot be deleted"));
        }
        self.repo.require(id).await?;
        self.repo.remove(id).await?;
        info!("admin {} deleted admin {}", acting.id, id);
        Ok(())
    }
}

/// Build the default admin from settings. The hash must be a PHC string
/// (see `pledgebook hash-password`).
pub fn default_admin_from(settings: &DefaultAdminSettings) -> Result<Admin> {
    let mut errors = FieldErrors::new();
    if settings.email.trim().is_empty() {
        errors.add("email", "default admin needs an email");
    }
    if !domain::security::password::is_phc_hash(&settings.password_hash) {
        errors.add("passwordHash", "default admin password_hash is not an argon2 hash");
    }
    errors
        .finish(())
        .map_err(|e| Error::Config(e.to_string()))?;

    Ok(Admin {
        id: DEFAULT_ADMIN_ID.to_owned(),
        name: settings.name.clone(),
        email: settings.email.trim().to_owned(),
        password_hash: settings.password_hash.clone(),
    })
}
