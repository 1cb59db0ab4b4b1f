use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::security::password::{self, PasswordError};
use crate::validate::FieldErrors;

/// Id reserved for the admin configured in the settings file.
pub const DEFAULT_ADMIN_ID: &str = "default";

pub const FIELD_REQUIRED: &str = "All fields are required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    /// argon2 PHC string; never the password itself.
    pub password_hash: String,
}

impl Admin {
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_ADMIN_ID
    }

    /// `false` on a wrong password *and* on an unreadable stored hash; the
    /// latter is logged since it means the record is corrupt.
    pub fn verify_password(&self, candidate: &str) -> bool {
        match password::verify_password(candidate, &self.password_hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("admin {} has an unreadable password hash: {}", self.id, e);
                false
            }
        }
    }
}

/// An admin as shown to other admins and stored in sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&Admin> for AdminView {
    fn from(a: &Admin) -> Self {
        Self {
            id: a.id.clone(),
            name: a.name.clone(),
            email: a.email.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewAdmin {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub password: SecretString,
}

impl NewAdmin {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", FIELD_REQUIRED);
        }
        if self.email.trim().is_empty() {
            errors.add("email", FIELD_REQUIRED);
        } else if !self.email.contains('@') {
            errors.add("email", "Please enter a valid email address");
        }
        let pw = self.password.expose_secret();
        if pw.is_empty() {
            errors.add("password", FIELD_REQUIRED);
        } else if let Err(PasswordError::Weak) = password::validate_policy(pw) {
            errors.add("password", password::POLICY_MESSAGE);
        }
        errors.finish(())
    }

    /// Validate and hash. The plaintext never leaves this call.
    pub fn into_admin(self) -> Result<Admin, NewAdminError> {
        self.validate().map_err(NewAdminError::Invalid)?;
        let password_hash = password::hash_password(self.password.expose_secret())?;
        Ok(Admin {
            id: String::new(),
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            password_hash,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewAdminError {
    #[error("invalid admin: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Password(#[from] PasswordError),
}
