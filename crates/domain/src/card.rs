use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pledge::PledgeDraft;
use crate::validate::{contact, FieldErrors};

pub const PHONE_NUMBER_REQUIRED: &str = "Phone number is required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationCard {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

impl InvitationCard {
    pub fn token(&self) -> String {
        encode_token(&self.id)
    }

    pub fn draft(&self) -> PledgeDraft {
        PledgeDraft {
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

impl CardForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        contact::require_name(&mut errors, &self.name);
        if self.phone.trim().is_empty() {
            errors.add("phone", PHONE_NUMBER_REQUIRED);
        }
        errors.finish(())
    }

    /// Overwrite name and phone of `card` (new or existing).
    pub fn apply(&self, card: &mut InvitationCard) -> Result<(), FieldErrors> {
        self.validate()?;
        card.name = self.name.trim().to_owned();
        card.phone = self.phone.trim().to_owned();
        Ok(())
    }
}

/// What an anonymous visitor sees for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
}

impl From<&InvitationCard> for CardView {
    fn from(card: &InvitationCard) -> Self {
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
        }
    }
}

/// Admin listing row: the card plus the token to share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSummary {
    #[serde(flatten)]
    pub card: InvitationCard,
    pub token: String,
}

impl From<InvitationCard> for CardSummary {
    fn from(card: InvitationCard) -> Self {
        let token = card.token();
        Self { card, token }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Share tokens: plain base64 of the card id. Obfuscation, not access control.
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardTokenError {
    #[error("bad base64: {0}")]
    Base64(String),

    #[error("card token is not valid UTF-8")]
    Utf8,

    #[error("card token is empty")]
    Empty,
}

pub fn encode_token(id: &str) -> String {
    general_purpose::STANDARD.encode(id.as_bytes())
}

pub fn decode_token(token: &str) -> Result<String, CardTokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CardTokenError::Empty);
    }
    let bytes = general_purpose::STANDARD
        .decode(token)
        // links get re-encoded by chat apps; accept the common variants
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(token))
        .or_else(|_| general_purpose::URL_SAFE.decode(token))
        .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(token))
        .map_err(|e| CardTokenError::Base64(e.to_string()))?;
    let id = String::from_utf8(bytes).map_err(|_| CardTokenError::Utf8)?;
    if id.is_empty() {
        return Err(CardTokenError::Empty);
    }
    Ok(id)
}
