//! The pledge aggregate.
//!
//! An [`Invitee`] owns its pledge amount and the ordered list of payment
//! installments. The paid amount is always derived from the installments;
//! it is never stored, so the two cannot drift apart.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::pledge::{PaymentStatus, Progress};

/// Drift below this is treated as rounding noise, not a missing payment.
const DRIFT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationType {
    /// The guest submitted the pledge themselves.
    #[default]
    #[serde(rename = "SELF")]
    SelfRegistered,
    /// An admin registered the guest on their behalf.
    #[serde(rename = "REGISTERED")]
    Registered,
}

#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error("payment amount must be greater than zero (got {0})")]
    NonPositive(f64),

    #[error("amount must be a finite number")]
    NotFinite,

    #[error("paid amount cannot be negative (got {0})")]
    NegativeTotal(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredInvitee")]
pub struct Invitee {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pledge_amount: Option<f64>,
    #[serde(rename = "paymentInstallments")]
    installments: Vec<f64>,
    pub registration_type: RegistrationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
}

impl Invitee {
    /// A guest-submitted pledge: nothing paid yet.
    pub fn self_registered(name: impl Into<String>, phone: impl Into<String>, pledge: f64) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            phone: phone.into(),
            pledge_amount: Some(pledge),
            installments: Vec::new(),
            registration_type: RegistrationType::SelfRegistered,
            admin_id: None,
        }
    }

    /// A guest registered by an admin, optionally with payments already taken.
    pub fn registered_by(
        admin_id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        pledge: Option<f64>,
        installments: Vec<f64>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            phone: phone.into(),
            pledge_amount: pledge,
            installments,
            registration_type: RegistrationType::Registered,
            admin_id: Some(admin_id.into()),
        }
    }

    pub fn installments(&self) -> &[f64] {
        &self.installments
    }

    /// Pledge amount with "not pledged" read as zero.
    pub fn pledged(&self) -> f64 {
        self.pledge_amount.unwrap_or(0.0)
    }

    pub fn paid_amount(&self) -> f64 {
        total(&self.installments)
    }

    pub fn balance(&self) -> f64 {
        self.pledged() - self.paid_amount()
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.paid_amount(), self.pledged())
    }

    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::of(self.paid_amount(), self.pledged())
    }

    /// Append one installment. Returns the new paid amount.
    pub fn record_payment(&mut self, amount: f64) -> Result<f64, PaymentError> {
        if !amount.is_finite() {
            return Err(PaymentError::NotFinite);
        }
        if amount <= 0.0 {
            return Err(PaymentError::NonPositive(amount));
        }
        self.installments.push(amount);
        Ok(self.paid_amount())
    }

    /// Bring the paid amount to `target` by appending the difference as a
    /// correction installment (which may be negative).
    ///
    /// Returns the correction that was appended, or `None` when the paid
    /// amount already equals `target`.
    pub fn correct_paid_amount(&mut self, target: f64) -> Result<Option<f64>, PaymentError> {
        if !target.is_finite() {
            return Err(PaymentError::NotFinite);
        }
        if target < 0.0 {
            return Err(PaymentError::NegativeTotal(target));
        }
        let delta = target - self.paid_amount();
        if delta.abs() <= DRIFT_EPSILON {
            return Ok(None);
        }
        self.installments.push(delta);
        Ok(Some(delta))
    }
}

/// Sum starting from `+0.0`; `Iterator::sum` gives `-0.0` for an empty slice.
fn total(amounts: &[f64]) -> f64 {
    amounts.iter().fold(0.0, |acc, x| acc + x)
}

/// On-disk shape, tolerant of records written before the paid amount became
/// derived: those may carry a `paidAmount` that disagrees with the
/// installments.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredInvitee {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    phone: String,
    pledge_amount: Option<f64>,
    payment_installments: Option<Vec<f64>>,
    paid_amount: Option<f64>,
    registration_type: Option<RegistrationType>,
    admin_id: Option<String>,
}

impl From<StoredInvitee> for Invitee {
    fn from(s: StoredInvitee) -> Self {
        let mut installments = s.payment_installments.unwrap_or_default();

        if let Some(stored_paid) = s.paid_amount.filter(|p| p.is_finite()) {
            let drift = stored_paid - total(&installments);
            if drift.abs() > DRIFT_EPSILON {
                warn!(
                    "invitee {} stored paidAmount {} disagrees with installments by {}; keeping it as a correction",
                    s.id, stored_paid, drift
                );
                installments.push(drift);
            }
        }

        Self {
            id: s.id,
            name: s.name,
            phone: s.phone,
            pledge_amount: s.pledge_amount,
            installments,
            registration_type: s.registration_type.unwrap_or_default(),
            admin_id: s.admin_id,
        }
    }
}
