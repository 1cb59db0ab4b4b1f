use serde::{Deserialize, Serialize};
use std::fmt;

use crate::invitee::{Invitee, RegistrationType};
use crate::listing::mask_phone;
use crate::validate::{contact, FieldErrors};

pub const MIN_PLEDGE: f64 = 100.0;
pub const PLEDGE_INVALID: &str = "Enter a valid pledge amount";

// ─────────────────────────────────────────────────────────────────────────────
// Progress
// ─────────────────────────────────────────────────────────────────────────────

/// Display tier used to colour progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Complete,
    PartialWarning,
    Low,
}

impl Tier {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            Tier::Complete
        } else if percentage >= 50.0 {
            Tier::PartialWarning
        } else {
            Tier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub percentage: f64,
    pub tier: Tier,
}

impl Progress {
    pub fn of(paid: f64, pledged: f64) -> Self {
        let percentage = if pledged > 0.0 {
            paid / pledged * 100.0
        } else {
            0.0
        };
        Self {
            percentage,
            tier: Tier::for_percentage(percentage),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    FullyPaid,
    PartiallyPaid,
    NotPaid,
}

impl PaymentStatus {
    /// A zero pledge with nothing paid counts as fully paid.
    pub fn of(paid: f64, pledged: f64) -> Self {
        if paid >= pledged {
            PaymentStatus::FullyPaid
        } else if paid > 0.0 {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::NotPaid
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::FullyPaid => "Fully Paid",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::NotPaid => "Not Paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────────────────────────────────────

fn check_pledge_amount(errors: &mut FieldErrors, amount: f64) {
    if !amount.is_finite() || amount < MIN_PLEDGE {
        errors.add("pledgeAmount", PLEDGE_INVALID);
    }
}

/// Public pledge submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub pledge_amount: f64,
}

impl PledgeForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        contact::require_name(&mut errors, &self.name);
        contact::require_phone(&mut errors, &self.phone);
        check_pledge_amount(&mut errors, self.pledge_amount);
        errors.finish(())
    }

    pub fn into_invitee(self) -> Result<Invitee, FieldErrors> {
        self.validate()?;
        Ok(Invitee::self_registered(
            self.name.trim(),
            self.phone.trim(),
            self.pledge_amount,
        ))
    }
}

/// Edit of an existing pledge. `paid_amount` is an admin-only correction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub pledge_amount: f64,
    #[serde(default)]
    pub paid_amount: Option<f64>,
}

impl PledgeUpdate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        contact::require_name(&mut errors, &self.name);
        contact::require_phone(&mut errors, &self.phone);
        check_pledge_amount(&mut errors, self.pledge_amount);
        if let Some(paid) = self.paid_amount {
            if !paid.is_finite() || paid < 0.0 {
                errors.add("paidAmount", "Enter a valid paid amount");
            }
        }
        errors.finish(())
    }

    /// Overwrite name, phone and pledge amount; a differing paid amount is
    /// appended as a correction installment.
    pub fn apply(&self, invitee: &mut Invitee) -> Result<Option<f64>, FieldErrors> {
        self.validate()?;
        invitee.name = self.name.trim().to_owned();
        invitee.phone = self.phone.trim().to_owned();
        invitee.pledge_amount = Some(self.pledge_amount);
        match self.paid_amount {
            Some(target) => invitee
                .correct_paid_amount(target)
                .map_err(|e| FieldErrors::single("paidAmount", e.to_string())),
            None => Ok(None),
        }
    }
}

/// Admin-side registration of a guest. The pledge is optional here and any
/// payments already collected can be supplied up front.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub pledge_amount: Option<f64>,
    #[serde(default)]
    pub payment_installments: Vec<f64>,
}

impl InviteeForm {
    pub fn into_invitee(self, admin_id: &str) -> Result<Invitee, FieldErrors> {
        let mut errors = FieldErrors::new();
        contact::require_name(&mut errors, &self.name);
        contact::require_phone(&mut errors, &self.phone);
        if let Some(amount) = self.pledge_amount {
            if !amount.is_finite() || amount < 0.0 {
                errors.add("pledgeAmount", PLEDGE_INVALID);
            }
        }
        if self
            .payment_installments
            .iter()
            .any(|p| !p.is_finite() || *p <= 0.0)
        {
            errors.add("paymentInstallments", "Installments must be positive amounts");
        }
        errors.finish(())?;

        Ok(Invitee::registered_by(
            admin_id,
            self.name.trim(),
            self.phone.trim(),
            self.pledge_amount,
            self.payment_installments,
        ))
    }
}

/// Name and phone lifted from an invitation card to pre-fill a pledge form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeDraft {
    pub name: String,
    pub phone: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Read model
// ─────────────────────────────────────────────────────────────────────────────

/// What the API hands out: the stored record plus the derived figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeView {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub pledge_amount: Option<f64>,
    pub paid_amount: f64,
    pub payment_installments: Vec<f64>,
    pub balance: f64,
    pub progress: Progress,
    pub registration_type: RegistrationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
}

impl PledgeView {
    pub fn of(invitee: &Invitee) -> Self {
        Self {
            id: invitee.id.clone(),
            name: invitee.name.clone(),
            phone: invitee.phone.clone(),
            pledge_amount: invitee.pledge_amount,
            paid_amount: invitee.paid_amount(),
            payment_installments: invitee.installments().to_vec(),
            balance: invitee.balance(),
            progress: invitee.progress(),
            registration_type: invitee.registration_type,
            admin_id: invitee.admin_id.clone(),
        }
    }

    /// Same view with the phone masked for anonymous visitors.
    pub fn masked(invitee: &Invitee) -> Self {
        let mut view = Self::of(invitee);
        view.phone = mask_phone(&invitee.phone);
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(Tier::for_percentage(0.0), Tier::Low);
        assert_eq!(Tier::for_percentage(49.99), Tier::Low);
        assert_eq!(Tier::for_percentage(50.0), Tier::PartialWarning);
        assert_eq!(Tier::for_percentage(99.9), Tier::PartialWarning);
        assert_eq!(Tier::for_percentage(100.0), Tier::Complete);
        assert_eq!(Tier::for_percentage(140.0), Tier::Complete);
    }

    #[test]
    fn zero_pledge_has_zero_progress() {
        let p = Progress::of(500.0, 0.0);
        assert_eq!(p.percentage, 0.0);
        assert_eq!(p.tier, Tier::Low);
    }

    #[test]
    fn payment_status_labels() {
        assert_eq!(PaymentStatus::of(100.0, 100.0).label(), "Fully Paid");
        assert_eq!(PaymentStatus::of(10.0, 100.0).label(), "Partially Paid");
        assert_eq!(PaymentStatus::of(0.0, 100.0).label(), "Not Paid");
        assert_eq!(PaymentStatus::of(0.0, 0.0), PaymentStatus::FullyPaid);
    }

    #[test]
    fn pledge_form_collects_every_field_error() {
        let form = PledgeForm {
            name: "  ".into(),
            phone: "12ab".into(),
            pledge_amount: 99.0,
        };
        let errs = form.validate().unwrap_err();
        assert_eq!(errs.get("name"), Some(contact::NAME_REQUIRED));
        assert_eq!(errs.get("phone"), Some(contact::PHONE_INVALID));
        assert_eq!(errs.get("pledgeAmount"), Some(PLEDGE_INVALID));
    }

    #[test]
    fn pledge_form_builds_unpaid_self_registration() {
        let inv = PledgeForm {
            name: " Asha Mussa ".into(),
            phone: "+255 712 345 678".into(),
            pledge_amount: 100.0,
        }
        .into_invitee()
        .unwrap();

        assert_eq!(inv.name, "Asha Mussa");
        assert_eq!(inv.pledge_amount, Some(100.0));
        assert_eq!(inv.paid_amount(), 0.0);
        assert!(inv.installments().is_empty());
        assert_eq!(inv.registration_type, RegistrationType::SelfRegistered);
    }

    #[test]
    fn update_overwrites_fields_and_corrects_paid() {
        let mut inv = Invitee::self_registered("Asha", "0712345678", 1_000.0);
        inv.record_payment(200.0).unwrap();

        let update = PledgeUpdate {
            name: "Asha M".into(),
            phone: "0712345679".into(),
            pledge_amount: 2_000.0,
            paid_amount: Some(500.0),
        };
        assert_eq!(update.apply(&mut inv), Ok(Some(300.0)));
        assert_eq!(inv.name, "Asha M");
        assert_eq!(inv.pledge_amount, Some(2_000.0));
        assert_eq!(inv.paid_amount(), 500.0);
    }

    #[test]
    fn update_rejects_negative_paid_amount() {
        let mut inv = Invitee::self_registered("Asha", "0712345678", 1_000.0);
        let update = PledgeUpdate {
            name: "Asha".into(),
            phone: "0712345678".into(),
            pledge_amount: 1_000.0,
            paid_amount: Some(-1.0),
        };
        let errs = update.apply(&mut inv).unwrap_err();
        assert!(errs.get("paidAmount").is_some());
        assert!(inv.installments().is_empty());
    }

    #[test]
    fn admin_registration_allows_missing_pledge() {
        let inv = InviteeForm {
            name: "Baraka".into(),
            phone: "0755 000 111".into(),
            pledge_amount: None,
            payment_installments: vec![10_000.0, 5_000.0],
        }
        .into_invitee("admin-1")
        .unwrap();

        assert_eq!(inv.registration_type, RegistrationType::Registered);
        assert_eq!(inv.admin_id.as_deref(), Some("admin-1"));
        assert_eq!(inv.paid_amount(), 15_000.0);
    }

    #[test]
    fn admin_registration_rejects_bad_installments() {
        let errs = InviteeForm {
            name: "Baraka".into(),
            phone: "0755000111".into(),
            pledge_amount: Some(100.0),
            payment_installments: vec![0.0],
        }
        .into_invitee("admin-1")
        .unwrap_err();
        assert!(errs.get("paymentInstallments").is_some());
    }

    #[test]
    fn masked_view_hides_phone_tail() {
        let mut inv = Invitee::self_registered("Asha", "0712345678", 1_000.0);
        inv.record_payment(250.0).unwrap();
        let view = PledgeView::masked(&inv);
        assert_eq!(view.phone, "071***");
        assert_eq!(view.paid_amount, 250.0);
        assert_eq!(view.balance, 750.0);
    }
}
