use regex::Regex;
use std::sync::LazyLock;

use super::FieldErrors;

pub const NAME_REQUIRED: &str = "Name is required";
pub const PHONE_REQUIRED: &str = "Phone is required";
pub const PHONE_INVALID: &str = "Please enter a valid phone number";

// Loose on purpose: optional leading '+', then 9-15 digits, spaces or dashes.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s-]{9,15}$").expect("phone pattern must compile"));

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Records `name: NAME_REQUIRED` when `name` is blank.
pub fn require_name(errors: &mut FieldErrors, name: &str) {
    if name.trim().is_empty() {
        errors.add("name", NAME_REQUIRED);
    }
}

/// Records a phone error when it is blank or fails the pattern.
pub fn require_phone(errors: &mut FieldErrors, phone: &str) {
    let phone = phone.trim();
    if phone.is_empty() {
        errors.add("phone", PHONE_REQUIRED);
    } else if !is_valid_phone(phone) {
        errors.add("phone", PHONE_INVALID);
    }
}
