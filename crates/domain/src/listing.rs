use serde::Serialize;

use crate::invitee::Invitee;

/// Largest pledges first; missing amounts count as zero. Stable, so equal
/// pledges keep their load order.
pub fn sort_by_pledge_desc(invitees: &mut [Invitee]) {
    invitees.sort_by(|a, b| b.pledged().total_cmp(&a.pledged()));
}

/// Case-insensitive substring match on name or phone, re-sorted by pledge.
/// A blank query returns everything; any other query is matched as typed,
/// surrounding spaces included.
pub fn search(invitees: &[Invitee], query: &str) -> Vec<Invitee> {
    let blank = query.trim().is_empty();
    let needle = query.to_lowercase();
    let mut hits: Vec<Invitee> = invitees
        .iter()
        .filter(|inv| {
            blank
                || inv.name.to_lowercase().contains(&needle)
                || inv.phone.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    sort_by_pledge_desc(&mut hits);
    hits
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_pledged: f64,
    pub total_paid: f64,
}

impl Totals {
    pub fn of<'a>(invitees: impl IntoIterator<Item = &'a Invitee>) -> Self {
        invitees
            .into_iter()
            .fold(Totals::default(), |acc, inv| Totals {
                total_pledged: acc.total_pledged + inv.pledged(),
                total_paid: acc.total_paid + inv.paid_amount(),
            })
    }
}

/// First three characters followed by `***`.
pub fn mask_phone(phone: &str) -> String {
    let head: String = phone.chars().take(3).collect();
    format!("{head}***")
}
