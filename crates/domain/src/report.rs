use serde::Serialize;

use crate::invitee::Invitee;
use crate::listing::Totals;
use crate::pledge::PledgeView;

pub const CSV_FILE_NAME: &str = "Pledges_Report.csv";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteeReport {
    pub invitees: Vec<PledgeView>,
    pub total_pledged_amount: f64,
    pub total_paid_amount: f64,
}

impl InviteeReport {
    pub fn of(invitees: &[Invitee]) -> Self {
        let totals = Totals::of(invitees);
        Self {
            invitees: invitees.iter().map(PledgeView::of).collect(),
            total_pledged_amount: totals.total_pledged,
            total_paid_amount: totals.total_paid,
        }
    }
}

/// One header line plus one row per invitee, in the order given.
///
/// Fields are joined with bare commas and never quoted, so a comma inside a
/// name shifts the columns of that row.
pub fn export_csv(invitees: &[Invitee], currency: &str) -> String {
    let header = [
        "Name".to_owned(),
        "Phone".to_owned(),
        format!("Pledge Amount ({currency})"),
        format!("Paid Amount ({currency})"),
        format!("Balance ({currency})"),
        "Payment Status".to_owned(),
        "Payment %".to_owned(),
    ];

    let mut lines = Vec::with_capacity(invitees.len() + 1);
    lines.push(header.join(","));

    for inv in invitees {
        let pledged = inv.pledged();
        let paid = inv.paid_amount();
        let phone = if inv.phone.trim().is_empty() {
            "N/A"
        } else {
            inv.phone.as_str()
        };
        let percent = if pledged > 0.0 {
            format!("{}%", (paid / pledged * 100.0).round())
        } else {
            "0%".to_owned()
        };
        let row = [
            inv.name.clone(),
            phone.to_owned(),
            pledged.to_string(),
            paid.to_string(),
            inv.balance().to_string(),
            inv.payment_status().to_string(),
            percent,
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_invitees() -> Vec<Invitee> {
        let mut a = Invitee::self_registered("Asha", "0712345678", 200_000.0);
        a.record_payment(50_000.0).unwrap();
        let b = Invitee::self_registered("Juma", "", 1_000.0);
        vec![a, b]
    }

    #[test]
    fn csv_has_header_plus_one_line_per_invitee() {
        let csv = export_csv(&two_invitees(), "TZS");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.split(',').count(), 7, "line: {line}");
        }
        assert_eq!(
            lines[0],
            "Name,Phone,Pledge Amount (TZS),Paid Amount (TZS),Balance (TZS),Payment Status,Payment %"
        );
    }

    #[test]
    fn csv_rows_carry_derived_figures() {
        let csv = export_csv(&two_invitees(), "TZS");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "Asha,0712345678,200000,50000,150000,Partially Paid,25%");
        assert_eq!(lines[2], "Juma,N/A,1000,0,1000,Not Paid,0%");
    }

    #[test]
    fn percentage_is_rounded() {
        let mut a = Invitee::self_registered("Asha", "0712345678", 300.0);
        a.record_payment(200.0).unwrap();
        let csv = export_csv(&[a], "TZS");
        assert!(csv.ends_with(",67%"), "{csv}");
    }

    #[test]
    fn report_totals_match_rows() {
        let report = InviteeReport::of(&two_invitees());
        assert_eq!(report.invitees.len(), 2);
        assert_eq!(report.total_pledged_amount, 201_000.0);
        assert_eq!(report.total_paid_amount, 50_000.0);
    }
}
