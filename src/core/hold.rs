//! Hold and closed checks on referenced invoices.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::error::RecordError;
use super::services::InvoiceStore;
use super::types::{Invoice, InvoiceStatus, Record};

/// Status that keeps `invoice` from being billed on `today`, if any.
///
/// An invoice on hold stops blocking once its release date is reached;
/// without a release date it blocks until it is unblocked.
pub fn blocking_status(invoice: &Invoice, today: NaiveDate) -> Option<InvoiceStatus> {
    if invoice.status == InvoiceStatus::Closed {
        return Some(InvoiceStatus::Closed);
    }
    if invoice.on_hold || invoice.status == InvoiceStatus::OnHold {
        return match invoice.release_date {
            Some(release) if release <= today => None,
            _ => Some(InvoiceStatus::OnHold),
        };
    }
    None
}

/// Reject the record if any invoice it links is on hold or closed.
///
/// Items received through a purchase receipt are not checked.
pub fn check_on_hold_or_closed_status<H>(
    record: &Record,
    host: &H,
    today: NaiveDate,
) -> Result<(), RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let kind = record.side.invoice_kind();
    let mut checked = BTreeSet::new();

    for item in &record.items {
        if item.purchase_receipt.is_some() {
            continue;
        }
        let Some(name) = item.invoice.as_deref() else {
            continue;
        };
        if !checked.insert(name) {
            continue;
        }
        let Some(invoice) = host.invoice(kind, name)? else {
            continue;
        };
        if let Some(status) = blocking_status(&invoice, today) {
            return Err(RecordError::Precondition(format!(
                "{} {name} is {}",
                kind.doctype(),
                status.as_str()
            )));
        }
    }
    Ok(())
}
