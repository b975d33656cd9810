//! Invoice line lookups used when filling a record.

use rust_decimal::Decimal;

use super::error::RecordError;
use super::services::InvoiceStore;
use super::settings::Settings;
use super::types::{InvoiceItem, InvoiceKind, RecordItem};

/// Item codes of `invoice` whose code contains `search`, ordered by row
/// name and paged by `start`/`page_len`.
pub fn invoice_item_codes<H>(
    host: &H,
    kind: InvoiceKind,
    invoice: &str,
    search: &str,
    start: usize,
    page_len: usize,
) -> Result<Vec<String>, RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let Some(invoice) = host.invoice(kind, invoice)? else {
        return Ok(Vec::new());
    };
    let needle = search.to_lowercase();
    let mut rows: Vec<&InvoiceItem> = invoice
        .items
        .iter()
        .filter(|i| i.item_code.to_lowercase().contains(&needle))
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(rows
        .into_iter()
        .skip(start)
        .take(page_len)
        .map(|i| i.item_code.clone())
        .collect())
}

/// Row names of `invoice` carrying `item_code`.
pub fn invoice_detail_rows<H>(
    host: &H,
    kind: InvoiceKind,
    invoice: &str,
    item_code: &str,
) -> Result<Vec<String>, RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let Some(invoice) = host.invoice(kind, invoice)? else {
        return Ok(Vec::new());
    };
    let mut rows: Vec<String> = invoice
        .items
        .iter()
        .filter(|i| i.item_code == item_code)
        .map(|i| i.name.clone())
        .collect();
    rows.sort();
    Ok(rows)
}

/// Record items covering the unbilled remainder of `lines`, in order,
/// until `amount` is used up.
///
/// Each item bills `min(unbilled, remaining)` at the line's rate, so its
/// quantity is `amount / rate`.
pub fn allocate_unbilled(lines: &[InvoiceItem], amount: Decimal, settings: &Settings) -> Vec<RecordItem> {
    let mut remaining = amount;
    let mut items = Vec::new();

    for line in lines {
        if remaining <= Decimal::ZERO {
            break;
        }
        let unbilled = line.unbilled_amount();
        if unbilled <= Decimal::ZERO {
            continue;
        }
        let billed = settings.round_amount(unbilled.min(remaining));
        let qty = if line.rate.is_zero() {
            line.qty
        } else {
            (billed / line.rate).round_dp(6)
        };
        remaining -= billed;
        items.push(RecordItem {
            idx: items.len() + 1,
            item_code: line.item_code.clone(),
            uom: line.uom.clone(),
            qty,
            stock_uom: line.uom.clone(),
            stock_qty: qty * line.conversion_factor,
            conversion_factor: line.conversion_factor,
            project: line.project.clone(),
            cost_center: None,
            rate: line.rate,
            amount: billed,
            invoice: Some(line.parent.clone()),
            invoice_detail: Some(line.name.clone()),
            purchase_receipt: None,
        });
    }
    items
}
