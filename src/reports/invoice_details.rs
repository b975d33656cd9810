use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::core::{BillingStatus, DocStatus, RecordError, Side};

use super::ReportSource;
use super::filters::InvoiceDetailsFilters;
use super::table::{Cell, Column, ColumnType, ReportTable};

fn columns(side: Side) -> Vec<Column> {
    let (party, party_name) = match side {
        Side::Purchase => ("Supplier", "Supplier Name"),
        Side::Sales => ("Customer", "Customer Name"),
    };
    vec![
        Column::new("Posting Date", "posting_date", ColumnType::Date, 90),
        Column::new(side.invoice_kind().doctype(), "invoice", ColumnType::Link, 140),
        Column::new(party, "party", ColumnType::Link, 120),
        Column::new(party_name, "party_name", ColumnType::Data, 150),
        Column::new("Item Code", "item_code", ColumnType::Link, 120),
        Column::new("Qty", "qty", ColumnType::Float, 70),
        Column::new("Rate", "rate", ColumnType::Currency, 90),
        Column::new("Amount", "amount", ColumnType::Currency, 100),
        Column::new("Billed Amount", "billed_amt", ColumnType::Currency, 100),
        Column::new("Unbilled Amount", "unbilled_amt", ColumnType::Currency, 100),
        Column::new("% Billed", "per_billed", ColumnType::Percent, 80),
    ]
}

/// One row per submitted invoice item posted in the filter window.
#[instrument(skip(source, filters), fields(from = %filters.from_date, to = %filters.report_date))]
pub fn invoice_details<S>(
    source: &S,
    side: Side,
    filters: &InvoiceDetailsFilters,
) -> Result<ReportTable, RecordError>
where
    S: ReportSource + ?Sized,
{
    let kind = side.invoice_kind();
    let mut invoices = source.submitted_invoices(
        kind,
        filters.company.as_deref(),
        filters.from_date,
        filters.report_date,
    )?;
    invoices.retain(|inv| {
        inv.docstatus == DocStatus::Submitted
            && filters.party.as_deref().is_none_or(|p| inv.party == p)
            && !(filters.hide_completed_invoice
                && matches!(
                    inv.billing_status,
                    BillingStatus::FullyBilled | BillingStatus::Overbilled
                ))
    });
    invoices.sort_by(|a, b| (a.posting_date, &a.name).cmp(&(b.posting_date, &b.name)));

    let mut table = ReportTable::new(columns(side));
    for invoice in &invoices {
        let party_name = invoice.party_name.as_deref().unwrap_or(&invoice.party);
        for item in &invoice.items {
            if filters
                .item_code
                .as_deref()
                .is_some_and(|code| item.item_code != code)
            {
                continue;
            }
            let per_billed = if item.amount.is_zero() {
                Decimal::ZERO
            } else {
                (item.billed_amt / item.amount * Decimal::ONE_HUNDRED).round_dp(2)
            };
            table.rows.push(vec![
                Cell::Date(invoice.posting_date),
                Cell::Text(invoice.name.clone()),
                Cell::Text(invoice.party.clone()),
                Cell::Text(party_name.to_string()),
                Cell::Text(item.item_code.clone()),
                Cell::Number(item.qty),
                Cell::Number(item.rate),
                Cell::Number(item.amount),
                Cell::Number(item.billed_amt),
                Cell::Number(item.unbilled_amount()),
                Cell::Number(per_billed),
            ]);
        }
    }

    info!(rows = table.rows.len(), invoices = invoices.len(), "invoice details report");
    Ok(table)
}
