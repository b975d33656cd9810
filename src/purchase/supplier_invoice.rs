//! Supplier bill number and date checks.

use crate::core::{Context, FiscalYears, Host, InvoiceStore, Record, RecordError, Settings};

/// The supplier's bill date may not follow the posting date, and with
/// uniqueness enabled no other purchase invoice of the supplier in the same
/// fiscal year may carry the bill number. Returns are not checked.
pub fn validate_supplier_invoice<H>(
    record: &Record,
    host: &H,
    settings: &Settings,
) -> Result<(), RecordError>
where
    H: InvoiceStore + FiscalYears + ?Sized,
{
    if record.is_return {
        return Ok(());
    }

    if let Some(bill_date) = record.bill_date {
        if bill_date > record.posting_date {
            return Err(RecordError::invalid(
                "bill_date",
                "Supplier Invoice Date cannot be greater than Posting Date",
            ));
        }
    }

    let Some(bill_no) = record.bill_no.as_deref().filter(|b| !b.is_empty()) else {
        return Ok(());
    };
    if !settings.check_supplier_invoice_uniqueness {
        return Ok(());
    }

    let fiscal_year = host
        .fiscal_year(record.posting_date, &record.company)?
        .ok_or_else(|| {
            RecordError::Configuration(format!(
                "Date {} is not in any active Fiscal Year for {}",
                record.posting_date, record.company
            ))
        })?;
    let exclude = record.linked_invoices();
    if let Some(existing) = host.invoice_with_bill_no(
        bill_no,
        &record.party,
        &exclude,
        fiscal_year.start,
        fiscal_year.end,
    )? {
        return Err(RecordError::invalid(
            "bill_no",
            format!("Supplier Invoice No exists in Purchase Invoice {existing}"),
        ));
    }
    Ok(())
}

pub(crate) fn supplier_invoice_stage<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    validate_supplier_invoice(ctx.record, ctx.host, ctx.settings)
}

/// Default remark naming the supplier bill.
pub fn supplier_remarks(record: &Record) -> String {
    match (record.bill_no.as_deref(), record.bill_date) {
        (Some(no), Some(date)) if !no.is_empty() => format!(
            "Against Supplier Invoice {no} dated {}",
            date.format("%d-%m-%Y")
        ),
        _ => "No Remarks".to_string(),
    }
}
