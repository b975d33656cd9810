//! Validation stages shared by purchase and sales records.

use super::compare::{self, PURCHASE_HEADER_FIELDS, PURCHASE_ITEM_FIELDS, SALES_HEADER_FIELDS, SALES_ITEM_FIELDS};
use super::currency;
use super::error::RecordError;
use super::hold;
use super::pipeline::Context;
use super::services::Host;
use super::status;
use super::totals;
use super::types::{ReportType, Side};
use super::uom::{self, QtyField};

/// Fill the party account, its currency, the due date and item invoice links.
pub fn set_missing_values<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    let side = ctx.record.side;
    let party_type = side.party_type();

    if ctx.record.party_account.is_none() && !ctx.record.party.is_empty() {
        let account = ctx
            .host
            .party_account(party_type, &ctx.record.party, &ctx.record.company)?
            .ok_or_else(|| {
                RecordError::Configuration(format!(
                    "Please set a default {} account for {} {} in company {}",
                    side.party_account_label(),
                    party_type.as_str(),
                    ctx.record.party,
                    ctx.record.company
                ))
            })?;
        ctx.record.party_account_currency = ctx.host.account(&account)?.map(|a| a.currency);
        ctx.record.party_account = Some(account);
    }

    if ctx.record.due_date.is_none() {
        ctx.record.due_date = ctx.host.due_date(
            ctx.record.posting_date,
            party_type,
            &ctx.record.party,
            &ctx.record.company,
            ctx.record.bill_date,
        )?;
    }

    let kind = side.invoice_kind();
    for item in &mut ctx.record.items {
        if item.invoice.is_some() {
            continue;
        }
        if let Some(row) = item.invoice_detail.as_deref() {
            item.invoice = ctx.host.invoice_item(kind, row)?.map(|r| r.parent);
        }
    }
    Ok(())
}

pub fn calculate_totals<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    totals::calculate_taxes_and_totals(ctx.record, ctx.settings);
    Ok(())
}

pub fn check_conversion_rate<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    currency::check_conversion_rate(ctx.record, ctx.host)
}

/// The party account must be a balance-sheet Payable/Receivable account.
pub fn validate_party_account<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    let side = ctx.record.side;
    let label = side.party_account_label();
    let account = match ctx.record.party_account.as_deref() {
        Some(name) => ctx.host.account(name)?,
        None => None,
    };
    let Some(account) = account else {
        return Err(RecordError::Configuration(format!("{label} is required")));
    };

    if account.report_type != ReportType::BalanceSheet {
        return Err(RecordError::invalid(
            "party_account",
            format!(
                "Please ensure {label} account is a Balance Sheet account. You can change the parent account to a Balance Sheet account or select a different account."
            ),
        ));
    }

    let expected = side.party_account_type();
    if !ctx.record.party.is_empty() && account.account_type != expected {
        return Err(RecordError::invalid(
            "party_account",
            format!(
                "Please ensure {label} account is a {expected:?} account. Change the account type to {expected:?} or select a different account."
            ),
        ));
    }

    ctx.record.party_account_currency = Some(account.currency);
    Ok(())
}

/// Header, item and tax consistency with the referenced invoices.
pub fn validate_with_previous_doc<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    match ctx.record.side {
        Side::Purchase => {
            compare::validate_reference_headers(ctx.record, PURCHASE_HEADER_FIELDS, ctx.host)?;
            compare::validate_reference_items(ctx.record, PURCHASE_ITEM_FIELDS, ctx.host)?;
            compare::validate_reference_taxes(ctx.record, ctx.host)
        }
        Side::Sales => {
            compare::validate_reference_headers(ctx.record, SALES_HEADER_FIELDS, ctx.host)?;
            compare::validate_reference_items(ctx.record, SALES_ITEM_FIELDS, ctx.host)
        }
    }
}

/// Rate check, when the side's "maintain same rate" setting is on.
pub fn validate_rate<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    let enabled = match ctx.record.side {
        Side::Purchase => ctx.settings.maintain_same_rate,
        Side::Sales => ctx.settings.maintain_same_sales_rate,
    };
    if !enabled || ctx.record.is_return {
        return Ok(());
    }
    compare::validate_rate_with_reference(ctx.record, ctx.settings, ctx.host)
}

pub fn validate_uom_is_integer<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    uom::validate_uom_is_integer(ctx.record, QtyField::Qty, ctx.host)?;
    uom::validate_uom_is_integer(ctx.record, QtyField::StockQty, ctx.host)
}

/// Referenced invoices must not be on hold or closed.
pub fn check_on_hold_or_closed_status<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    hold::check_on_hold_or_closed_status(ctx.record, ctx.host, ctx.today)
}

/// A write-off amount needs a write-off account.
pub fn validate_write_off_account<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    let missing = ctx
        .record
        .write_off_account
        .as_deref()
        .is_none_or(str::is_empty);
    if !ctx.record.write_off_amount.is_zero() && missing {
        return Err(RecordError::Configuration(
            "Please enter Write Off Account".into(),
        ));
    }
    Ok(())
}

pub fn set_status<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    status::set_status(ctx.record);
    Ok(())
}
