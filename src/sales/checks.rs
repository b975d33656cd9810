//! Sales-only validation stages.

use crate::core::{Context, Host, PartyDirectory, Record, RecordError};

/// The record's project must belong to its customer or to no customer.
pub fn validate_project_customer<H>(record: &Record, host: &H) -> Result<(), RecordError>
where
    H: PartyDirectory + ?Sized,
{
    let Some(project) = record.project.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    if record.party.is_empty() {
        return Ok(());
    }
    let belongs = match host.project_customer(project)? {
        Some(None) => true,
        Some(Some(customer)) => customer.is_empty() || customer == record.party,
        None => false,
    };
    if !belongs {
        return Err(RecordError::invalid(
            "project",
            format!("Customer {} does not belong to project {project}", record.party),
        ));
    }
    Ok(())
}

/// Every item's cost center must belong to the record's company.
pub fn validate_item_cost_centers<H>(record: &Record, host: &H) -> Result<(), RecordError>
where
    H: PartyDirectory + ?Sized,
{
    for item in &record.items {
        let Some(cost_center) = item.cost_center.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        let company = host.cost_center_company(cost_center)?;
        if company.as_deref() != Some(record.company.as_str()) {
            return Err(RecordError::invalid_row(
                item.idx,
                format!("items[{}].cost_center", item.idx),
                format!(
                    "Cost Center {cost_center} does not belong to company {}",
                    record.company
                ),
            ));
        }
    }
    Ok(())
}

/// Change handed back to the customer needs the account it is paid from.
pub fn validate_account_for_change_amount(record: &Record) -> Result<(), RecordError> {
    let missing = record
        .account_for_change_amount
        .as_deref()
        .is_none_or(str::is_empty);
    if !record.change_amount.is_zero() && missing {
        return Err(RecordError::Configuration(
            "Please enter Account for Change Amount".into(),
        ));
    }
    Ok(())
}

pub(crate) fn project_customer_stage<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    validate_project_customer(ctx.record, ctx.host)
}

pub(crate) fn change_amount_stage<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    validate_account_for_change_amount(ctx.record)
}

pub(crate) fn cost_center_stage<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    validate_item_cost_centers(ctx.record, ctx.host)
}

/// Default the write-off account from the company when there is something
/// to write off.
pub(crate) fn set_write_off_account<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    let missing = ctx.record.write_off_account.as_deref().is_none_or(str::is_empty);
    if !ctx.record.write_off_amount.is_zero() && missing {
        ctx.record.write_off_account = ctx.host.company_write_off_account(&ctx.record.company)?;
    }
    Ok(())
}
