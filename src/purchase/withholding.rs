//! Tax withholding (TDS) on purchase records.

use tracing::debug;

use crate::core::totals::calculate_taxes_and_totals;
use crate::core::{Context, Host, Record, RecordError, Settings, TaxWithholding};

/// Merge the withholding row for the record's category into its taxes.
///
/// An existing row for the withholding account is updated in place,
/// otherwise the row is appended. Totals are recalculated, and a row whose
/// recalculated amount is zero is then removed. Running this again with the
/// same inputs leaves the record unchanged.
pub fn apply_tax_withholding<H>(
    record: &mut Record,
    host: &H,
    settings: &Settings,
) -> Result<(), RecordError>
where
    H: TaxWithholding + ?Sized,
{
    if !record.apply_tds {
        return Ok(());
    }
    let Some(category) = record
        .tax_withholding_category
        .clone()
        .filter(|c| !c.is_empty())
    else {
        return Ok(());
    };
    let Some(details) = host.withholding_details(record, &category)? else {
        debug!(record = %record.name, category = %category, "no withholding applies");
        return Ok(());
    };

    let account = details.account_head.clone();
    let mut found = false;
    for tax in record.taxes.iter_mut().filter(|t| t.account_head == account) {
        tax.charge_type = details.charge_type;
        tax.add_deduct = details.add_deduct;
        tax.rate = details.rate;
        tax.tax_amount = details.tax_amount;
        tax.description = details.description.clone();
        found = true;
    }
    if !found {
        record.taxes.push(details);
    }

    calculate_taxes_and_totals(record, settings);
    let before = record.taxes.len();
    record
        .taxes
        .retain(|t| !(t.account_head == account && t.tax_amount.is_zero()));
    if record.taxes.len() != before {
        calculate_taxes_and_totals(record, settings);
    }
    debug!(
        record = %record.name,
        account = %account,
        grand_total = %record.grand_total,
        "applied tax withholding"
    );
    Ok(())
}

pub(crate) fn tax_withholding_stage<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    apply_tax_withholding(ctx.record, ctx.host, ctx.settings)
}
