//! Cash purchases: records paid on the spot.

use crate::core::{Context, Host, Record, RecordError, Settings};

/// A paid record needs the cash or bank account the payment comes from, and
/// paid plus written-off amount may not exceed the grand total.
pub fn validate_cash(record: &Record, settings: &Settings) -> Result<(), RecordError> {
    if !record.is_paid {
        return Ok(());
    }

    let missing = record.cash_bank_account.as_deref().is_none_or(str::is_empty);
    if missing && !record.paid_amount.is_zero() {
        return Err(RecordError::Configuration(
            "Cash or Bank Account is mandatory for making payment entry".into(),
        ));
    }

    let excess = record.paid_amount + record.write_off_amount - record.grand_total;
    if excess > settings.amount_tolerance() {
        return Err(RecordError::invalid(
            "paid_amount",
            "Paid amount + Write Off Amount can not be greater than Grand Total",
        ));
    }
    Ok(())
}

pub(crate) fn cash_stage<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    validate_cash(ctx.record, ctx.settings)
}
