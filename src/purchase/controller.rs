use chrono::NaiveDate;

use crate::core::lifecycle::RecordController;
use crate::core::{Context, Host, Pipeline, Record, RecordError, Settings, Side, billing, hold, stages};

use super::cash::cash_stage;
use super::hold::{clear_release_date, release_date_stage};
use super::supplier_invoice::{supplier_invoice_stage, supplier_remarks};
use super::withholding::tax_withholding_stage;

/// Controller of the Purchase Invoice Record.
#[derive(Debug, Clone, Default)]
pub struct PurchaseRecordController {
    settings: Settings,
}

impl PurchaseRecordController {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Validation stages in execution order.
    pub fn pipeline<H: Host + ?Sized>() -> Pipeline<H> {
        Pipeline::new()
            .stage("set_missing_values", stages::set_missing_values)
            .stage("calculate_totals", stages::calculate_totals)
            .stage("check_conversion_rate", stages::check_conversion_rate)
            .stage("validate_credit_to_account", stages::validate_party_account)
            .stage("validate_supplier_invoice", supplier_invoice_stage)
            .stage("validate_release_date", release_date_stage)
            .stage("check_on_hold_or_closed_status", stages::check_on_hold_or_closed_status)
            .stage("validate_with_previous_doc", stages::validate_with_previous_doc)
            .stage("validate_rate", stages::validate_rate)
            .stage("validate_uom_is_integer", stages::validate_uom_is_integer)
            .stage("validate_write_off_account", stages::validate_write_off_account)
            .stage("create_remarks", create_remarks)
            .stage("set_tax_withholding", tax_withholding_stage)
            .stage("validate_cash", cash_stage)
            .stage("set_status", stages::set_status)
    }
}

fn create_remarks<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    if ctx.record.remarks.as_deref().is_none_or(str::is_empty) {
        ctx.record.remarks = Some(supplier_remarks(ctx.record));
    }
    Ok(())
}

impl RecordController for PurchaseRecordController {
    fn side(&self) -> Side {
        Side::Purchase
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn before_save<H: Host + ?Sized>(&self, record: &mut Record, _host: &H) -> Result<(), RecordError> {
        clear_release_date(record);
        Ok(())
    }

    fn validate<H: Host + ?Sized>(
        &self,
        record: &mut Record,
        host: &H,
        today: NaiveDate,
    ) -> Result<(), RecordError> {
        let mut ctx = Context::new(record, host, &self.settings, today);
        Self::pipeline::<H>().run(&mut ctx)
    }

    /// Re-check holds on the referenced invoices, then reverse the billing.
    fn on_cancel<H: Host + ?Sized>(
        &self,
        record: &mut Record,
        host: &mut H,
        today: NaiveDate,
    ) -> Result<(), RecordError> {
        hold::check_on_hold_or_closed_status(record, &*host, today)?;
        let plans = billing::plan_billing(record, &*host, &self.settings)?;
        billing::commit_billing(host, &plans)
    }
}
