use chrono::NaiveDate;

use crate::core::lifecycle::RecordController;
use crate::core::{Context, Host, Pipeline, Record, RecordError, Settings, Side, stages};

use super::checks::{
    change_amount_stage, cost_center_stage, project_customer_stage, set_write_off_account,
};
use super::payments::{set_account_for_mode_of_payment, set_paid_amount};

/// Controller of the Sales Invoice Record.
#[derive(Debug, Clone, Default)]
pub struct SalesRecordController {
    settings: Settings,
}

impl SalesRecordController {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Validation stages in execution order.
    pub fn pipeline<H: Host + ?Sized>() -> Pipeline<H> {
        Pipeline::new()
            .stage("set_missing_values", stages::set_missing_values)
            .stage("set_write_off_account", set_write_off_account)
            .stage("calculate_totals", stages::calculate_totals)
            .stage("check_conversion_rate", stages::check_conversion_rate)
            .stage("validate_debit_to_account", stages::validate_party_account)
            .stage("validate_project_customer", project_customer_stage)
            .stage("validate_item_cost_centers", cost_center_stage)
            .stage("check_closed_status", stages::check_on_hold_or_closed_status)
            .stage("validate_with_previous_doc", stages::validate_with_previous_doc)
            .stage("validate_rate", stages::validate_rate)
            .stage("validate_uom_is_integer", stages::validate_uom_is_integer)
            .stage("validate_write_off_account", stages::validate_write_off_account)
            .stage("validate_account_for_change_amount", change_amount_stage)
            .stage("add_remarks", add_remarks)
            .stage("set_status", stages::set_status)
    }
}

fn add_remarks<H: Host + ?Sized>(ctx: &mut Context<'_, H>) -> Result<(), RecordError> {
    if ctx.record.remarks.as_deref().is_none_or(str::is_empty) {
        ctx.record.remarks = Some("No Remarks".to_string());
    }
    Ok(())
}

impl RecordController for SalesRecordController {
    fn side(&self) -> Side {
        Side::Sales
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn before_save<H: Host + ?Sized>(&self, record: &mut Record, host: &H) -> Result<(), RecordError> {
        set_account_for_mode_of_payment(record, host)
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

    fn on_update(&self, record: &mut Record) -> Result<(), RecordError> {
        set_paid_amount(record, &self.settings);
        Ok(())
    }
}
