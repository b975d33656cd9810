//! Save, submit, cancel and amend drivers.
//!
//! Each driver works on a clone of the record and only writes it back once
//! every hook has succeeded, so a rejected operation leaves the caller's
//! record untouched. Host writes happen only in `on_submit`/`on_cancel`,
//! after all checks have passed.

use chrono::NaiveDate;
use tracing::{info, instrument};

use super::billing::{self, InvoiceBilling};
use super::error::RecordError;
use super::services::{Approval, Host, InvoiceStore};
use super::settings::Settings;
use super::status::{self, Action, DocStatus};
use super::types::{Record, Side};

/// Lifecycle hooks of a record type.
///
/// Hooks run in the order `before_save`, `validate`, then `on_submit` or
/// `on_cancel`, then `on_update`.
pub trait RecordController {
    fn side(&self) -> Side;

    fn settings(&self) -> &Settings;

    fn before_save<H: Host + ?Sized>(&self, record: &mut Record, host: &H) -> Result<(), RecordError> {
        let _ = (record, host);
        Ok(())
    }

    fn validate<H: Host + ?Sized>(
        &self,
        record: &mut Record,
        host: &H,
        today: NaiveDate,
    ) -> Result<(), RecordError>;

    /// Check the referenced invoices, then propagate billed amounts.
    fn on_submit<H: Host + ?Sized>(&self, record: &mut Record, host: &mut H) -> Result<(), RecordError> {
        check_prev_docstatus(record, &*host)?;
        let plans = plan_submit(record, &*host, self.settings())?;
        billing::commit_billing(host, &plans)
    }

    /// Recompute billed amounts without this record's rows.
    fn on_cancel<H: Host + ?Sized>(
        &self,
        record: &mut Record,
        host: &mut H,
        today: NaiveDate,
    ) -> Result<(), RecordError> {
        let _ = today;
        let plans = billing::plan_billing(record, &*host, self.settings())?;
        billing::commit_billing(host, &plans)
    }

    fn on_update(&self, record: &mut Record) -> Result<(), RecordError> {
        let _ = record;
        Ok(())
    }
}

fn ensure_side<C: RecordController>(controller: &C, record: &Record) -> Result<(), RecordError> {
    if controller.side() != record.side {
        return Err(RecordError::invalid(
            "side",
            format!(
                "{} cannot be handled as a {}",
                record.side.record_doctype(),
                controller.side().record_doctype()
            ),
        ));
    }
    Ok(())
}

/// Validate and store a draft.
#[instrument(skip_all, fields(record = %record.name, side = ?record.side))]
pub fn save<C, H>(
    controller: &C,
    record: &mut Record,
    host: &H,
    today: NaiveDate,
) -> Result<(), RecordError>
where
    C: RecordController,
    H: Host + ?Sized,
{
    ensure_side(controller, record)?;
    if record.docstatus != DocStatus::Draft {
        return Err(RecordError::Precondition(format!(
            "Cannot edit {} {} once it is {}",
            record.side.record_doctype(),
            record.name,
            record.docstatus
        )));
    }

    let mut draft = record.clone();
    controller.before_save(&mut draft, host)?;
    controller.validate(&mut draft, host, today)?;
    controller.on_update(&mut draft)?;
    draft.is_new = false;
    *record = draft;
    info!(grand_total = %record.grand_total, "record saved");
    Ok(())
}

/// Validate, move to Submitted and propagate billed amounts.
#[instrument(skip_all, fields(record = %record.name, side = ?record.side))]
pub fn submit<C, H>(
    controller: &C,
    record: &mut Record,
    host: &mut H,
    today: NaiveDate,
) -> Result<(), RecordError>
where
    C: RecordController,
    H: Host + ?Sized,
{
    ensure_side(controller, record)?;
    let next = record.docstatus.transition(Action::Submit)?;

    let mut draft = record.clone();
    controller.before_save(&mut draft, &*host)?;
    controller.validate(&mut draft, &*host, today)?;
    draft.docstatus = next;
    draft.is_new = false;
    status::set_status(&mut draft);
    controller.on_submit(&mut draft, host)?;
    controller.on_update(&mut draft)?;
    *record = draft;
    info!(status = %record.status, "record submitted");
    Ok(())
}

/// Move a submitted record to Cancelled and reverse its billing.
#[instrument(skip_all, fields(record = %record.name, side = ?record.side))]
pub fn cancel<C, H>(
    controller: &C,
    record: &mut Record,
    host: &mut H,
    today: NaiveDate,
) -> Result<(), RecordError>
where
    C: RecordController,
    H: Host + ?Sized,
{
    ensure_side(controller, record)?;
    let next = record.docstatus.transition(Action::Cancel)?;

    let mut draft = record.clone();
    draft.docstatus = next;
    status::set_status(&mut draft);
    controller.on_cancel(&mut draft, host, today)?;
    *record = draft;
    info!("record cancelled");
    Ok(())
}

/// New draft copy of a cancelled record.
pub fn amend(record: &Record) -> Result<Record, RecordError> {
    record.docstatus.transition(Action::Amend)?;
    let mut amended = record.clone();
    amended.name = amendment_name(record);
    amended.amended_from = Some(record.name.clone());
    amended.docstatus = DocStatus::Draft;
    amended.is_new = true;
    status::set_status(&mut amended);
    Ok(amended)
}

/// `{name}-1` for a first amendment, `{base}-{n+1}` when amending an
/// amendment.
pub fn amendment_name(record: &Record) -> String {
    if record.amended_from.is_some() {
        if let Some((base, n)) = record.name.rsplit_once('-') {
            if let Ok(n) = n.parse::<u32>() {
                return format!("{base}-{}", n + 1);
            }
        }
    }
    format!("{}-1", record.name)
}

/// Every invoice the record links must be submitted.
pub fn check_prev_docstatus<H>(record: &Record, host: &H) -> Result<(), RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let kind = record.side.invoice_kind();
    for name in record.linked_invoices() {
        let docstatus = host.invoice(kind, name)?.map(|inv| inv.docstatus);
        match docstatus {
            Some(DocStatus::Submitted) => {}
            Some(_) => {
                return Err(RecordError::Precondition(format!(
                    "{} {name} is not submitted",
                    kind.doctype()
                )));
            }
            None => {
                return Err(RecordError::invalid(
                    "items",
                    format!("Invalid reference {} {name}", kind.doctype()),
                ));
            }
        }
    }
    Ok(())
}

/// Billing plan for a submit, rejected when it over-bills a row or the
/// approving authority refuses the amount.
pub fn plan_submit<H>(
    record: &Record,
    host: &H,
    settings: &Settings,
) -> Result<Vec<InvoiceBilling>, RecordError>
where
    H: Host + ?Sized,
{
    let plans = billing::plan_billing(record, host, settings)?;
    if let Some((plan, over)) = plans
        .iter()
        .find_map(|p| p.over_limit.first().map(|o| (p, o)))
    {
        return Err(RecordError::Precondition(format!(
            "This document is over limit by {} for item {} (row {}) of {} {}. Increase the over-billing allowance to allow it.",
            (over.billed - over.limit).normalize(),
            over.item_code,
            over.row,
            plan.kind.doctype(),
            plan.invoice
        )));
    }

    let approval = host.check(
        record.side.record_doctype(),
        &record.company,
        record.base_grand_total,
    )?;
    if let Approval::Rejected(reason) = approval {
        return Err(RecordError::Precondition(reason));
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::RecordBuilder;
    use chrono::NaiveDate;

    fn cancelled(name: &str, amended_from: Option<&str>) -> Record {
        let mut record =
            RecordBuilder::new(name, Side::Purchase, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
                .build()
                .unwrap();
        record.docstatus = DocStatus::Cancelled;
        record.is_new = false;
        record.amended_from = amended_from.map(String::from);
        record
    }

    #[test]
    fn first_amendment_appends_suffix() {
        let amended = amend(&cancelled("PIR-2024-0001", None)).unwrap();
        assert_eq!(amended.name, "PIR-2024-0001-1");
        assert_eq!(amended.amended_from.as_deref(), Some("PIR-2024-0001"));
        assert_eq!(amended.docstatus, DocStatus::Draft);
        assert_eq!(amended.status, status::RecordStatus::Draft);
    }

    #[test]
    fn amending_an_amendment_increments() {
        let amended = amend(&cancelled("PIR-2024-0001-1", Some("PIR-2024-0001"))).unwrap();
        assert_eq!(amended.name, "PIR-2024-0001-2");
    }

    #[test]
    fn only_cancelled_records_can_be_amended() {
        let mut record = cancelled("PIR-1", None);
        record.docstatus = DocStatus::Submitted;
        assert!(matches!(amend(&record), Err(RecordError::Precondition(_))));
    }
}
