//! Hold metadata of a purchase record.
//!
//! Unlike every other field, hold metadata may change after submit.

use chrono::NaiveDate;
use tracing::info;

use crate::core::{Context, DocStatus, Host, Record, RecordError, Side};

/// A release date, when set, must lie after `today`.
pub fn validate_release_date(record: &Record, today: NaiveDate) -> Result<(), RecordError> {
    match record.release_date {
        Some(release) if release <= today => Err(RecordError::invalid(
            "release_date",
            "Release date must be in the future",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn release_date_stage<H: Host + ?Sized>(
    ctx: &mut Context<'_, H>,
) -> Result<(), RecordError> {
    validate_release_date(ctx.record, ctx.today)
}

/// A record that is not on hold carries no release date.
pub fn clear_release_date(record: &mut Record) {
    if !record.on_hold {
        record.release_date = None;
    }
}

fn ensure_holdable(record: &Record) -> Result<(), RecordError> {
    if record.side != Side::Purchase {
        return Err(RecordError::invalid(
            "on_hold",
            "Only purchase records can be put on hold",
        ));
    }
    if record.docstatus == DocStatus::Cancelled {
        return Err(RecordError::Precondition(format!(
            "{} {} is cancelled",
            record.side.record_doctype(),
            record.name
        )));
    }
    Ok(())
}

/// Put the record on hold, optionally until `release_date`.
pub fn block(
    record: &mut Record,
    hold_comment: impl Into<String>,
    release_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), RecordError> {
    ensure_holdable(record)?;
    let mut held = record.clone();
    held.on_hold = true;
    held.hold_comment = Some(hold_comment.into());
    held.release_date = release_date;
    validate_release_date(&held, today)?;
    *record = held;
    info!(record = %record.name, release_date = ?record.release_date, "record put on hold");
    Ok(())
}

/// Release the record from hold.
pub fn unblock(record: &mut Record) -> Result<(), RecordError> {
    ensure_holdable(record)?;
    record.on_hold = false;
    record.release_date = None;
    info!(record = %record.name, "record released from hold");
    Ok(())
}
