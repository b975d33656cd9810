//! Payment rows and the customer-facing indicator.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::{PartyDirectory, Record, RecordError, Settings};

/// Fill missing payment accounts from the mode of payment's default.
pub fn set_account_for_mode_of_payment<H>(record: &mut Record, host: &H) -> Result<(), RecordError>
where
    H: PartyDirectory + ?Sized,
{
    for payment in &mut record.payments {
        if payment.account.as_deref().is_some_and(|a| !a.is_empty()) {
            continue;
        }
        let account = host
            .mode_of_payment_account(&payment.mode_of_payment, &record.company)?
            .ok_or_else(|| {
                RecordError::Configuration(format!(
                    "Please set default Cash or Bank account in Mode of Payment {}",
                    payment.mode_of_payment
                ))
            })?;
        payment.account = Some(account);
    }
    Ok(())
}

/// Roll the payment rows up into `paid_amount` and `base_paid_amount`.
pub fn set_paid_amount(record: &mut Record, settings: &Settings) {
    let mut paid = Decimal::ZERO;
    let mut base_paid = Decimal::ZERO;
    for payment in &mut record.payments {
        payment.base_amount = settings.round_amount(payment.amount * record.conversion_rate);
        paid += payment.amount;
        base_paid += payment.base_amount;
    }
    record.paid_amount = paid;
    record.base_paid_amount = base_paid;
}

/// Status badge shown to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalIndicator {
    pub title: &'static str,
    pub color: &'static str,
}

/// Indicator from outstanding amount, due date and return flag.
pub fn portal_indicator(record: &Record, today: NaiveDate) -> PortalIndicator {
    let outstanding = record.outstanding_amount;
    let (title, color) = if outstanding < Decimal::ZERO {
        ("Credit Note Issued", "darkgrey")
    } else if outstanding > Decimal::ZERO {
        match record.due_date {
            Some(due) if due < today => ("Overdue", "red"),
            _ => ("Unpaid", "orange"),
        }
    } else if record.is_return {
        ("Return", "darkgrey")
    } else {
        ("Paid", "green")
    };
    PortalIndicator { title, color }
}
