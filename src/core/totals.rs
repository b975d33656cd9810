use rust_decimal::Decimal;

use super::settings::Settings;
use super::types::{ChargeType, Record};

/// Recalculate tax amounts and header totals of a record (mutates in place).
///
/// Net total is the sum of item amounts. `OnNetTotal` tax rows are
/// recomputed from their rate, `Actual` rows keep their amount. Deducted
/// rows (e.g. withholding tax) reduce the grand total.
pub fn calculate_taxes_and_totals(record: &mut Record, settings: &Settings) {
    let net_total = settings.round_amount(record.items.iter().map(|i| i.amount).sum());

    for tax in &mut record.taxes {
        if tax.charge_type == ChargeType::OnNetTotal {
            tax.tax_amount = settings.round_amount(net_total * tax.rate / Decimal::ONE_HUNDRED);
        }
    }

    let total_taxes: Decimal = record.taxes.iter().map(|t| t.signed_amount()).sum();
    let grand_total = net_total + total_taxes;

    record.net_total = net_total;
    record.total_taxes_and_charges = total_taxes;
    record.grand_total = grand_total;
    record.base_grand_total = settings.round_amount(grand_total * record.conversion_rate);
    record.outstanding_amount = grand_total - record.write_off_amount;
}
