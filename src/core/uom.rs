//! Whole-number unit-of-measure check.

use rust_decimal::Decimal;

use super::error::RecordError;
use super::services::UomDirectory;
use super::types::{Record, RecordItem};

/// Which quantity column of a record item to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QtyField {
    /// `uom` / `qty`
    Qty,
    /// `stock_uom` / `stock_qty`
    StockQty,
}

impl QtyField {
    fn uom_of<'a>(&self, item: &'a RecordItem) -> &'a str {
        match self {
            Self::Qty => &item.uom,
            Self::StockQty => &item.stock_uom,
        }
    }

    fn qty_of(&self, item: &RecordItem) -> Decimal {
        match self {
            Self::Qty => item.qty,
            Self::StockQty => item.stock_qty,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Qty => "qty",
            Self::StockQty => "stock_qty",
        }
    }
}

/// Reject fractional quantities in units marked "must be whole number".
pub fn validate_uom_is_integer<H>(
    record: &Record,
    field: QtyField,
    host: &H,
) -> Result<(), RecordError>
where
    H: UomDirectory + ?Sized,
{
    for item in &record.items {
        let uom = field.uom_of(item);
        if uom.is_empty() {
            continue;
        }
        let qty = field.qty_of(item);
        if qty.fract().is_zero() {
            continue;
        }
        if host.must_be_whole_number(uom)? {
            return Err(RecordError::invalid_row(
                item.idx,
                format!("items[{}].{}", item.idx, field.name()),
                format!(
                    "Quantity ({}) cannot be a fraction. To allow this, disable 'Must be Whole Number' in UOM {}.",
                    qty.normalize(),
                    uom
                ),
            ));
        }
    }
    Ok(())
}
