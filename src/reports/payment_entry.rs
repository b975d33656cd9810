use tracing::{debug, instrument};

use crate::core::RecordError;

use super::ReportSource;
use super::table::{Cell, Column, ColumnType, ReportTable};

/// Every payment entry by name, under a single "Title" column.
#[instrument(skip_all)]
pub fn single_payment_entry<S>(source: &S) -> Result<ReportTable, RecordError>
where
    S: ReportSource + ?Sized,
{
    let mut table = ReportTable::new(vec![Column::new(
        "Title",
        "title",
        ColumnType::Link,
        300,
    )]);
    table.rows = source
        .payment_entry_names()?
        .into_iter()
        .map(|name| vec![Cell::Text(name)])
        .collect();
    debug!(rows = table.rows.len(), "single payment entry report");
    Ok(table)
}
