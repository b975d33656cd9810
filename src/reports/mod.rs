//! Read-only reports over submitted invoices and payment entries.
//!
//! Reports never mutate anything. Malformed filters fall back to defaults;
//! failures of the [`ReportSource`] are propagated unchanged.

mod filters;
mod invoice_details;
mod payment_entry;
mod table;

use chrono::NaiveDate;

use crate::core::{Invoice, InvoiceKind, LookupError};

pub use filters::InvoiceDetailsFilters;
pub use invoice_details::invoice_details;
pub use payment_entry::single_payment_entry;
pub use table::{Cell, Column, ColumnType, ReportTable};

/// Read queries the reports run against the host.
pub trait ReportSource {
    /// Submitted invoices of `kind` posted between `from` and `to`
    /// (inclusive), optionally restricted to one company.
    fn submitted_invoices(
        &self,
        kind: InvoiceKind,
        company: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, LookupError>;

    fn payment_entry_names(&self) -> Result<Vec<String>, LookupError>;
}
