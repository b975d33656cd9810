//! Host services consumed by the records.
//!
//! The records never persist anything themselves: documents, accounts,
//! fiscal years and tax rules live in the host application, which exposes
//! them through these traits. The only write is [`InvoiceStore::update_billing`].

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::billing::{Contribution, InvoiceBilling, JoinField};
use super::error::LookupError;
use super::types::{
    AccountInfo, FiscalYear, Invoice, InvoiceItem, InvoiceKind, PartyType, Record, TaxRow,
};

/// Read access to invoices plus the billed-amount write-back.
pub trait InvoiceStore {
    fn invoice(&self, kind: InvoiceKind, name: &str) -> Result<Option<Invoice>, LookupError>;

    /// Look up an invoice item row by its row ID.
    fn invoice_item(&self, kind: InvoiceKind, row: &str)
    -> Result<Option<InvoiceItem>, LookupError>;

    /// Look up an invoice tax row by its row ID, with `parent` filled in.
    fn invoice_tax(&self, kind: InvoiceKind, row: &str) -> Result<Option<TaxRow>, LookupError>;

    /// Every record row (any docstatus) joined on one of `rows`.
    fn billing_contributions(
        &self,
        kind: InvoiceKind,
        join: JoinField,
        rows: &[String],
    ) -> Result<Vec<Contribution>, LookupError>;

    /// A non-cancelled purchase invoice of `supplier` carrying `bill_no`,
    /// posted between `from` and `to`, other than those in `exclude`.
    fn invoice_with_bill_no(
        &self,
        bill_no: &str,
        supplier: &str,
        exclude: &[&str],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<String>, LookupError>;

    /// Persist recomputed billed amounts and the billing roll-up.
    fn update_billing(&mut self, billing: &InvoiceBilling) -> Result<(), LookupError>;
}

/// Party, account, company and project metadata.
pub trait PartyDirectory {
    /// Base currency of `company`, if configured.
    fn company_currency(&self, company: &str) -> Result<Option<String>, LookupError>;

    /// Default payable/receivable account for the party.
    fn party_account(
        &self,
        party_type: PartyType,
        party: &str,
        company: &str,
    ) -> Result<Option<String>, LookupError>;

    fn account(&self, name: &str) -> Result<Option<AccountInfo>, LookupError>;

    /// Due date from the party's payment terms.
    fn due_date(
        &self,
        posting_date: NaiveDate,
        party_type: PartyType,
        party: &str,
        company: &str,
        bill_date: Option<NaiveDate>,
    ) -> Result<Option<NaiveDate>, LookupError>;

    fn company_write_off_account(&self, company: &str) -> Result<Option<String>, LookupError>;

    /// Company owning a cost center, if the cost center exists.
    fn cost_center_company(&self, cost_center: &str) -> Result<Option<String>, LookupError>;

    /// `None` if the project does not exist, `Some(None)` if it belongs to no
    /// customer, `Some(Some(c))` if it belongs to customer `c`.
    fn project_customer(&self, project: &str) -> Result<Option<Option<String>>, LookupError>;

    /// Default account for a mode of payment within `company`.
    fn mode_of_payment_account(
        &self,
        mode_of_payment: &str,
        company: &str,
    ) -> Result<Option<String>, LookupError>;
}

pub trait FiscalYears {
    fn fiscal_year(&self, date: NaiveDate, company: &str)
    -> Result<Option<FiscalYear>, LookupError>;
}

pub trait UomDirectory {
    /// Whether quantities in `uom` must be whole numbers.
    fn must_be_whole_number(&self, uom: &str) -> Result<bool, LookupError>;
}

pub trait TaxWithholding {
    /// Withholding tax row for the record's party under `category`, with
    /// `tax_amount` already computed. `None` when the category does not apply.
    fn withholding_details(
        &self,
        record: &Record,
        category: &str,
    ) -> Result<Option<TaxRow>, LookupError>;
}

/// Outcome of an approving-authority check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    Approved,
    Rejected(String),
}

pub trait ApprovingAuthority {
    fn check(&self, doctype: &str, company: &str, amount: Decimal)
    -> Result<Approval, LookupError>;
}

/// Everything a record controller needs from its host.
pub trait Host:
    InvoiceStore + PartyDirectory + FiscalYears + UomDirectory + TaxWithholding + ApprovingAuthority
{
}

impl<T> Host for T where
    T: InvoiceStore
        + PartyDirectory
        + FiscalYears
        + UomDirectory
        + TaxWithholding
        + ApprovingAuthority
{
}
