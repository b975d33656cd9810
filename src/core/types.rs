use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::{BillingStatus, DocStatus, RecordStatus};

/// Which component family a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Purchase Invoice Record, reconciled against Purchase Invoices.
    Purchase,
    /// Sales Invoice Record, reconciled against Sales Invoices.
    Sales,
}

impl Side {
    /// Document type name of the record.
    pub fn record_doctype(&self) -> &'static str {
        match self {
            Self::Purchase => "Purchase Invoice Record",
            Self::Sales => "Sales Invoice Record",
        }
    }

    /// Kind of invoice the record reconciles against.
    pub fn invoice_kind(&self) -> InvoiceKind {
        match self {
            Self::Purchase => InvoiceKind::PurchaseInvoice,
            Self::Sales => InvoiceKind::SalesInvoice,
        }
    }

    pub fn party_type(&self) -> PartyType {
        match self {
            Self::Purchase => PartyType::Supplier,
            Self::Sales => PartyType::Customer,
        }
    }

    /// Label of the party account field ("Credit To" / "Debit To").
    pub fn party_account_label(&self) -> &'static str {
        match self {
            Self::Purchase => "Credit To",
            Self::Sales => "Debit To",
        }
    }

    /// Account type the party account must carry.
    pub fn party_account_type(&self) -> AccountType {
        match self {
            Self::Purchase => AccountType::Payable,
            Self::Sales => AccountType::Receivable,
        }
    }
}

/// Invoice document types a record can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InvoiceKind {
    PurchaseInvoice,
    SalesInvoice,
}

impl InvoiceKind {
    pub fn doctype(&self) -> &'static str {
        match self {
            Self::PurchaseInvoice => "Purchase Invoice",
            Self::SalesInvoice => "Sales Invoice",
        }
    }

    pub fn item_doctype(&self) -> &'static str {
        match self {
            Self::PurchaseInvoice => "Purchase Invoice Item",
            Self::SalesInvoice => "Sales Invoice Item",
        }
    }

    pub fn tax_doctype(&self) -> &'static str {
        match self {
            Self::PurchaseInvoice => "Purchase Taxes and Charges",
            Self::SalesInvoice => "Sales Taxes and Charges",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    Supplier,
    Customer,
}

impl PartyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supplier => "Supplier",
            Self::Customer => "Customer",
        }
    }
}

/// Ledger account classification relevant to party accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Payable,
    Receivable,
    Bank,
    Cash,
    Tax,
    Other,
}

/// Whether an account appears on the balance sheet or the P&L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    BalanceSheet,
    ProfitAndLoss,
}

/// Account metadata returned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub name: String,
    pub account_type: AccountType,
    pub report_type: ReportType,
    pub currency: String,
}

/// Fiscal year bounds (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Status field of an invoice header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Submitted,
    Unpaid,
    Overdue,
    Paid,
    Return,
    OnHold,
    Closed,
    Billed,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Unpaid => "Unpaid",
            Self::Overdue => "Overdue",
            Self::Paid => "Paid",
            Self::Return => "Return",
            Self::OnHold => "On Hold",
            Self::Closed => "Closed",
            Self::Billed => "Billed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// A Purchase Invoice or Sales Invoice owned by the host.
///
/// Only the fields the records read or reconcile are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub name: String,
    pub kind: InvoiceKind,
    /// Supplier or customer.
    pub party: String,
    /// Display name of the party, when it differs from the ID.
    pub party_name: Option<String>,
    pub company: String,
    pub currency: String,
    pub conversion_rate: Decimal,
    pub posting_date: NaiveDate,
    pub docstatus: DocStatus,
    pub status: InvoiceStatus,
    pub project: Option<String>,
    /// Supplier's bill number (purchase invoices).
    pub bill_no: Option<String>,
    pub grand_total: Decimal,
    pub outstanding_amount: Decimal,
    /// Percentage of the item total covered by submitted records.
    pub per_billed: Decimal,
    pub billing_status: BillingStatus,
    pub on_hold: bool,
    pub release_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
    pub taxes: Vec<TaxRow>,
}

impl Invoice {
    /// Sum of all item amounts (the reference total for `per_billed`).
    pub fn item_total(&self) -> Decimal {
        self.items.iter().map(|i| i.amount).sum()
    }

    pub fn item(&self, row: &str) -> Option<&InvoiceItem> {
        self.items.iter().find(|i| i.name == row)
    }
}

/// A line of an [`Invoice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Row ID, unique across all invoices of the same kind.
    pub name: String,
    /// Name of the owning invoice.
    pub parent: String,
    pub item_code: String,
    pub uom: String,
    pub conversion_factor: Decimal,
    pub project: Option<String>,
    pub qty: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    /// Sum of record amounts billed against this row.
    pub billed_amt: Decimal,
}

impl InvoiceItem {
    pub fn unbilled_amount(&self) -> Decimal {
        self.amount - self.billed_amt
    }
}

/// How a tax row's amount is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeType {
    /// Fixed `tax_amount`.
    Actual,
    /// `rate` percent of the net total.
    OnNetTotal,
}

/// Whether a tax row increases or reduces the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddDeduct {
    Add,
    Deduct,
}

/// Tax and charge row, used on invoices and on records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRow {
    /// Row ID; empty for rows not yet persisted.
    pub name: String,
    /// Name of the owning invoice (invoice rows only).
    #[serde(default)]
    pub parent: String,
    pub account_head: String,
    pub charge_type: ChargeType,
    pub add_deduct: AddDeduct,
    pub rate: Decimal,
    pub tax_amount: Decimal,
    pub description: String,
    /// Back-reference to an invoice tax row (records only).
    pub pt_detail: Option<String>,
    /// Sum of record tax amounts billed against this row (invoices only).
    pub billed_amt: Decimal,
}

impl TaxRow {
    /// Tax amount with the add/deduct sign applied.
    pub fn signed_amount(&self) -> Decimal {
        match self.add_deduct {
            AddDeduct::Add => self.tax_amount,
            AddDeduct::Deduct => -self.tax_amount,
        }
    }
}

/// A Purchase Invoice Record or Sales Invoice Record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub side: Side,
    /// True until the host has persisted the record once.
    pub is_new: bool,
    pub amended_from: Option<String>,
    pub docstatus: DocStatus,
    /// Presentation-only status, derived from `docstatus`.
    pub status: RecordStatus,

    pub party: String,
    pub company: String,
    pub currency: String,
    pub conversion_rate: Decimal,
    pub posting_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub project: Option<String>,
    pub is_return: bool,
    pub remarks: Option<String>,

    /// Credit To (purchase) or Debit To (sales).
    pub party_account: Option<String>,
    pub party_account_currency: Option<String>,

    /// Supplier's bill number and date (purchase).
    pub bill_no: Option<String>,
    pub bill_date: Option<NaiveDate>,

    /// Hold metadata (purchase); editable after submit.
    pub on_hold: bool,
    pub release_date: Option<NaiveDate>,
    pub hold_comment: Option<String>,

    /// Apply tax withholding (purchase).
    pub apply_tds: bool,
    pub tax_withholding_category: Option<String>,

    pub net_total: Decimal,
    pub total_taxes_and_charges: Decimal,
    pub grand_total: Decimal,
    pub base_grand_total: Decimal,
    pub outstanding_amount: Decimal,
    pub write_off_amount: Decimal,
    pub write_off_account: Option<String>,
    pub paid_amount: Decimal,
    pub base_paid_amount: Decimal,
    /// Paid on the spot from `cash_bank_account` (purchase).
    pub is_paid: bool,
    pub cash_bank_account: Option<String>,
    /// Cash handed back to the customer (sales).
    pub change_amount: Decimal,
    pub account_for_change_amount: Option<String>,

    pub items: Vec<RecordItem>,
    pub taxes: Vec<TaxRow>,
    /// Payment rows (sales).
    pub payments: Vec<PaymentRow>,
}

impl Record {
    /// Distinct invoices referenced by the items, in first-seen order.
    pub fn linked_invoices(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if let Some(inv) = item.invoice.as_deref() {
                if !seen.contains(&inv) {
                    seen.push(inv);
                }
            }
        }
        seen
    }
}

/// A line of a [`Record`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordItem {
    /// 1-based position in the record.
    pub idx: usize,
    pub item_code: String,
    pub uom: String,
    pub qty: Decimal,
    pub stock_uom: String,
    pub stock_qty: Decimal,
    pub conversion_factor: Decimal,
    pub project: Option<String>,
    pub cost_center: Option<String>,
    pub rate: Decimal,
    pub amount: Decimal,
    /// Referenced invoice (purchase_invoice / sales_invoice).
    pub invoice: Option<String>,
    /// Referenced invoice row (pi_detail / si_detail).
    pub invoice_detail: Option<String>,
    /// Purchase receipt the line was received through (purchase).
    pub purchase_receipt: Option<String>,
}

/// A payment row on a sales record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRow {
    pub mode_of_payment: String,
    pub account: Option<String>,
    pub amount: Decimal,
    pub base_amount: Decimal,
}
