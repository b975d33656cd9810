use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::RecordError;
use super::settings::Settings;
use super::status::{BillingStatus, DocStatus, RecordStatus};
use super::totals;
use super::types::*;

/// Builder for constructing records.
///
/// ```
/// use invoice_records::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let record = RecordBuilder::new("PIR-0001", Side::Purchase, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
///     .party("Supplier A")
///     .company("Acme")
///     .currency("USD")
///     .add_item(RecordItemBuilder::new("WIDGET", dec!(2), dec!(50))
///         .against("PINV-0001", "PINV-0001-1")
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(record.net_total, dec!(100));
/// assert_eq!(record.linked_invoices(), vec!["PINV-0001"]);
/// ```
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>, side: Side, posting_date: NaiveDate) -> Self {
        Self {
            record: Record {
                name: name.into(),
                side,
                is_new: true,
                amended_from: None,
                docstatus: DocStatus::Draft,
                status: RecordStatus::Draft,
                party: String::new(),
                company: String::new(),
                currency: String::new(),
                conversion_rate: Decimal::ONE,
                posting_date,
                due_date: None,
                project: None,
                is_return: false,
                remarks: None,
                party_account: None,
                party_account_currency: None,
                bill_no: None,
                bill_date: None,
                on_hold: false,
                release_date: None,
                hold_comment: None,
                apply_tds: false,
                tax_withholding_category: None,
                net_total: Decimal::ZERO,
                total_taxes_and_charges: Decimal::ZERO,
                grand_total: Decimal::ZERO,
                base_grand_total: Decimal::ZERO,
                outstanding_amount: Decimal::ZERO,
                write_off_amount: Decimal::ZERO,
                write_off_account: None,
                paid_amount: Decimal::ZERO,
                base_paid_amount: Decimal::ZERO,
                is_paid: false,
                cash_bank_account: None,
                change_amount: Decimal::ZERO,
                account_for_change_amount: None,
                items: Vec::new(),
                taxes: Vec::new(),
                payments: Vec::new(),
            },
        }
    }

    pub fn party(mut self, party: impl Into<String>) -> Self {
        self.record.party = party.into();
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.record.company = company.into();
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.record.currency = code.into();
        self
    }

    pub fn conversion_rate(mut self, rate: Decimal) -> Self {
        self.record.conversion_rate = rate;
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.record.due_date = Some(date);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.record.project = Some(project.into());
        self
    }

    pub fn is_return(mut self, is_return: bool) -> Self {
        self.record.is_return = is_return;
        self
    }

    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.record.remarks = Some(remarks.into());
        self
    }

    /// Credit To (purchase) or Debit To (sales).
    pub fn party_account(mut self, account: impl Into<String>) -> Self {
        self.record.party_account = Some(account.into());
        self
    }

    pub fn bill(mut self, bill_no: impl Into<String>, bill_date: NaiveDate) -> Self {
        self.record.bill_no = Some(bill_no.into());
        self.record.bill_date = Some(bill_date);
        self
    }

    pub fn on_hold(mut self, release_date: Option<NaiveDate>) -> Self {
        self.record.on_hold = true;
        self.record.release_date = release_date;
        self
    }

    pub fn tax_withholding(mut self, category: impl Into<String>) -> Self {
        self.record.apply_tds = true;
        self.record.tax_withholding_category = Some(category.into());
        self
    }

    pub fn write_off(mut self, amount: Decimal, account: Option<&str>) -> Self {
        self.record.write_off_amount = amount;
        self.record.write_off_account = account.map(String::from);
        self
    }

    /// Mark the record as paid on the spot from a cash or bank account.
    pub fn paid(mut self, amount: Decimal, account: Option<&str>) -> Self {
        self.record.is_paid = true;
        self.record.paid_amount = amount;
        self.record.cash_bank_account = account.map(String::from);
        self
    }

    pub fn change_amount(mut self, amount: Decimal, account: Option<&str>) -> Self {
        self.record.change_amount = amount;
        self.record.account_for_change_amount = account.map(String::from);
        self
    }

    pub fn amended_from(mut self, name: impl Into<String>) -> Self {
        self.record.amended_from = Some(name.into());
        self
    }

    pub fn add_item(mut self, item: RecordItem) -> Self {
        self.record.items.push(item);
        self
    }

    pub fn add_tax(mut self, tax: TaxRow) -> Self {
        self.record.taxes.push(tax);
        self
    }

    pub fn add_payment(mut self, mode_of_payment: impl Into<String>, amount: Decimal) -> Self {
        self.record.payments.push(PaymentRow {
            mode_of_payment: mode_of_payment.into(),
            account: None,
            amount,
            base_amount: Decimal::ZERO,
        });
        self
    }

    /// Build the record, numbering its items and calculating totals.
    pub fn build(self) -> Result<Record, RecordError> {
        let mut record = self.record;

        if record.name.is_empty() {
            return Err(RecordError::invalid("name", "record name is required"));
        }
        if record.items.len() > 10_000 {
            return Err(RecordError::invalid(
                "items",
                "record cannot have more than 10,000 items",
            ));
        }

        for (i, item) in record.items.iter_mut().enumerate() {
            item.idx = i + 1;
        }
        totals::calculate_taxes_and_totals(&mut record, &Settings::default());
        Ok(record)
    }
}

/// Builder for RecordItem.
pub struct RecordItemBuilder {
    item: RecordItem,
}

impl RecordItemBuilder {
    /// Item billing `qty` at `rate`; the amount is `qty * rate`.
    pub fn new(item_code: impl Into<String>, qty: Decimal, rate: Decimal) -> Self {
        Self {
            item: RecordItem {
                idx: 0,
                item_code: item_code.into(),
                uom: "Nos".to_string(),
                qty,
                stock_uom: "Nos".to_string(),
                stock_qty: qty,
                conversion_factor: Decimal::ONE,
                project: None,
                cost_center: None,
                rate,
                amount: qty * rate,
                invoice: None,
                invoice_detail: None,
                purchase_receipt: None,
            },
        }
    }

    /// Reference an invoice and one of its rows.
    pub fn against(mut self, invoice: impl Into<String>, row: impl Into<String>) -> Self {
        self.item.invoice = Some(invoice.into());
        self.item.invoice_detail = Some(row.into());
        self
    }

    /// Reference an invoice row without naming its invoice.
    pub fn detail(mut self, row: impl Into<String>) -> Self {
        self.item.invoice_detail = Some(row.into());
        self
    }

    pub fn uom(mut self, uom: impl Into<String>) -> Self {
        self.item.uom = uom.into();
        self
    }

    /// Stock unit and factor; `stock_qty` becomes `qty * factor`.
    pub fn stock_uom(mut self, uom: impl Into<String>, conversion_factor: Decimal) -> Self {
        self.item.stock_uom = uom.into();
        self.item.conversion_factor = conversion_factor;
        self.item.stock_qty = self.item.qty * conversion_factor;
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.item.project = Some(project.into());
        self
    }

    pub fn cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.item.cost_center = Some(cost_center.into());
        self
    }

    pub fn purchase_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.item.purchase_receipt = Some(receipt.into());
        self
    }

    /// Override the computed amount.
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.item.amount = amount;
        self
    }

    pub fn build(self) -> RecordItem {
        self.item
    }
}

/// Builder for TaxRow.
pub struct TaxRowBuilder {
    row: TaxRow,
}

impl TaxRowBuilder {
    pub fn new(account_head: impl Into<String>, charge_type: ChargeType) -> Self {
        let account_head = account_head.into();
        Self {
            row: TaxRow {
                name: String::new(),
                parent: String::new(),
                description: account_head.clone(),
                account_head,
                charge_type,
                add_deduct: AddDeduct::Add,
                rate: Decimal::ZERO,
                tax_amount: Decimal::ZERO,
                pt_detail: None,
                billed_amt: Decimal::ZERO,
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.row.name = name.into();
        self
    }

    pub fn rate(mut self, rate: Decimal) -> Self {
        self.row.rate = rate;
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.row.tax_amount = amount;
        self
    }

    pub fn deduct(mut self) -> Self {
        self.row.add_deduct = AddDeduct::Deduct;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.row.description = description.into();
        self
    }

    /// Back-reference to an invoice tax row.
    pub fn against(mut self, row: impl Into<String>) -> Self {
        self.row.pt_detail = Some(row.into());
        self
    }

    pub fn build(self) -> TaxRow {
        self.row
    }
}

/// Builder for the invoices a host owns; mostly useful in tests and hosts.
pub struct InvoiceBuilder {
    invoice: Invoice,
}

impl InvoiceBuilder {
    pub fn new(
        name: impl Into<String>,
        kind: InvoiceKind,
        party: impl Into<String>,
        posting_date: NaiveDate,
    ) -> Self {
        Self {
            invoice: Invoice {
                name: name.into(),
                kind,
                party: party.into(),
                party_name: None,
                company: String::new(),
                currency: String::new(),
                conversion_rate: Decimal::ONE,
                posting_date,
                docstatus: DocStatus::Draft,
                status: InvoiceStatus::Draft,
                project: None,
                bill_no: None,
                grand_total: Decimal::ZERO,
                outstanding_amount: Decimal::ZERO,
                per_billed: Decimal::ZERO,
                billing_status: BillingStatus::NotBilled,
                on_hold: false,
                release_date: None,
                items: Vec::new(),
                taxes: Vec::new(),
            },
        }
    }

    pub fn party_name(mut self, name: impl Into<String>) -> Self {
        self.invoice.party_name = Some(name.into());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.invoice.company = company.into();
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.invoice.currency = code.into();
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.invoice.project = Some(project.into());
        self
    }

    pub fn bill_no(mut self, bill_no: impl Into<String>) -> Self {
        self.invoice.bill_no = Some(bill_no.into());
        self
    }

    /// Docstatus Submitted, status Unpaid.
    pub fn submitted(mut self) -> Self {
        self.invoice.docstatus = DocStatus::Submitted;
        self.invoice.status = InvoiceStatus::Unpaid;
        self
    }

    pub fn docstatus(mut self, docstatus: DocStatus) -> Self {
        self.invoice.docstatus = docstatus;
        self
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.invoice.status = status;
        self
    }

    pub fn on_hold(mut self, release_date: Option<NaiveDate>) -> Self {
        self.invoice.on_hold = true;
        self.invoice.release_date = release_date;
        self
    }

    pub fn add_item(mut self, mut item: InvoiceItem) -> Self {
        item.parent = self.invoice.name.clone();
        self.invoice.items.push(item);
        self
    }

    pub fn add_tax(mut self, mut tax: TaxRow) -> Self {
        tax.parent = self.invoice.name.clone();
        self.invoice.taxes.push(tax);
        self
    }

    /// Build the invoice; grand total and outstanding amount are the item
    /// total plus taxes.
    pub fn build(self) -> Invoice {
        let mut invoice = self.invoice;
        let taxes: Decimal = invoice.taxes.iter().map(TaxRow::signed_amount).sum();
        invoice.grand_total = invoice.item_total() + taxes;
        invoice.outstanding_amount = invoice.grand_total;
        invoice
    }
}

/// Builder for InvoiceItem.
pub struct InvoiceItemBuilder {
    item: InvoiceItem,
}

impl InvoiceItemBuilder {
    pub fn new(row: impl Into<String>, item_code: impl Into<String>, qty: Decimal, rate: Decimal) -> Self {
        Self {
            item: InvoiceItem {
                name: row.into(),
                parent: String::new(),
                item_code: item_code.into(),
                uom: "Nos".to_string(),
                conversion_factor: Decimal::ONE,
                project: None,
                qty,
                rate,
                amount: qty * rate,
                billed_amt: Decimal::ZERO,
            },
        }
    }

    pub fn uom(mut self, uom: impl Into<String>) -> Self {
        self.item.uom = uom.into();
        self
    }

    pub fn conversion_factor(mut self, factor: Decimal) -> Self {
        self.item.conversion_factor = factor;
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.item.project = Some(project.into());
        self
    }

    pub fn billed(mut self, amount: Decimal) -> Self {
        self.item.billed_amt = amount;
        self
    }

    pub fn build(self) -> InvoiceItem {
        self.item
    }
}
