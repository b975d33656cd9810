#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use invoice_records::core::billing::{Contribution, InvoiceBilling, JoinField, contributions_from, rules_for};
use invoice_records::core::*;
use invoice_records::reports::ReportSource;
use rust_decimal::Decimal;

pub const COMPANY: &str = "Acme";
pub const SUPPLIER: &str = "Supplier A";
pub const CUSTOMER: &str = "Customer A";
pub const CREDITORS: &str = "Creditors - AC";
pub const DEBTORS: &str = "Debtors - AC";
pub const TDS_ACCOUNT: &str = "TDS Payable - AC";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory host holding invoices, persisted records and master data.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub invoices: BTreeMap<(InvoiceKind, String), Invoice>,
    pub records: BTreeMap<String, Record>,
    pub company_currencies: BTreeMap<String, String>,
    pub party_accounts: BTreeMap<(String, String), String>,
    pub accounts: BTreeMap<String, AccountInfo>,
    pub write_off_accounts: BTreeMap<String, String>,
    pub cost_centers: BTreeMap<String, String>,
    pub projects: BTreeMap<String, Option<String>>,
    pub mode_of_payment_accounts: BTreeMap<String, String>,
    pub fiscal_years: Vec<FiscalYear>,
    pub whole_number_uoms: BTreeSet<String>,
    /// category -> (account, percent of net total)
    pub withholding: BTreeMap<String, (String, Decimal)>,
    pub approval_limit: Option<Decimal>,
    pub payment_entries: Vec<String>,
    /// When set, invoice lookups fail with this message.
    pub failure: Option<String>,
    pub billing_writes: usize,
}

impl MemoryHost {
    /// Company "Acme" in USD with one supplier, one customer and the 2024
    /// fiscal year.
    pub fn standard() -> Self {
        let mut host = Self::default();
        host.company_currencies.insert(COMPANY.into(), "USD".into());
        host.party_accounts
            .insert((SUPPLIER.into(), COMPANY.into()), CREDITORS.into());
        host.party_accounts
            .insert((CUSTOMER.into(), COMPANY.into()), DEBTORS.into());
        host.add_account(CREDITORS, AccountType::Payable, ReportType::BalanceSheet);
        host.add_account(DEBTORS, AccountType::Receivable, ReportType::BalanceSheet);
        host.add_account("Sales - AC", AccountType::Other, ReportType::ProfitAndLoss);
        host.add_account(TDS_ACCOUNT, AccountType::Tax, ReportType::BalanceSheet);
        host.write_off_accounts
            .insert(COMPANY.into(), "Write Off - AC".into());
        host.cost_centers.insert("Main - AC".into(), COMPANY.into());
        host.cost_centers.insert("Main - OT".into(), "Other Co".into());
        host.mode_of_payment_accounts
            .insert("Cash".into(), "Cash - AC".into());
        host.fiscal_years.push(FiscalYear {
            start: date(2024, 1, 1),
            end: date(2024, 12, 31),
        });
        host.whole_number_uoms.insert("Nos".into());
        host
    }

    pub fn add_account(&mut self, name: &str, account_type: AccountType, report_type: ReportType) {
        self.accounts.insert(
            name.into(),
            AccountInfo {
                name: name.into(),
                account_type,
                report_type,
                currency: "USD".into(),
            },
        );
    }

    /// Store an invoice, linking rows pushed after the builder ran.
    pub fn add_invoice(&mut self, mut invoice: Invoice) {
        for item in &mut invoice.items {
            item.parent = invoice.name.clone();
        }
        for tax in &mut invoice.taxes {
            tax.parent = invoice.name.clone();
        }
        self.invoices
            .insert((invoice.kind, invoice.name.clone()), invoice);
    }

    pub fn invoice_ref(&self, kind: InvoiceKind, name: &str) -> &Invoice {
        &self.invoices[&(kind, name.to_string())]
    }

    /// Persist a record the way the host does after a successful operation.
    pub fn store(&mut self, record: &Record) {
        self.records.insert(record.name.clone(), record.clone());
    }
}

/// Submitted purchase invoice of [`SUPPLIER`] with rows `(row, item, qty, rate)`.
pub fn purchase_invoice(name: &str, rows: &[(&str, &str, Decimal, Decimal)]) -> Invoice {
    invoice(name, InvoiceKind::PurchaseInvoice, SUPPLIER, rows)
}

/// Submitted sales invoice of [`CUSTOMER`] with rows `(row, item, qty, rate)`.
pub fn sales_invoice(name: &str, rows: &[(&str, &str, Decimal, Decimal)]) -> Invoice {
    invoice(name, InvoiceKind::SalesInvoice, CUSTOMER, rows)
}

fn invoice(name: &str, kind: InvoiceKind, party: &str, rows: &[(&str, &str, Decimal, Decimal)]) -> Invoice {
    let mut builder = InvoiceBuilder::new(name, kind, party, date(2024, 3, 1))
        .company(COMPANY)
        .currency("USD")
        .submitted();
    for (row, item, qty, rate) in rows {
        builder = builder.add_item(InvoiceItemBuilder::new(*row, *item, *qty, *rate).build());
    }
    builder.build()
}

impl InvoiceStore for MemoryHost {
    fn invoice(&self, kind: InvoiceKind, name: &str) -> Result<Option<Invoice>, LookupError> {
        if let Some(message) = &self.failure {
            return Err(LookupError::new("invoice", message.clone()));
        }
        Ok(self.invoices.get(&(kind, name.to_string())).cloned())
    }

    fn invoice_item(&self, kind: InvoiceKind, row: &str) -> Result<Option<InvoiceItem>, LookupError> {
        Ok(self
            .invoices
            .values()
            .filter(|inv| inv.kind == kind)
            .flat_map(|inv| inv.items.iter())
            .find(|item| item.name == row)
            .cloned())
    }

    fn invoice_tax(&self, kind: InvoiceKind, row: &str) -> Result<Option<TaxRow>, LookupError> {
        Ok(self
            .invoices
            .values()
            .filter(|inv| inv.kind == kind)
            .flat_map(|inv| inv.taxes.iter())
            .find(|tax| tax.name == row)
            .cloned())
    }

    fn billing_contributions(
        &self,
        kind: InvoiceKind,
        join: JoinField,
        rows: &[String],
    ) -> Result<Vec<Contribution>, LookupError> {
        let mut out = Vec::new();
        for record in self.records.values() {
            if record.side.invoice_kind() != kind {
                continue;
            }
            for rule in rules_for(record.side).iter().filter(|r| r.join == join) {
                out.extend(
                    contributions_from(rule, record)
                        .into_iter()
                        .filter(|c| rows.contains(&c.target_row)),
                );
            }
        }
        Ok(out)
    }

    fn invoice_with_bill_no(
        &self,
        bill_no: &str,
        supplier: &str,
        exclude: &[&str],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<String>, LookupError> {
        Ok(self
            .invoices
            .values()
            .find(|inv| {
                inv.kind == InvoiceKind::PurchaseInvoice
                    && inv.bill_no.as_deref() == Some(bill_no)
                    && inv.party == supplier
                    && inv.docstatus != DocStatus::Cancelled
                    && !exclude.contains(&inv.name.as_str())
                    && inv.posting_date >= from
                    && inv.posting_date <= to
            })
            .map(|inv| inv.name.clone()))
    }

    fn update_billing(&mut self, billing: &InvoiceBilling) -> Result<(), LookupError> {
        let invoice = self
            .invoices
            .get_mut(&(billing.kind, billing.invoice.clone()))
            .ok_or_else(|| LookupError::new("invoice", format!("{} not found", billing.invoice)))?;
        for (row, billed) in &billing.items {
            if let Some(item) = invoice.items.iter_mut().find(|i| &i.name == row) {
                item.billed_amt = *billed;
            }
        }
        for (row, billed) in &billing.taxes {
            if let Some(tax) = invoice.taxes.iter_mut().find(|t| &t.name == row) {
                tax.billed_amt = *billed;
            }
        }
        if let Some(per_billed) = billing.per_billed {
            invoice.per_billed = per_billed;
        }
        if let Some(status) = billing.billing_status {
            invoice.billing_status = status;
        }
        invoice.status = billing.status;
        self.billing_writes += 1;
        Ok(())
    }
}

impl PartyDirectory for MemoryHost {
    fn company_currency(&self, company: &str) -> Result<Option<String>, LookupError> {
        Ok(self.company_currencies.get(company).cloned())
    }

    fn party_account(
        &self,
        _party_type: PartyType,
        party: &str,
        company: &str,
    ) -> Result<Option<String>, LookupError> {
        Ok(self
            .party_accounts
            .get(&(party.to_string(), company.to_string()))
            .cloned())
    }

    fn account(&self, name: &str) -> Result<Option<AccountInfo>, LookupError> {
        Ok(self.accounts.get(name).cloned())
    }

    fn due_date(
        &self,
        posting_date: NaiveDate,
        _party_type: PartyType,
        _party: &str,
        _company: &str,
        bill_date: Option<NaiveDate>,
    ) -> Result<Option<NaiveDate>, LookupError> {
        Ok(bill_date
            .unwrap_or(posting_date)
            .checked_add_days(Days::new(30)))
    }

    fn company_write_off_account(&self, company: &str) -> Result<Option<String>, LookupError> {
        Ok(self.write_off_accounts.get(company).cloned())
    }

    fn cost_center_company(&self, cost_center: &str) -> Result<Option<String>, LookupError> {
        Ok(self.cost_centers.get(cost_center).cloned())
    }

    fn project_customer(&self, project: &str) -> Result<Option<Option<String>>, LookupError> {
        Ok(self.projects.get(project).cloned())
    }

    fn mode_of_payment_account(
        &self,
        mode_of_payment: &str,
        _company: &str,
    ) -> Result<Option<String>, LookupError> {
        Ok(self.mode_of_payment_accounts.get(mode_of_payment).cloned())
    }
}

impl FiscalYears for MemoryHost {
    fn fiscal_year(&self, date: NaiveDate, _company: &str) -> Result<Option<FiscalYear>, LookupError> {
        Ok(self
            .fiscal_years
            .iter()
            .copied()
            .find(|fy| fy.start <= date && date <= fy.end))
    }
}

impl UomDirectory for MemoryHost {
    fn must_be_whole_number(&self, uom: &str) -> Result<bool, LookupError> {
        Ok(self.whole_number_uoms.contains(uom))
    }
}

impl TaxWithholding for MemoryHost {
    fn withholding_details(&self, record: &Record, category: &str) -> Result<Option<TaxRow>, LookupError> {
        let Some((account, rate)) = self.withholding.get(category) else {
            return Ok(None);
        };
        let amount = (record.net_total * rate / Decimal::ONE_HUNDRED).round_dp(2);
        Ok(Some(
            TaxRowBuilder::new(account.clone(), ChargeType::Actual)
                .rate(*rate)
                .amount(amount)
                .deduct()
                .description(format!("TDS {category}"))
                .build(),
        ))
    }
}

impl ApprovingAuthority for MemoryHost {
    fn check(&self, _doctype: &str, _company: &str, amount: Decimal) -> Result<Approval, LookupError> {
        Ok(match self.approval_limit {
            Some(limit) if amount > limit => {
                Approval::Rejected(format!("Not authorized to approve {amount}; limit is {limit}"))
            }
            _ => Approval::Approved,
        })
    }
}

impl ReportSource for MemoryHost {
    fn submitted_invoices(
        &self,
        kind: InvoiceKind,
        company: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, LookupError> {
        if let Some(message) = &self.failure {
            return Err(LookupError::new("report", message.clone()));
        }
        Ok(self
            .invoices
            .values()
            .filter(|inv| {
                inv.kind == kind
                    && inv.docstatus == DocStatus::Submitted
                    && company.is_none_or(|c| inv.company == c)
                    && inv.posting_date >= from
                    && inv.posting_date <= to
            })
            .cloned()
            .collect())
    }

    fn payment_entry_names(&self) -> Result<Vec<String>, LookupError> {
        Ok(self.payment_entries.clone())
    }
}
