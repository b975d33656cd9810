//! Billed-amount propagation from record rows to invoice rows.
//!
//! Each [`BillingRule`] says which record rows roll up into which invoice
//! rows. Propagation always recomputes the full aggregate from every
//! submitted record joined on the touched rows, never an incremental delta,
//! so repeating it is harmless and cancelling a record simply leaves its
//! rows out of the next aggregate.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::RecordError;
use super::services::InvoiceStore;
use super::settings::Settings;
use super::status::{BillingStatus, DocStatus};
use super::types::{Invoice, InvoiceKind, InvoiceStatus, Record, Side};

/// Record child table a rule reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTable {
    RecordItems,
    RecordTaxes,
}

/// Invoice child table a rule writes `billed_amt` into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetTable {
    InvoiceItems,
    InvoiceTaxes,
}

/// Back-reference field joining a record row to an invoice row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JoinField {
    /// `pi_detail` / `si_detail` on record items.
    InvoiceDetail,
    /// `pt_detail` on record tax rows.
    TaxDetail,
}

/// Amount column on either side of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountField {
    Amount,
    TaxAmount,
}

/// How billing beyond the reference amount is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowType {
    /// Allowed up to `Settings::over_billing_allowance` percent.
    Billing,
}

/// Roll-up of the target rows into the invoice header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentRollup {
    /// Invoice status applied once the invoice is fully billed.
    pub keyword: InvoiceStatus,
}

/// One status-updater rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRule {
    pub source: SourceTable,
    pub target: TargetTable,
    pub join: JoinField,
    /// Column summed on the record side.
    pub source_field: AmountField,
    /// Column on the invoice side that bounds `billed_amt`.
    pub target_ref_field: AmountField,
    /// Header `per_billed` and `billing_status` roll-up.
    pub percent: Option<PercentRollup>,
    pub overflow: Option<OverflowType>,
}

const ITEM_RULE: BillingRule = BillingRule {
    source: SourceTable::RecordItems,
    target: TargetTable::InvoiceItems,
    join: JoinField::InvoiceDetail,
    source_field: AmountField::Amount,
    target_ref_field: AmountField::Amount,
    percent: Some(PercentRollup {
        keyword: InvoiceStatus::Billed,
    }),
    overflow: Some(OverflowType::Billing),
};

const TAX_RULE: BillingRule = BillingRule {
    source: SourceTable::RecordTaxes,
    target: TargetTable::InvoiceTaxes,
    join: JoinField::TaxDetail,
    source_field: AmountField::TaxAmount,
    target_ref_field: AmountField::TaxAmount,
    percent: None,
    overflow: None,
};

/// Purchase records bill invoice items and invoice tax rows.
pub const PURCHASE_RULES: &[BillingRule] = &[ITEM_RULE, TAX_RULE];

/// Sales records bill invoice items only.
pub const SALES_RULES: &[BillingRule] = &[ITEM_RULE];

pub fn rules_for(side: Side) -> &'static [BillingRule] {
    match side {
        Side::Purchase => PURCHASE_RULES,
        Side::Sales => SALES_RULES,
    }
}

/// One record row's share of an invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Name of the contributing record.
    pub record: String,
    pub docstatus: DocStatus,
    pub join: JoinField,
    /// Invoice row the record row points at.
    pub target_row: String,
    pub amount: Decimal,
}

/// Contributions of `record` under `rule`, one per row with a back-reference.
pub fn contributions_from(rule: &BillingRule, record: &Record) -> Vec<Contribution> {
    let make = |target_row: &str, amount: Decimal| Contribution {
        record: record.name.clone(),
        docstatus: record.docstatus,
        join: rule.join,
        target_row: target_row.to_string(),
        amount,
    };

    match rule.source {
        SourceTable::RecordItems => record
            .items
            .iter()
            .filter_map(|i| {
                let row = i.invoice_detail.as_deref().filter(|r| !r.is_empty())?;
                let amount = match rule.source_field {
                    AmountField::Amount => i.amount,
                    AmountField::TaxAmount => Decimal::ZERO,
                };
                Some(make(row, amount))
            })
            .collect(),
        SourceTable::RecordTaxes => record
            .taxes
            .iter()
            .filter_map(|t| {
                let row = t.pt_detail.as_deref().filter(|r| !r.is_empty())?;
                let amount = match rule.source_field {
                    AmountField::TaxAmount => t.tax_amount,
                    AmountField::Amount => Decimal::ZERO,
                };
                Some(make(row, amount))
            })
            .collect(),
    }
}

/// An invoice row billed beyond its allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverLimit {
    pub row: String,
    pub item_code: String,
    pub billed: Decimal,
    /// Largest billed amount the allowance permits.
    pub limit: Decimal,
}

/// Recomputed billing state of one invoice, ready to be written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceBilling {
    pub kind: InvoiceKind,
    pub invoice: String,
    /// `(row, billed_amt)` for every recomputed item row.
    pub items: Vec<(String, Decimal)>,
    /// `(row, billed_amt)` for every recomputed tax row.
    pub taxes: Vec<(String, Decimal)>,
    pub per_billed: Option<Decimal>,
    pub billing_status: Option<BillingStatus>,
    pub status: InvoiceStatus,
    pub over_limit: Vec<OverLimit>,
}

/// Sum the submitted contributions per `(join, target_row)`.
pub fn billed_per_row(contributions: &[Contribution]) -> BTreeMap<(JoinField, String), Decimal> {
    let mut sums = BTreeMap::new();
    for c in contributions {
        let entry = sums
            .entry((c.join, c.target_row.clone()))
            .or_insert(Decimal::ZERO);
        if c.docstatus == DocStatus::Submitted {
            *entry += c.amount;
        }
    }
    sums
}

/// Apply `rules` to `invoice` given every contribution joined on its rows.
///
/// Rows that no contribution mentions keep their current `billed_amt`;
/// rows mentioned only by draft or cancelled records drop to zero.
pub fn reconcile(
    rules: &[BillingRule],
    invoice: &mut Invoice,
    contributions: &[Contribution],
    settings: &Settings,
) -> InvoiceBilling {
    let sums = billed_per_row(contributions);
    let mut billing = InvoiceBilling {
        kind: invoice.kind,
        invoice: invoice.name.clone(),
        items: Vec::new(),
        taxes: Vec::new(),
        per_billed: None,
        billing_status: None,
        status: invoice.status,
        over_limit: Vec::new(),
    };

    for rule in rules {
        match rule.target {
            TargetTable::InvoiceItems => {
                for item in &mut invoice.items {
                    if let Some(billed) = sums.get(&(rule.join, item.name.clone())) {
                        item.billed_amt = *billed;
                        billing.items.push((item.name.clone(), *billed));
                    }
                }
            }
            TargetTable::InvoiceTaxes => {
                for tax in &mut invoice.taxes {
                    if let Some(billed) = sums.get(&(rule.join, tax.name.clone())) {
                        tax.billed_amt = *billed;
                        billing.taxes.push((tax.name.clone(), *billed));
                    }
                }
            }
        }

        if rule.overflow == Some(OverflowType::Billing) {
            billing
                .over_limit
                .extend(over_limit_rows(invoice, &billing.items, settings));
        }

        if let Some(rollup) = rule.percent {
            let (per_billed, status) = rollup_status(invoice, settings, !billing.over_limit.is_empty());
            invoice.per_billed = per_billed;
            invoice.billing_status = status;
            if status == BillingStatus::FullyBilled {
                invoice.status = rollup.keyword;
            } else if invoice.status == rollup.keyword {
                invoice.status = InvoiceStatus::Submitted;
            }
            billing.per_billed = Some(per_billed);
            billing.billing_status = Some(status);
            billing.status = invoice.status;
        }
    }

    debug!(
        invoice = %invoice.name,
        items = billing.items.len(),
        taxes = billing.taxes.len(),
        per_billed = ?billing.per_billed,
        "recomputed billed amounts"
    );
    billing
}

/// Over-limit rows among the recomputed `rows`; other rows are not checked.
fn over_limit_rows(
    invoice: &Invoice,
    rows: &[(String, Decimal)],
    settings: &Settings,
) -> Vec<OverLimit> {
    let allowance = settings.over_billing_allowance / Decimal::ONE_HUNDRED;
    let tolerance = settings.amount_tolerance();
    invoice
        .items
        .iter()
        .filter(|item| rows.iter().any(|(row, _)| *row == item.name))
        .filter_map(|item| {
            let limit = item.amount.abs() * (Decimal::ONE + allowance);
            (item.billed_amt.abs() > limit + tolerance).then(|| OverLimit {
                row: item.name.clone(),
                item_code: item.item_code.clone(),
                billed: item.billed_amt,
                limit,
            })
        })
        .collect()
}

fn rollup_status(
    invoice: &Invoice,
    settings: &Settings,
    over_limit: bool,
) -> (Decimal, BillingStatus) {
    let total = invoice.item_total();
    let billed: Decimal = invoice.items.iter().map(|i| i.billed_amt).sum();
    let per_billed = if total.is_zero() {
        Decimal::ZERO
    } else {
        (billed / total * Decimal::ONE_HUNDRED).round_dp(6)
    };

    let tolerance = settings.amount_tolerance();
    let status = if over_limit {
        BillingStatus::Overbilled
    } else if billed.abs() <= tolerance {
        BillingStatus::NotBilled
    } else if billed.abs() + tolerance >= total.abs() {
        BillingStatus::FullyBilled
    } else {
        BillingStatus::PartlyBilled
    };
    (per_billed, status)
}

/// Recompute the billing of every invoice `record` references, without
/// writing anything.
///
/// Invoices are found through item links and through the parents of
/// back-referenced tax rows, so a tax row may bill an invoice no item links.
///
/// The host's aggregate is used for every other record; `record` itself
/// contributes according to its own current docstatus, so the plan is the
/// same whether or not the host has already stored the new docstatus.
pub fn plan_billing<H>(
    record: &Record,
    host: &H,
    settings: &Settings,
) -> Result<Vec<InvoiceBilling>, RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let rules = rules_for(record.side);
    let kind = record.side.invoice_kind();

    let mut contributions = Vec::new();
    for rule in rules {
        let own = contributions_from(rule, record);
        if own.is_empty() {
            continue;
        }
        let rows: Vec<String> = own
            .iter()
            .map(|c| c.target_row.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        contributions.extend(
            host.billing_contributions(kind, rule.join, &rows)?
                .into_iter()
                .filter(|c| c.record != record.name),
        );
        contributions.extend(own);
    }

    let mut invoices: Vec<String> = record
        .linked_invoices()
        .into_iter()
        .map(String::from)
        .collect();
    for item in &record.items {
        if item.invoice.is_some() {
            continue;
        }
        if let Some(row) = item.invoice_detail.as_deref() {
            if let Some(parent) = host.invoice_item(kind, row)?.map(|r| r.parent) {
                if !invoices.contains(&parent) {
                    invoices.push(parent);
                }
            }
        }
    }

    if rules.iter().any(|r| r.join == JoinField::TaxDetail) {
        for (i, tax) in record.taxes.iter().enumerate() {
            let Some(row) = tax.pt_detail.as_deref().filter(|r| !r.is_empty()) else {
                continue;
            };
            let parent = host
                .invoice_tax(kind, row)?
                .map(|t| t.parent)
                .filter(|p| !p.is_empty());
            let Some(parent) = parent else {
                return Err(RecordError::invalid_row(
                    i + 1,
                    format!("taxes[{}]", i + 1),
                    format!("Invalid reference {} {row}", kind.tax_doctype()),
                ));
            };
            if !invoices.contains(&parent) {
                invoices.push(parent);
            }
        }
    }

    let mut plans = Vec::with_capacity(invoices.len());
    for name in invoices {
        let Some(mut invoice) = host.invoice(kind, &name)? else {
            return Err(RecordError::invalid(
                "items",
                format!("invalid reference {} {name}", kind.doctype()),
            ));
        };
        plans.push(reconcile(rules, &mut invoice, &contributions, settings));
    }

    Ok(plans)
}

/// Write planned billing back through the host.
pub fn commit_billing<H>(host: &mut H, plans: &[InvoiceBilling]) -> Result<(), RecordError>
where
    H: InvoiceStore + ?Sized,
{
    for plan in plans {
        host.update_billing(plan)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::InvoiceItem;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice(items: &[(&str, Decimal)]) -> Invoice {
        Invoice {
            name: "PINV-0001".into(),
            kind: InvoiceKind::PurchaseInvoice,
            party: "Supplier A".into(),
            party_name: None,
            company: "Acme".into(),
            currency: "USD".into(),
            conversion_rate: Decimal::ONE,
            posting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            docstatus: DocStatus::Submitted,
            status: InvoiceStatus::Unpaid,
            project: None,
            bill_no: None,
            grand_total: items.iter().map(|(_, a)| *a).sum(),
            outstanding_amount: Decimal::ZERO,
            per_billed: Decimal::ZERO,
            billing_status: BillingStatus::NotBilled,
            on_hold: false,
            release_date: None,
            items: items
                .iter()
                .map(|(row, amount)| InvoiceItem {
                    name: (*row).into(),
                    parent: "PINV-0001".into(),
                    item_code: format!("ITEM-{row}"),
                    uom: "Nos".into(),
                    conversion_factor: Decimal::ONE,
                    project: None,
                    qty: Decimal::ONE,
                    rate: *amount,
                    amount: *amount,
                    billed_amt: Decimal::ZERO,
                })
                .collect(),
            taxes: Vec::new(),
        }
    }

    fn contribution(record: &str, docstatus: DocStatus, row: &str, amount: Decimal) -> Contribution {
        Contribution {
            record: record.into(),
            docstatus,
            join: JoinField::InvoiceDetail,
            target_row: row.into(),
            amount,
        }
    }

    #[test]
    fn two_rows_on_one_item_partly_bill() {
        let mut inv = invoice(&[("A", dec!(200))]);
        let contributions = [
            contribution("REC-1", DocStatus::Submitted, "A", dec!(100)),
            contribution("REC-1", DocStatus::Submitted, "A", dec!(50)),
        ];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &contributions, &Settings::default());
        assert_eq!(inv.items[0].billed_amt, dec!(150));
        assert_eq!(billing.per_billed, Some(dec!(75)));
        assert_eq!(billing.billing_status, Some(BillingStatus::PartlyBilled));
        assert_eq!(inv.status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn drafts_and_cancelled_rows_do_not_count() {
        let mut inv = invoice(&[("A", dec!(100))]);
        inv.items[0].billed_amt = dec!(80);
        let contributions = [
            contribution("REC-1", DocStatus::Cancelled, "A", dec!(80)),
            contribution("REC-2", DocStatus::Draft, "A", dec!(20)),
        ];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &contributions, &Settings::default());
        assert_eq!(inv.items[0].billed_amt, Decimal::ZERO);
        assert_eq!(billing.billing_status, Some(BillingStatus::NotBilled));
    }

    #[test]
    fn fully_billed_sets_keyword_and_reverts() {
        let mut inv = invoice(&[("A", dec!(100)), ("B", dec!(50))]);
        let mut contributions = vec![
            contribution("REC-1", DocStatus::Submitted, "A", dec!(100)),
            contribution("REC-1", DocStatus::Submitted, "B", dec!(49.999)),
        ];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &contributions, &Settings::default());
        assert_eq!(billing.billing_status, Some(BillingStatus::FullyBilled));
        assert_eq!(inv.status, InvoiceStatus::Billed);

        contributions[1].docstatus = DocStatus::Cancelled;
        let billing = reconcile(PURCHASE_RULES, &mut inv, &contributions, &Settings::default());
        assert_eq!(billing.billing_status, Some(BillingStatus::PartlyBilled));
        assert_eq!(inv.status, InvoiceStatus::Submitted);
    }

    #[test]
    fn over_billing_within_allowance() {
        let settings = Settings {
            over_billing_allowance: dec!(10),
            ..Settings::default()
        };
        let mut inv = invoice(&[("A", dec!(100))]);
        let within = [contribution("REC-1", DocStatus::Submitted, "A", dec!(110))];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &within, &settings);
        assert!(billing.over_limit.is_empty());
        assert_eq!(billing.per_billed, Some(dec!(110)));
        assert_eq!(billing.billing_status, Some(BillingStatus::FullyBilled));

        let beyond = [contribution("REC-1", DocStatus::Submitted, "A", dec!(110.01))];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &beyond, &settings);
        assert_eq!(billing.over_limit.len(), 1);
        assert_eq!(billing.over_limit[0].limit, dec!(110.0));
        assert_eq!(billing.billing_status, Some(BillingStatus::Overbilled));
    }

    #[test]
    fn stale_over_billing_elsewhere_does_not_block() {
        let mut inv = invoice(&[("A", dec!(100)), ("B", dec!(100))]);
        inv.items[1].billed_amt = dec!(150);
        let contributions = [contribution("REC-2", DocStatus::Submitted, "A", dec!(50))];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &contributions, &Settings::default());
        assert!(billing.over_limit.is_empty());
        assert_eq!(inv.items[1].billed_amt, dec!(150));
        assert_eq!(billing.billing_status, Some(BillingStatus::FullyBilled));

        let contributions = [contribution("REC-3", DocStatus::Submitted, "B", dec!(150))];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &contributions, &Settings::default());
        assert_eq!(billing.over_limit.len(), 1);
        assert_eq!(billing.over_limit[0].row, "B");
    }

    #[test]
    fn untouched_rows_keep_their_billed_amount() {
        let mut inv = invoice(&[("A", dec!(100)), ("B", dec!(100))]);
        inv.items[1].billed_amt = dec!(40);
        let contributions = [contribution("REC-1", DocStatus::Submitted, "A", dec!(60))];
        let billing = reconcile(PURCHASE_RULES, &mut inv, &contributions, &Settings::default());
        assert_eq!(billing.items, vec![("A".to_string(), dec!(60))]);
        assert_eq!(inv.items[1].billed_amt, dec!(40));
        assert_eq!(billing.per_billed, Some(dec!(50)));
    }

    #[test]
    fn sales_rules_ignore_tax_rows() {
        assert_eq!(SALES_RULES.len(), 1);
        assert_eq!(rules_for(Side::Purchase).len(), 2);
        assert!(SALES_RULES.iter().all(|r| r.join == JoinField::InvoiceDetail));
    }
}
