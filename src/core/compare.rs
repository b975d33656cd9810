//! Cross-document consistency between a record and the invoices it references.

use std::collections::BTreeMap;

use super::error::RecordError;
use super::services::InvoiceStore;
use super::settings::Settings;
use super::status::DocStatus;
use super::types::{Invoice, InvoiceItem, InvoiceKind, Record, RecordItem, Side};

/// Header field compared between a record and a referenced invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Party,
    Company,
    Project,
    Currency,
}

impl HeaderField {
    fn label(&self, side: Side) -> &'static str {
        match (self, side) {
            (Self::Party, Side::Purchase) => "supplier",
            (Self::Party, Side::Sales) => "customer",
            (Self::Company, _) => "company",
            (Self::Project, _) => "project",
            (Self::Currency, _) => "currency",
        }
    }

    fn values<'a>(
        &self,
        record: &'a Record,
        invoice: &'a Invoice,
    ) -> (Option<&'a str>, Option<&'a str>) {
        match self {
            Self::Party => (Some(record.party.as_str()), Some(invoice.party.as_str())),
            Self::Company => (Some(record.company.as_str()), Some(invoice.company.as_str())),
            Self::Project => (record.project.as_deref(), invoice.project.as_deref()),
            Self::Currency => (Some(record.currency.as_str()), Some(invoice.currency.as_str())),
        }
    }
}

/// Item field compared between a record item and its invoice row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Project,
    ItemCode,
    Uom,
    ConversionFactor,
}

impl ItemField {
    fn label(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::ItemCode => "item_code",
            Self::Uom => "uom",
            Self::ConversionFactor => "conversion_factor",
        }
    }

    /// `(own, reference)` rendered for comparison; `None` reference skips.
    fn values(&self, item: &RecordItem, reference: &InvoiceItem) -> (String, Option<String>) {
        match self {
            Self::Project => (
                item.project.clone().unwrap_or_default(),
                reference.project.clone().filter(|p| !p.is_empty()),
            ),
            Self::ItemCode => (item.item_code.clone(), Some(reference.item_code.clone())),
            Self::Uom => (item.uom.clone(), Some(reference.uom.clone())),
            Self::ConversionFactor => (
                item.conversion_factor.normalize().to_string(),
                Some(reference.conversion_factor.normalize().to_string()),
            ),
        }
    }
}

pub const PURCHASE_HEADER_FIELDS: &[HeaderField] =
    &[HeaderField::Party, HeaderField::Company, HeaderField::Currency];
pub const SALES_HEADER_FIELDS: &[HeaderField] = &[
    HeaderField::Party,
    HeaderField::Company,
    HeaderField::Project,
    HeaderField::Currency,
];
pub const PURCHASE_ITEM_FIELDS: &[ItemField] =
    &[ItemField::Project, ItemField::ItemCode, ItemField::Uom];
pub const SALES_ITEM_FIELDS: &[ItemField] =
    &[ItemField::ItemCode, ItemField::Uom, ItemField::ConversionFactor];

/// Invoices fetched once per validation run.
pub struct InvoiceCache<'h, H: ?Sized> {
    host: &'h H,
    kind: InvoiceKind,
    invoices: BTreeMap<String, Option<Invoice>>,
}

impl<'h, H> InvoiceCache<'h, H>
where
    H: InvoiceStore + ?Sized,
{
    pub fn new(host: &'h H, kind: InvoiceKind) -> Self {
        Self {
            host,
            kind,
            invoices: BTreeMap::new(),
        }
    }

    pub fn get(&mut self, name: &str) -> Result<Option<&Invoice>, RecordError> {
        if !self.invoices.contains_key(name) {
            let invoice = self.host.invoice(self.kind, name)?;
            self.invoices.insert(name.to_string(), invoice);
        }
        Ok(self.invoices.get(name).and_then(Option::as_ref))
    }
}

/// Compare the record header with every referenced invoice.
pub fn validate_reference_headers<H>(
    record: &Record,
    fields: &[HeaderField],
    host: &H,
) -> Result<(), RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let kind = record.side.invoice_kind();
    for name in record.linked_invoices() {
        let Some(invoice) = host.invoice(kind, name)? else {
            return Err(RecordError::invalid(
                "items",
                format!("Invalid reference {} {name}", kind.doctype()),
            ));
        };
        for field in fields {
            let (own, reference) = field.values(record, &invoice);
            let Some(reference) = reference.filter(|r| !r.is_empty()) else {
                continue;
            };
            if own.unwrap_or_default() != reference {
                return Err(RecordError::invalid(
                    field.label(record.side),
                    format!(
                        "{} must be same as {} {} ({})",
                        field.label(record.side),
                        kind.doctype(),
                        name,
                        reference
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Check every back-referenced invoice row.
///
/// The row must exist, belong to the item's invoice (when one is given),
/// belong to a submitted invoice, and agree on `fields`. Several record
/// items may point at the same invoice row.
pub fn validate_reference_items<H>(
    record: &Record,
    fields: &[ItemField],
    host: &H,
) -> Result<(), RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let kind = record.side.invoice_kind();
    let mut invoices = InvoiceCache::new(host, kind);

    for item in &record.items {
        let Some(row) = item.invoice_detail.as_deref().filter(|r| !r.is_empty()) else {
            continue;
        };
        let field_path = format!("items[{}]", item.idx);
        let Some(reference) = host.invoice_item(kind, row)? else {
            return Err(RecordError::invalid_row(
                item.idx,
                field_path,
                format!("Invalid reference {} {row}", kind.item_doctype()),
            ));
        };

        if let Some(own) = item.invoice.as_deref() {
            if own != reference.parent {
                return Err(RecordError::invalid_row(
                    item.idx,
                    field_path,
                    format!(
                        "{} {row} belongs to {} {}, not {own}",
                        kind.item_doctype(),
                        kind.doctype(),
                        reference.parent
                    ),
                ));
            }
        }

        let submitted = invoices
            .get(&reference.parent)?
            .is_some_and(|inv| inv.docstatus == DocStatus::Submitted);
        if !submitted {
            return Err(RecordError::Precondition(format!(
                "{} {} is not submitted",
                kind.doctype(),
                reference.parent
            )));
        }

        for field in fields {
            let (own, expected) = field.values(item, &reference);
            let Some(expected) = expected else { continue };
            if own != expected {
                return Err(RecordError::invalid_row(
                    item.idx,
                    format!("{field_path}.{}", field.label()),
                    format!(
                        "{} must be same as {} {row} ({expected})",
                        field.label(),
                        kind.item_doctype()
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Check tax rows that back-reference invoice tax rows.
///
/// The row must belong to a submitted invoice, and account head and charge
/// type must match.
pub fn validate_reference_taxes<H>(record: &Record, host: &H) -> Result<(), RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let kind = record.side.invoice_kind();
    let mut invoices = InvoiceCache::new(host, kind);
    for (i, tax) in record.taxes.iter().enumerate() {
        let Some(row) = tax.pt_detail.as_deref().filter(|r| !r.is_empty()) else {
            continue;
        };
        let idx = i + 1;
        let Some(reference) = host.invoice_tax(kind, row)? else {
            return Err(RecordError::invalid_row(
                idx,
                format!("taxes[{idx}]"),
                format!("Invalid reference {} {row}", kind.tax_doctype()),
            ));
        };
        let submitted = invoices
            .get(&reference.parent)?
            .is_some_and(|inv| inv.docstatus == DocStatus::Submitted);
        if !submitted {
            return Err(RecordError::Precondition(format!(
                "{} {} is not submitted",
                kind.doctype(),
                reference.parent
            )));
        }
        if tax.account_head != reference.account_head {
            return Err(RecordError::invalid_row(
                idx,
                format!("taxes[{idx}].account_head"),
                format!(
                    "account_head must be same as {} {row} ({})",
                    kind.tax_doctype(),
                    reference.account_head
                ),
            ));
        }
        if tax.charge_type != reference.charge_type {
            return Err(RecordError::invalid_row(
                idx,
                format!("taxes[{idx}].charge_type"),
                format!(
                    "charge_type must be same as {} {row} ({:?})",
                    kind.tax_doctype(),
                    reference.charge_type
                ),
            ));
        }
    }
    Ok(())
}

/// Each back-referenced item's rate must equal the invoice row's rate, up to
/// `Settings::rate_tolerance`.
pub fn validate_rate_with_reference<H>(
    record: &Record,
    settings: &Settings,
    host: &H,
) -> Result<(), RecordError>
where
    H: InvoiceStore + ?Sized,
{
    let kind = record.side.invoice_kind();
    for item in &record.items {
        let Some(row) = item.invoice_detail.as_deref().filter(|r| !r.is_empty()) else {
            continue;
        };
        let Some(reference) = host.invoice_item(kind, row)? else {
            continue;
        };
        if (item.rate - reference.rate).abs() > settings.rate_tolerance {
            return Err(RecordError::invalid_row(
                item.idx,
                format!("items[{}].rate", item.idx),
                format!(
                    "Rate must be same as {}: {} ({} / {})",
                    kind.doctype(),
                    reference.parent,
                    item.rate.normalize(),
                    reference.rate.normalize()
                ),
            ));
        }
    }
    Ok(())
}
