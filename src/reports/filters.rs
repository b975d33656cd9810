use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use tracing::warn;

/// Filters of the invoice details report.
///
/// None are required: `report_date` defaults to today and `from_date` to
/// one month before `report_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDetailsFilters {
    pub company: Option<String>,
    pub from_date: NaiveDate,
    pub report_date: NaiveDate,
    /// Supplier or customer.
    pub party: Option<String>,
    pub item_code: Option<String>,
    /// Leave out invoices that are fully billed.
    pub hide_completed_invoice: bool,
}

impl InvoiceDetailsFilters {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            company: None,
            from_date: month_before(today),
            report_date: today,
            party: None,
            item_code: None,
            hide_completed_invoice: false,
        }
    }

    /// Parse raw filter values. Malformed values are logged and replaced by
    /// their defaults; unknown keys are ignored.
    pub fn from_map(raw: &BTreeMap<String, String>, today: NaiveDate) -> Self {
        let mut filters = Self::new(today);
        let text = |key: &str| {
            raw.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        filters.company = text("company");
        filters.party = text("party")
            .or_else(|| text("supplier"))
            .or_else(|| text("customer"));
        filters.item_code = text("item_code");

        if let Some(value) = text("report_date") {
            match parse_date(&value) {
                Some(date) => filters.report_date = date,
                None => warn!(filter = "report_date", value = %value, "ignoring malformed date"),
            }
        }
        filters.from_date = month_before(filters.report_date);
        if let Some(value) = text("from_date") {
            match parse_date(&value) {
                Some(date) if date <= filters.report_date => filters.from_date = date,
                Some(_) => warn!(filter = "from_date", value = %value, "from date after report date, ignoring"),
                None => warn!(filter = "from_date", value = %value, "ignoring malformed date"),
            }
        }

        if let Some(value) = text("hide_completed_invoice") {
            match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => filters.hide_completed_invoice = true,
                "0" | "false" | "no" => filters.hide_completed_invoice = false,
                _ => warn!(filter = "hide_completed_invoice", value = %value, "ignoring malformed flag"),
            }
        }
        filters
    }
}

fn month_before(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(1)).unwrap_or(date)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_filters() {
        let f = InvoiceDetailsFilters::from_map(&BTreeMap::new(), date(2024, 3, 31));
        assert_eq!(f.report_date, date(2024, 3, 31));
        assert_eq!(f.from_date, date(2024, 2, 29));
        assert!(!f.hide_completed_invoice);
    }

    #[test]
    fn malformed_values_fall_back() {
        let f = InvoiceDetailsFilters::from_map(
            &raw(&[
                ("report_date", "31/03/2024"),
                ("from_date", "2024-05-01"),
                ("hide_completed_invoice", "maybe"),
                ("supplier", "Supplier A"),
            ]),
            date(2024, 4, 15),
        );
        assert_eq!(f.report_date, date(2024, 4, 15));
        assert_eq!(f.from_date, date(2024, 3, 15));
        assert!(!f.hide_completed_invoice);
        assert_eq!(f.party.as_deref(), Some("Supplier A"));
    }
}
