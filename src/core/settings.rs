//! Global buying, selling and accounts settings consulted by the records.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::RecordError;

/// Largest currency precision whose tolerance still fits a `Decimal` scale.
pub const MAX_CURRENCY_PRECISION: u32 = 27;

/// Settings shared by both record controllers and the propagation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Buying: a purchase record's rate must equal the invoice row's rate.
    pub maintain_same_rate: bool,
    /// Selling: a sales record's rate must equal the invoice row's rate.
    pub maintain_same_sales_rate: bool,
    /// Percent by which an invoice row may be billed beyond its amount.
    pub over_billing_allowance: Decimal,
    /// Reject a supplier bill number already used in the same fiscal year.
    pub check_supplier_invoice_uniqueness: bool,
    /// Decimal places of the company currency, at most
    /// [`MAX_CURRENCY_PRECISION`].
    pub currency_precision: u32,
    /// Largest rate difference still accepted as "the same rate"; zero
    /// demands exact equality.
    pub rate_tolerance: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            maintain_same_rate: false,
            maintain_same_sales_rate: false,
            over_billing_allowance: Decimal::ZERO,
            check_supplier_invoice_uniqueness: false,
            currency_precision: 2,
            rate_tolerance: dec!(0.01),
        }
    }
}

impl Settings {
    /// Load settings from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| RecordError::Configuration(format!("invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.currency_precision > MAX_CURRENCY_PRECISION {
            return Err(RecordError::Configuration(format!(
                "invalid settings: currency_precision {} exceeds {MAX_CURRENCY_PRECISION}",
                self.currency_precision
            )));
        }
        if self.rate_tolerance.is_sign_negative() {
            return Err(RecordError::Configuration(
                "invalid settings: rate_tolerance must not be negative".into(),
            ));
        }
        if self.over_billing_allowance.is_sign_negative() {
            return Err(RecordError::Configuration(
                "invalid settings: over_billing_allowance must not be negative".into(),
            ));
        }
        Ok(())
    }

    fn precision(&self) -> u32 {
        self.currency_precision.min(MAX_CURRENCY_PRECISION)
    }

    /// Half a unit in the last place of the currency precision.
    ///
    /// Amounts closer than this are considered equal.
    pub fn amount_tolerance(&self) -> Decimal {
        Decimal::new(5, self.precision() + 1)
    }

    /// Round a money amount to the currency precision (half away from zero).
    pub fn round_amount(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(
            self.precision(),
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        )
    }
}

/// Builder for [`Settings`].
///
/// ```
/// use invoice_records::core::SettingsBuilder;
/// use rust_decimal_macros::dec;
///
/// let settings = SettingsBuilder::new()
///     .maintain_same_rate(true)
///     .over_billing_allowance(dec!(10))
///     .build()
///     .unwrap();
/// assert!(settings.maintain_same_rate);
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maintain_same_rate(mut self, on: bool) -> Self {
        self.settings.maintain_same_rate = on;
        self
    }

    pub fn maintain_same_sales_rate(mut self, on: bool) -> Self {
        self.settings.maintain_same_sales_rate = on;
        self
    }

    /// Set the over-billing allowance in percent.
    pub fn over_billing_allowance(mut self, percent: Decimal) -> Self {
        self.settings.over_billing_allowance = percent;
        self
    }

    pub fn check_supplier_invoice_uniqueness(mut self, on: bool) -> Self {
        self.settings.check_supplier_invoice_uniqueness = on;
        self
    }

    pub fn currency_precision(mut self, dp: u32) -> Self {
        self.settings.currency_precision = dp;
        self
    }

    pub fn rate_tolerance(mut self, tolerance: Decimal) -> Self {
        self.settings.rate_tolerance = tolerance;
        self
    }

    pub fn build(self) -> Result<Settings, RecordError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
