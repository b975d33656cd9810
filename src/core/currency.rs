//! Currency and conversion-rate checks.

use rust_decimal::Decimal;

use super::error::RecordError;
use super::services::PartyDirectory;
use super::types::Record;

/// Check that `conversion_rate` agrees with the company's base currency.
///
/// Same currency requires exactly 1; a foreign currency requires a rate
/// that is neither 0 nor 1.
pub fn check_conversion_rate<H>(record: &Record, host: &H) -> Result<(), RecordError>
where
    H: PartyDirectory + ?Sized,
{
    let Some(company_currency) = host.company_currency(&record.company)? else {
        return Err(RecordError::Configuration(
            "Please enter default currency in Company Master".into(),
        ));
    };
    conversion_rate_is_valid(&record.currency, &company_currency, record.conversion_rate)
}

/// Pure form of [`check_conversion_rate`].
pub fn conversion_rate_is_valid(
    currency: &str,
    company_currency: &str,
    conversion_rate: Decimal,
) -> Result<(), RecordError> {
    let same_currency = currency == company_currency;
    let invalid = conversion_rate.is_zero()
        || (same_currency && conversion_rate != Decimal::ONE)
        || (!same_currency && conversion_rate == Decimal::ONE);
    if invalid {
        return Err(RecordError::invalid(
            "conversion_rate",
            "Conversion rate cannot be 0 or 1",
        ));
    }
    Ok(())
}
