//! # Currency
//!
//! Converts base-currency amounts for display in the customer's selected
//! currency.
//!
//! ## Display Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Money (base cents) ──convert(rate)──► Decimal ──format(symbol)──► "€9.19"
//! │        ▲                                 (exact)        (2 dp, half     │
//! │        │                                                 away from 0)   │
//! │   stored amounts are never touched; conversion is display-only          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rates are validated once, when a [`Currency`] or [`CurrencySettings`] is
//! built. After that, conversion and formatting cannot fail.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CurrencyError;
use crate::i18n::Locale;
use crate::money::Money;

// =============================================================================
// Exchange Rate
// =============================================================================

/// A strictly positive multiplier from the base currency to another.
///
/// Serializes as a JSON string (`"0.92"`) so no precision is lost in
/// transit; deserializing re-runs the positivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// The base currency's rate to itself.
    pub const IDENTITY: ExchangeRate = ExchangeRate(Decimal::ONE);

    /// Validates a rate. Zero and negative rates are rejected.
    ///
    /// ```rust
    /// use bistro_core::currency::ExchangeRate;
    /// use rust_decimal::Decimal;
    ///
    /// assert!(ExchangeRate::new(Decimal::new(92, 2)).is_ok());
    /// assert!(ExchangeRate::new(Decimal::ZERO).is_err());
    /// ```
    pub fn new(rate: Decimal) -> Result<Self, CurrencyError> {
        if rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate {
                code: String::new(),
                rate: rate.to_string(),
            });
        }
        Ok(ExchangeRate(rate))
    }

    /// Parses a stored textual rate such as `"0.92"`.
    pub fn parse(code: &str, raw: &str) -> Result<Self, CurrencyError> {
        let invalid = || CurrencyError::InvalidRate {
            code: code.to_string(),
            rate: raw.to_string(),
        };
        let rate: Decimal = raw.trim().parse().map_err(|_| invalid())?;
        ExchangeRate::new(rate).map_err(|_| invalid())
    }

    #[inline]
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for ExchangeRate {
    type Error = CurrencyError;

    fn try_from(rate: Decimal) -> Result<Self, Self::Error> {
        ExchangeRate::new(rate)
    }
}

impl From<ExchangeRate> for Decimal {
    fn from(rate: ExchangeRate) -> Self {
        rate.0
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Conversion & Formatting
// =============================================================================

/// `amount × rate`, unrounded.
///
/// The result is a display value in the target currency. Rounding happens
/// only in [`format`].
pub fn convert(amount: Money, rate: ExchangeRate) -> Decimal {
    amount.to_decimal() * rate.value()
}

fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Symbol followed by the amount fixed to 2 decimal places.
///
/// Negative amounts put the sign before the symbol: `-$5.50`.
///
/// ```rust
/// use bistro_core::currency::{convert, format, ExchangeRate};
/// use bistro_core::money::Money;
/// use rust_decimal::Decimal;
///
/// let rate = ExchangeRate::new(Decimal::new(92, 2)).unwrap();
/// assert_eq!(format(convert(Money::from_cents(999), rate), "€"), "€9.19");
/// ```
pub fn format(amount: Decimal, symbol: &str) -> String {
    let rounded = round_for_display(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}{:.2}", sign, symbol, rounded.abs())
}

/// Locale-aware rendering: digit grouping, decimal separator and symbol
/// placement follow the locale's conventions.
///
/// | Locale | 1234.5 in EUR |
/// |--------|---------------|
/// | en     | €1,234.50     |
/// | es     | 1.234,50 €    |
/// | fr     | 1 234,50 €    |
/// | de     | 1.234,50 €    |
pub fn format_localized(amount: Decimal, currency: &Currency, locale: Locale) -> String {
    let rounded = round_for_display(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let conv = locale.number_conventions();
    let grouped = group_digits(int_part, conv.group_separator);
    let number = format!("{}{}{}", grouped, conv.decimal_separator, frac_part);
    let sign = if negative { "-" } else { "" };

    if conv.symbol_after {
        format!("{}{} {}", sign, number, currency.symbol)
    } else {
        format!("{}{}{}", sign, currency.symbol, number)
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Currency
// =============================================================================

/// One entry of the currency settings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Currency {
    /// ISO 4217 code, e.g. "USD".
    pub code: String,
    pub symbol: String,
    #[ts(as = "String")]
    pub rate: ExchangeRate,
    pub is_default: bool,
}

impl Currency {
    pub fn new(
        code: impl Into<String>,
        symbol: impl Into<String>,
        rate: ExchangeRate,
        is_default: bool,
    ) -> Self {
        Currency {
            code: code.into(),
            symbol: symbol.into(),
            rate,
            is_default,
        }
    }

    /// Converts and formats a base amount in this currency.
    pub fn display(&self, amount: Money) -> String {
        format(convert(amount, self.rate), &self.symbol)
    }

    /// Like [`Currency::display`], with locale conventions.
    pub fn display_localized(&self, amount: Money, locale: Locale) -> String {
        format_localized(convert(amount, self.rate), self, locale)
    }
}

// =============================================================================
// Currency Settings
// =============================================================================

/// The validated list of currencies a customer can pick from.
///
/// ## Invariants
/// - At least one currency, exactly one marked default
/// - Codes are unique (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CurrencySettings {
    currencies: Vec<Currency>,
}

impl CurrencySettings {
    pub fn new(currencies: Vec<Currency>) -> Result<Self, CurrencyError> {
        let defaults: Vec<String> = currencies
            .iter()
            .filter(|c| c.is_default)
            .map(|c| c.code.clone())
            .collect();

        match defaults.len() {
            0 => return Err(CurrencyError::NoDefault),
            1 => {}
            _ => return Err(CurrencyError::MultipleDefaults(defaults)),
        }

        for (i, c) in currencies.iter().enumerate() {
            crate::validation::validate_currency_code(&c.code)
                .map_err(|_| CurrencyError::InvalidCode(c.code.clone()))?;
            if currencies[..i]
                .iter()
                .any(|p| p.code.eq_ignore_ascii_case(&c.code))
            {
                return Err(CurrencyError::InvalidCode(c.code.clone()));
            }
        }

        Ok(CurrencySettings { currencies })
    }

    /// Settings with the base currency only (USD, rate 1).
    pub fn base_only() -> Self {
        CurrencySettings {
            currencies: vec![Currency::new("USD", "$", ExchangeRate::IDENTITY, true)],
        }
    }

    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    pub fn default_currency(&self) -> &Currency {
        // `new` guarantees exactly one default
        self.currencies
            .iter()
            .find(|c| c.is_default)
            .unwrap_or(&self.currencies[0])
    }

    pub fn get(&self, code: &str) -> Option<&Currency> {
        self.currencies
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// The currency for `code`, or the default when the code is unknown.
    ///
    /// Returns the currency and whether a fallback happened, so the caller
    /// can log it.
    pub fn select(&self, code: &str) -> (&Currency, bool) {
        match self.get(code) {
            Some(c) => (c, false),
            None => (self.default_currency(), true),
        }
    }
}

impl<'de> Deserialize<'de> for CurrencySettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let currencies = Vec::<Currency>::deserialize(deserializer)?;
        CurrencySettings::new(currencies).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur() -> Currency {
        Currency::new("EUR", "€", ExchangeRate::new(dec!(0.92)).unwrap(), false)
    }

    fn usd() -> Currency {
        Currency::new("USD", "$", ExchangeRate::IDENTITY, true)
    }

    #[test]
    fn test_rate_rejects_zero_and_negative() {
        assert!(ExchangeRate::new(dec!(0)).is_err());
        assert!(ExchangeRate::new(dec!(-1.5)).is_err());
        assert!(ExchangeRate::new(dec!(0.0001)).is_ok());
    }

    #[test]
    fn test_rate_parse() {
        assert_eq!(ExchangeRate::parse("EUR", "0.92").unwrap().value(), dec!(0.92));
        let err = ExchangeRate::parse("EUR", "abc").unwrap_err();
        assert_eq!(
            err,
            CurrencyError::InvalidRate {
                code: "EUR".to_string(),
                rate: "abc".to_string()
            }
        );
        assert!(ExchangeRate::parse("EUR", "0").is_err());
    }

    #[test]
    fn test_rate_json_round_trip_validates() {
        let rate: ExchangeRate = serde_json::from_str("\"1.08\"").unwrap();
        assert_eq!(rate.value(), dec!(1.08));
        assert!(serde_json::from_str::<ExchangeRate>("\"0\"").is_err());
    }

    #[test]
    fn test_convert_is_unrounded() {
        let rate = ExchangeRate::new(dec!(0.92)).unwrap();
        assert_eq!(convert(Money::from_cents(999), rate), dec!(9.1908));
    }

    #[test]
    fn test_format_two_places_half_away_from_zero() {
        assert_eq!(format(dec!(33.53), "$"), "$33.53");
        assert_eq!(format(dec!(5), "$"), "$5.00");
        assert_eq!(format(dec!(0.125), "£"), "£0.13");
        assert_eq!(format(dec!(-5.5), "$"), "-$5.50");
        assert_eq!(format(dec!(-0.001), "$"), "$0.00");
    }

    #[test]
    fn test_display_leaves_money_untouched() {
        let amount = Money::from_cents(3353);
        let shown = eur().display(amount);
        assert_eq!(shown, "€30.85");
        assert_eq!(amount.cents(), 3353);
    }

    #[test]
    fn test_format_localized() {
        let eur = eur();
        assert_eq!(format_localized(dec!(1234.5), &eur, Locale::En), "€1,234.50");
        assert_eq!(format_localized(dec!(1234.5), &eur, Locale::De), "1.234,50 €");
        assert_eq!(format_localized(dec!(1234567.891), &eur, Locale::Fr), "1 234 567,89 €");
        assert_eq!(format_localized(dec!(-12), &usd(), Locale::En), "-$12.00");
        assert_eq!(format_localized(dec!(999), &eur, Locale::Es), "999,00 €");
    }

    #[test]
    fn test_settings_require_single_default() {
        assert_eq!(
            CurrencySettings::new(vec![eur()]).unwrap_err(),
            CurrencyError::NoDefault
        );

        let mut second = eur();
        second.is_default = true;
        assert!(matches!(
            CurrencySettings::new(vec![usd(), second]),
            Err(CurrencyError::MultipleDefaults(_))
        ));
    }

    #[test]
    fn test_settings_reject_duplicate_codes() {
        let mut dup = eur();
        dup.code = "usd".to_string();
        assert!(CurrencySettings::new(vec![usd(), dup]).is_err());
    }

    #[test]
    fn test_select_falls_back_to_default() {
        let settings = CurrencySettings::new(vec![usd(), eur()]).unwrap();

        let (c, fell_back) = settings.select("eur");
        assert_eq!(c.code, "EUR");
        assert!(!fell_back);

        let (c, fell_back) = settings.select("JPY");
        assert_eq!(c.code, "USD");
        assert!(fell_back);
    }

    #[test]
    fn test_settings_deserialize_validates() {
        let json = r#"[{"code":"USD","symbol":"$","rate":"1","isDefault":true}]"#;
        let settings: CurrencySettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.default_currency().code, "USD");

        let bad = r#"[{"code":"USD","symbol":"$","rate":"1","isDefault":false}]"#;
        assert!(serde_json::from_str::<CurrencySettings>(bad).is_err());
    }
}
