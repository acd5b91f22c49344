// src/formatting.rs

use crate::error::NotifyError;

/// Rendered in place of a non-finite amount.
pub const NON_FINITE_PLACEHOLDER: &str = "—";

/// The locale/currency pairs the formatter knows how to render.
///
/// Each entry is `(locale, currency, symbol, grouping separator, decimal separator)`.
const SUPPORTED_FORMATS: &[(&str, &str, &str, char, char)] = &[("es-MX", "MXN", "$", ',', '.')];

/// Renders monetary amounts as localized currency strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountFormatter {
    locale: &'static str,
    currency: &'static str,
    symbol: &'static str,
    group_separator: char,
    decimal_separator: char,
}

impl AmountFormatter {
    /// Creates a formatter for a supported locale/currency pair.
    pub fn new(locale: &str, currency: &str) -> Result<Self, NotifyError> {
        SUPPORTED_FORMATS
            .iter()
            .find(|(l, c, ..)| l.eq_ignore_ascii_case(locale) && c.eq_ignore_ascii_case(currency))
            .map(|&(locale, currency, symbol, group_separator, decimal_separator)| Self {
                locale,
                currency,
                symbol,
                group_separator,
                decimal_separator,
            })
            .ok_or_else(|| NotifyError::UnsupportedLocale {
                locale: locale.to_string(),
                currency: currency.to_string(),
            })
    }

    pub fn locale(&self) -> &str {
        self.locale
    }

    pub fn currency(&self) -> &str {
        self.currency
    }

    /// Formats an amount with two fraction digits and thousands grouping.
    ///
    /// Rounding is half away from zero, applied to the shortest decimal
    /// representation of `amount`. Non-finite input yields
    /// [`NON_FINITE_PLACEHOLDER`].
    pub fn format(&self, amount: f64) -> String {
        if !amount.is_finite() {
            return NON_FINITE_PLACEHOLDER.to_string();
        }

        let (integer, cents) = round_to_cents(amount.abs());
        let sign = if amount < 0.0 { "-" } else { "" };
        format!(
            "{}{}{}{}{}",
            sign,
            self.symbol,
            group_thousands(&integer, self.group_separator),
            self.decimal_separator,
            cents
        )
    }
}

impl Default for AmountFormatter {
    fn default() -> Self {
        let (locale, currency, symbol, group_separator, decimal_separator) = SUPPORTED_FORMATS[0];
        Self {
            locale,
            currency,
            symbol,
            group_separator,
            decimal_separator,
        }
    }
}

/// Splits a non-negative finite value into its integer digits and two cent digits.
fn round_to_cents(magnitude: f64) -> (String, String) {
    // `Display` for f64 yields the shortest round-trip digits and never uses
    // exponent notation.
    let repr = magnitude.to_string();
    let (integer_part, fraction_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut fraction = fraction_part.bytes().map(|b| b - b'0');
    let tenths = fraction.next().unwrap_or(0);
    let hundredths = fraction.next().unwrap_or(0);
    let round_up = fraction.next().is_some_and(|d| d >= 5);

    let mut digits: Vec<u8> = integer_part.bytes().map(|b| b - b'0').collect();
    digits.push(tenths);
    digits.push(hundredths);

    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let rendered: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    let (integer, cents) = rendered.split_at(rendered.len() - 2);
    (integer.to_string(), cents.to_string())
}

fn group_thousands(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
