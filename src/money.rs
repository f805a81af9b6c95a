//! Helpers for parsing and rounding amounts of money.

use serde::Deserialize;

use crate::Error;

/// The rate of Goods and Services Tax added to an expense.
pub const GST_RATE: f64 = 0.09;

/// Round `amount` to the nearest cent.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// The GST owed on `amount`, rounded to the nearest cent.
pub fn gst_for(amount: f64) -> f64 {
    round2(amount * GST_RATE)
}

/// Parse a positive amount of money from user input.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `text` is not a finite number greater than zero.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    let amount: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAmount(text.to_owned()))?;

    validate_amount(amount)
}

/// Check that `amount` is a finite number greater than zero.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] otherwise.
pub fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount.to_string()))
    }
}

/// An amount sent by a client either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// The amount as a JSON number, e.g. `12.5`.
    Number(f64),
    /// The amount as text, e.g. `"12.50"`.
    Text(String),
}

impl AmountInput {
    /// Get the amount, which must be positive.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if the amount is not a positive number.
    pub fn parse(&self) -> Result<f64, Error> {
        match self {
            AmountInput::Number(amount) => validate_amount(*amount),
            AmountInput::Text(text) => parse_amount(text),
        }
    }
}

#[cfg(test)]
mod money_tests {
    use crate::Error;

    use super::{AmountInput, gst_for, parse_amount, round2};

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(2.344), 2.34);
    }

    #[test]
    fn gst_is_nine_percent() {
        assert_eq!(gst_for(100.0), 9.0);
        assert_eq!(gst_for(12.34), 1.11);
    }

    #[test]
    fn parse_amount_rejects_non_positive() {
        assert_eq!(parse_amount(" 12.5 "), Ok(12.5));
        assert!(matches!(parse_amount("0"), Err(Error::InvalidAmount(_))));
        assert!(matches!(parse_amount("-3"), Err(Error::InvalidAmount(_))));
        assert!(matches!(parse_amount("abc"), Err(Error::InvalidAmount(_))));
        assert!(matches!(parse_amount("NaN"), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn amount_input_accepts_numbers_and_strings() {
        let number: AmountInput = serde_json::from_str("25").unwrap();
        let text: AmountInput = serde_json::from_str("\"25.50\"").unwrap();

        assert_eq!(number.parse(), Ok(25.0));
        assert_eq!(text.parse(), Ok(25.5));
    }
}
