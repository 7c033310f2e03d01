//! Lenient parsing of currency values
//!
//! Malformed or negative input is not rejected: it falls back to zero so a
//! record can still be saved. Callers log the fallback.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Currency value as sent by a client, either a JSON number or text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    Number(f64),
    Text(String),
}

/// Outcome of a lenient parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedMoney {
    pub value: Decimal,
    /// True when the input was present but unusable and zero was substituted
    pub fell_back: bool,
}

impl ParsedMoney {
    fn exact(value: Decimal) -> Self {
        Self {
            value,
            fell_back: false,
        }
    }

    fn fallback() -> Self {
        Self {
            value: Decimal::ZERO,
            fell_back: true,
        }
    }
}

/// Largest value a `NUMERIC(12, 2)` column holds
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn accept(value: Decimal) -> ParsedMoney {
    let value = value.round_dp(2);
    if (value.is_sign_negative() && !value.is_zero()) || value > MAX_MONEY {
        ParsedMoney::fallback()
    } else {
        ParsedMoney::exact(value)
    }
}

/// Parse a currency value with two decimal places using `.` as separator
pub fn parse_money(input: Option<&MoneyInput>) -> ParsedMoney {
    match input {
        None => ParsedMoney::exact(Decimal::ZERO),
        Some(MoneyInput::Number(n)) => match Decimal::try_from(*n) {
            Ok(value) => accept(value),
            Err(_) => ParsedMoney::fallback(),
        },
        Some(MoneyInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return ParsedMoney::exact(Decimal::ZERO);
            }
            match Decimal::from_str(text) {
                Ok(value) => accept(value),
                Err(_) => ParsedMoney::fallback(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: &str) -> MoneyInput {
        MoneyInput::Text(raw.to_string())
    }

    #[test]
    fn test_absent_or_blank_is_zero_without_fallback() {
        assert_eq!(parse_money(None), ParsedMoney::exact(Decimal::ZERO));
        assert_eq!(parse_money(Some(&text("  "))), ParsedMoney::exact(Decimal::ZERO));
    }

    #[test]
    fn test_dot_separated_values_parse() {
        let parsed = parse_money(Some(&text("1234.567")));
        assert_eq!(parsed.value, Decimal::from_str("1234.57").unwrap());
        assert!(!parsed.fell_back);

        let parsed = parse_money(Some(&MoneyInput::Number(10.5)));
        assert_eq!(parsed.value, Decimal::from_str("10.50").unwrap());
    }

    #[test]
    fn test_wrong_separator_falls_back_to_zero() {
        let parsed = parse_money(Some(&text("1.234,56")));
        assert_eq!(parsed.value, Decimal::ZERO);
        assert!(parsed.fell_back);

        assert!(parse_money(Some(&text("12,50"))).fell_back);
    }

    #[test]
    fn test_negative_values_fall_back_to_zero() {
        let parsed = parse_money(Some(&text("-3.00")));
        assert_eq!(parsed.value, Decimal::ZERO);
        assert!(parsed.fell_back);
    }

    #[test]
    fn test_values_beyond_column_range_fall_back_to_zero() {
        assert_eq!(MAX_MONEY, Decimal::from_str("9999999999.99").unwrap());

        let parsed = parse_money(Some(&text("9999999999.99")));
        assert_eq!(parsed.value, MAX_MONEY);
        assert!(!parsed.fell_back);

        let parsed = parse_money(Some(&MoneyInput::Number(1e15)));
        assert_eq!(parsed.value, Decimal::ZERO);
        assert!(parsed.fell_back);

        assert!(parse_money(Some(&text("10000000000"))).fell_back);
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let n: MoneyInput = serde_json::from_str("12.5").unwrap();
        assert_eq!(n, MoneyInput::Number(12.5));
        let t: MoneyInput = serde_json::from_str("\"12,5\"").unwrap();
        assert_eq!(t, text("12,5"));
    }
}
