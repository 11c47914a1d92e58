use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Money, Rate};

/// Whole-currency amount with thousands separators, e.g. `$1,074`.
pub fn format_currency(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().trunc().to_string();
    format!("{sign}${}", group_thousands(&digits))
}

/// Rate as a percentage with two decimals, e.g. `0.0475` -> `4.75%`.
pub fn format_percent(rate: Rate) -> String {
    let mut pct = (rate * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    pct.rescale(2);
    format!("{pct}%")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(1073.65)), "$1,074");
        assert_eq!(format_currency(dec!(386508.65)), "$386,509");
        assert_eq!(format_currency(dec!(999)), "$999");
        assert_eq!(format_currency(dec!(1000)), "$1,000");
        assert_eq!(format_currency(dec!(1234567.4)), "$1,234,567");
        assert_eq!(format_currency(dec!(0.4)), "$0");
        assert_eq!(format_currency(dec!(-2500)), "-$2,500");
    }

    #[test]
    fn test_format_currency_half_to_even() {
        assert_eq!(format_currency(dec!(2.5)), "$2");
        assert_eq!(format_currency(dec!(3.5)), "$4");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(0.05)), "5.00%");
        assert_eq!(format_percent(dec!(0.0475)), "4.75%");
        assert_eq!(format_percent(dec!(0.043)), "4.30%");
        assert_eq!(format_percent(dec!(0.123456)), "12.35%");
    }
}
