use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

pub const MONTHS_IN_YEAR: u32 = 12;

/// Net Present Value of a series of cash flows, the first flow undiscounted.
///
/// Once the running discount factor leaves the representable range the
/// remaining flows are below decimal resolution and are skipped. A negative
/// rate grows later flows instead; a sum beyond the decimal range is an error.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> MortgageResult<Money> {
    if rate <= dec!(-1) {
        return Err(MortgageError::input(
            "rate",
            "Discount rate must be greater than -100%",
        ));
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                None => break,
            };
        }
        if discount.is_zero() {
            return Err(MortgageError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result = cf
            .checked_div(discount)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| {
                MortgageError::input("rate", format!("Present value exceeds decimal range at period {t}"))
            })?;
    }

    Ok(result)
}

/// Payment (PMT) with spreadsheet sign conventions: a positive present value
/// yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> MortgageResult<Money> {
    if nper == 0 {
        return Err(MortgageError::input("nper", "Number of periods must be > 0"));
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let one_plus_r = Decimal::ONE + rate;
    let factor = one_plus_r
        .checked_powi(i64::from(nper))
        .ok_or_else(|| MortgageError::input("nper", "Growth factor exceeds decimal range"))?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}

/// Level monthly payment that amortizes `principal` over `term_months` at
/// `annual_rate` compounded monthly. The result is unrounded.
///
/// Evaluated in discount form, `P * r / (1 - (1 + r)^-n)`, so long terms
/// shrink towards zero instead of overflowing.
pub fn monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> MortgageResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(MortgageError::terms("principal", "Principal must be positive"));
    }
    if term_months == 0 {
        return Err(MortgageError::terms("term_months", "Term must be at least one month"));
    }
    if annual_rate < Decimal::ZERO {
        return Err(MortgageError::terms("annual_rate", "Rate cannot be negative"));
    }

    if annual_rate.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    let monthly_rate = annual_rate / Decimal::from(MONTHS_IN_YEAR);
    let discount = (Decimal::ONE / (Decimal::ONE + monthly_rate)).powi(i64::from(term_months));
    let denominator = Decimal::ONE - discount;

    if denominator.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "monthly payment annuity factor".into(),
        });
    }

    Ok(principal * monthly_rate / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_first_flow_undiscounted() {
        let cfs = vec![dec!(100), dec!(110)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        assert_eq!(result, dec!(200));
    }

    #[test]
    fn test_npv_rejects_total_loss_rate() {
        assert!(npv(dec!(-1), &[dec!(1)]).is_err());
    }

    #[test]
    fn test_npv_deep_deflation_is_an_error() {
        let cfs = vec![dec!(1000); 360];
        let err = npv(dec!(-0.2), &cfs).unwrap_err();
        assert!(matches!(
            err,
            MortgageError::InvalidInput { .. } | MortgageError::DivisionByZero { .. }
        ));
    }

    #[test]
    fn test_pmt_matches_spreadsheet_convention() {
        // PMT(0.05/12, 360, -100000) ≈ 536.82
        let result = pmt(dec!(0.05) / dec!(12), 360, dec!(-100000), Decimal::ZERO).unwrap();
        assert!((result - dec!(536.82)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_pmt_zero_periods() {
        assert!(pmt(dec!(0.01), 0, dec!(-100), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_monthly_payment_thirty_year() {
        let result = monthly_payment(dec!(200000), dec!(0.05), 360).unwrap();
        assert!((result - dec!(1073.643246)).abs() < dec!(0.000001), "got {result}");
    }

    #[test]
    fn test_monthly_payment_zero_rate() {
        let result = monthly_payment(dec!(100), Decimal::ZERO, 10).unwrap();
        assert_eq!(result, dec!(10));
    }

    #[test]
    fn test_monthly_payment_agrees_with_pmt() {
        let direct = monthly_payment(dec!(150000), dec!(0.045), 360).unwrap();
        let spreadsheet = -pmt(dec!(0.045) / dec!(12), 360, dec!(150000), Decimal::ZERO).unwrap();
        assert!((direct - spreadsheet).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_monthly_payment_invalid_terms() {
        assert!(monthly_payment(Decimal::ZERO, dec!(0.05), 360).is_err());
        assert!(monthly_payment(dec!(-1), dec!(0.05), 360).is_err());
        assert!(monthly_payment(dec!(1000), dec!(0.05), 0).is_err());
        assert!(monthly_payment(dec!(1000), dec!(-0.01), 12).is_err());
    }
}
