use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::PaymentPeriod;
use super::terms::LoanTerms;
use crate::time_value::{npv, MONTHS_IN_YEAR};
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Reductions over one generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Scheduled (rounded-up) monthly payment
    pub monthly_payment: Money,
    pub annual_payment: Money,
    /// Cash paid over the life of the loan, scheduled plus extra
    pub total_payments: Money,
    pub total_interest: Money,
    pub present_value_of_payments: Money,
    pub monthly_inflation_rate: Rate,
    pub payoff_months: u32,
}

impl SummaryStatistics {
    /// Date of the closing payment when the first payment falls on
    /// `first_payment`. `None` if the date would leave chrono's range.
    pub fn payoff_date(&self, first_payment: NaiveDate) -> Option<NaiveDate> {
        let offset = self.payoff_months.saturating_sub(1);
        first_payment.checked_add_months(Months::new(offset))
    }
}

pub fn total_interest(periods: &[PaymentPeriod]) -> Money {
    periods.iter().map(|p| p.interest).sum()
}

pub fn total_paid(periods: &[PaymentPeriod]) -> Money {
    periods.iter().map(PaymentPeriod::total_payment).sum()
}

/// Present value of the payment stream. Period `i` (0-indexed) is discounted
/// by `(1 + monthly_inflation_rate)^i`, so the first payment counts in full.
pub fn present_value(periods: &[PaymentPeriod], monthly_inflation_rate: Rate) -> MortgageResult<Money> {
    let flows: Vec<Money> = periods.iter().map(PaymentPeriod::total_payment).collect();
    npv(monthly_inflation_rate, &flows)
}

/// Summarise an already generated schedule of `terms`.
pub fn summarize(
    terms: &LoanTerms,
    periods: &[PaymentPeriod],
    monthly_inflation_rate: Rate,
) -> MortgageResult<SummaryStatistics> {
    let monthly_payment = terms.scheduled_payment();
    Ok(SummaryStatistics {
        monthly_payment,
        annual_payment: monthly_payment * Decimal::from(MONTHS_IN_YEAR),
        total_payments: total_paid(periods),
        total_interest: total_interest(periods),
        present_value_of_payments: present_value(periods, monthly_inflation_rate)?,
        monthly_inflation_rate,
        payoff_months: periods.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn small_loan() -> LoanTerms {
        LoanTerms::new(dec!(1000), dec!(0.12), 1, Decimal::ZERO).unwrap()
    }

    #[test]
    fn test_summary_totals() {
        let summary = small_loan().summary(Decimal::ZERO).unwrap();
        assert_eq!(summary.monthly_payment, dec!(88.85));
        assert_eq!(summary.annual_payment, dec!(1066.20));
        assert_eq!(summary.total_interest, dec!(66.19));
        assert_eq!(summary.total_payments, dec!(1066.19));
        assert_eq!(summary.payoff_months, 12);
    }

    #[test]
    fn test_zero_inflation_present_value_is_total_paid() {
        let summary = small_loan().summary(Decimal::ZERO).unwrap();
        assert_eq!(summary.present_value_of_payments, summary.total_payments);
    }

    #[test]
    fn test_present_value_discounts_later_payments() {
        let summary = small_loan().summary(dec!(0.002)).unwrap();
        assert!(
            (summary.present_value_of_payments - dec!(1054.5629545)).abs() < dec!(0.000001),
            "got {}",
            summary.present_value_of_payments
        );
        assert!(summary.present_value_of_payments < summary.total_payments);
    }

    #[test]
    fn test_present_value_rejects_total_loss_rate() {
        assert!(small_loan().summary(dec!(-1)).is_err());
    }

    #[test]
    fn test_deep_deflation_over_full_schedule_is_an_error() {
        let terms = LoanTerms::new(dec!(200000), dec!(0.05), 30, Decimal::ZERO).unwrap();
        assert!(terms.summary(dec!(-0.2)).is_err());
    }

    #[test]
    fn test_payoff_date() {
        let summary = small_loan().summary(Decimal::ZERO).unwrap();
        let first = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert_eq!(summary.payoff_date(first), NaiveDate::from_ymd_opt(2018, 12, 1));
    }

    #[test]
    fn test_reductions_over_empty_slice() {
        assert_eq!(total_interest(&[]), Decimal::ZERO);
        assert_eq!(total_paid(&[]), Decimal::ZERO);
        assert_eq!(present_value(&[], dec!(0.01)).unwrap(), Decimal::ZERO);
    }
}
