use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rounding::{round_rate, round_to_cents, RoundingMode};
use super::schedule::{generate_schedule, Schedule};
use super::summary::{summarize, SummaryStatistics};
use crate::error::MortgageError;
use crate::time_value::{monthly_payment, MONTHS_IN_YEAR};
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Immutable parameters of a fixed-rate, monthly-pay loan.
///
/// Construction validates the terms and fixes the scheduled payment for the
/// life of the loan. Principal and extra payment are normalised to whole
/// cents (rounded up) before anything else is derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LoanTermsInput")]
pub struct LoanTerms {
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
    extra_monthly_principal: Money,
    #[serde(skip_serializing)]
    monthly_payment: Money,
    #[serde(skip_serializing)]
    scheduled_payment: Money,
}

/// Wire form of [`LoanTerms`]. Accepts the term in years, months, or both
/// when they agree.
#[derive(Debug, Clone, Deserialize)]
pub struct LoanTermsInput {
    pub principal: Money,
    pub annual_rate: Rate,
    #[serde(default)]
    pub term_years: Option<u32>,
    #[serde(default)]
    pub term_months: Option<u32>,
    #[serde(default)]
    pub extra_monthly_principal: Money,
}

impl TryFrom<LoanTermsInput> for LoanTerms {
    type Error = MortgageError;

    fn try_from(input: LoanTermsInput) -> Result<Self, Self::Error> {
        let term_months = match (input.term_years, input.term_months) {
            (Some(years), None) => years_to_months(years)?,
            (None, Some(months)) => months,
            (Some(years), Some(months)) => {
                if years_to_months(years)? != months {
                    return Err(MortgageError::terms(
                        "term_months",
                        format!("{months} months disagrees with {years} years"),
                    ));
                }
                months
            }
            (None, None) => {
                return Err(MortgageError::terms(
                    "term_years",
                    "Either term_years or term_months is required",
                ))
            }
        };
        LoanTerms::from_months(
            input.principal,
            input.annual_rate,
            term_months,
            input.extra_monthly_principal,
        )
    }
}

fn years_to_months(years: u32) -> MortgageResult<u32> {
    years
        .checked_mul(MONTHS_IN_YEAR)
        .ok_or_else(|| MortgageError::terms("term_years", "Term is too long"))
}

impl LoanTerms {
    /// Terms with the loan length given in whole years.
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        term_years: u32,
        extra_monthly_principal: Money,
    ) -> MortgageResult<Self> {
        Self::from_months(
            principal,
            annual_rate,
            years_to_months(term_years)?,
            extra_monthly_principal,
        )
    }

    pub fn from_months(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        extra_monthly_principal: Money,
    ) -> MortgageResult<Self> {
        if principal <= Decimal::ZERO {
            return Err(MortgageError::terms("principal", "Principal must be positive"));
        }
        if annual_rate < Decimal::ZERO {
            return Err(MortgageError::terms("annual_rate", "Rate cannot be negative"));
        }
        if annual_rate >= Decimal::ONE {
            return Err(MortgageError::terms(
                "annual_rate",
                "Rate must be a decimal below 1 (0.05 = 5%)",
            ));
        }
        if term_months == 0 {
            return Err(MortgageError::terms("term_months", "Term must be at least one month"));
        }
        if extra_monthly_principal < Decimal::ZERO {
            return Err(MortgageError::terms(
                "extra_monthly_principal",
                "Extra payment cannot be negative",
            ));
        }

        let principal = round_to_cents(principal, RoundingMode::RoundUp);
        let extra_monthly_principal = round_to_cents(extra_monthly_principal, RoundingMode::RoundUp);
        let monthly_payment = monthly_payment(principal, annual_rate, term_months)?;
        let scheduled_payment = round_to_cents(monthly_payment, RoundingMode::RoundUp);

        let terms = Self {
            principal,
            annual_rate,
            term_months,
            extra_monthly_principal,
            monthly_payment,
            scheduled_payment,
        };

        // Every later period accrues on a smaller balance, so covering the
        // first period's interest keeps the principal portion positive.
        let first_interest = terms.interest_on(principal);
        if scheduled_payment <= first_interest {
            return Err(MortgageError::terms(
                "term_months",
                format!(
                    "Payment {scheduled_payment} does not cover first-period interest {first_interest}"
                ),
            ));
        }

        Ok(terms)
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Term in years; fractional when the month count is not a multiple of 12.
    pub fn term_years(&self) -> Decimal {
        Decimal::from(self.term_months) / Decimal::from(MONTHS_IN_YEAR)
    }

    pub fn extra_monthly_principal(&self) -> Money {
        self.extra_monthly_principal
    }

    /// `1 + r`, the monthly growth factor at the nominal rate.
    pub fn monthly_growth(&self) -> Decimal {
        Decimal::ONE + self.annual_rate / Decimal::from(MONTHS_IN_YEAR)
    }

    /// Annual rate as quoted for interest accrual, rounded to six places.
    pub fn accrual_rate(&self) -> Rate {
        round_rate(self.annual_rate)
    }

    /// Periodic rate applied to the balance each month.
    pub fn monthly_rate(&self) -> Rate {
        self.accrual_rate() / Decimal::from(MONTHS_IN_YEAR)
    }

    /// Annuity payment at full precision.
    pub fn monthly_payment(&self) -> Money {
        self.monthly_payment
    }

    /// Payment due each month, the annuity payment rounded up to the cent.
    pub fn scheduled_payment(&self) -> Money {
        self.scheduled_payment
    }

    pub fn annual_payment(&self) -> Money {
        self.monthly_payment * Decimal::from(MONTHS_IN_YEAR)
    }

    /// Contractual payments over the full term, ignoring extra principal.
    pub fn nominal_total_payment(&self) -> Money {
        self.monthly_payment * Decimal::from(self.term_months)
    }

    pub fn has_extra_payment(&self) -> bool {
        !self.extra_monthly_principal.is_zero()
    }

    /// The same loan paid strictly on schedule.
    pub fn without_extra_payment(&self) -> Self {
        Self {
            extra_monthly_principal: round_to_cents(Decimal::ZERO, RoundingMode::RoundUp),
            ..*self
        }
    }

    /// Interest accrued on `balance` over one period, rounded half-up.
    pub(crate) fn interest_on(&self, balance: Money) -> Money {
        round_to_cents(
            balance * self.accrual_rate() / Decimal::from(MONTHS_IN_YEAR),
            RoundingMode::RoundHalfUp,
        )
    }

    /// A fresh schedule starting from the full principal.
    pub fn schedule(&self) -> Schedule {
        generate_schedule(self)
    }

    /// Regenerate the schedule and reduce it to summary figures.
    pub fn summary(&self, monthly_inflation_rate: Rate) -> MortgageResult<SummaryStatistics> {
        let periods: Vec<_> = self.schedule().collect();
        summarize(self, &periods, monthly_inflation_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_converts_years() {
        let terms = LoanTerms::new(dec!(200000), dec!(0.05), 30, Decimal::ZERO).unwrap();
        assert_eq!(terms.term_months(), 360);
        assert_eq!(terms.term_years(), dec!(30));
        assert!(!terms.has_extra_payment());
    }

    #[test]
    fn test_scheduled_payment_rounds_up() {
        let terms = LoanTerms::new(dec!(200000), dec!(0.05), 30, Decimal::ZERO).unwrap();
        assert!(terms.monthly_payment() < dec!(1073.65));
        assert_eq!(terms.scheduled_payment(), dec!(1073.65));
    }

    #[test]
    fn test_principal_normalised_to_cents() {
        let terms = LoanTerms::from_months(dec!(1000.001), dec!(0.05), 12, dec!(10.001)).unwrap();
        assert_eq!(terms.principal(), dec!(1000.01));
        assert_eq!(terms.extra_monthly_principal(), dec!(10.01));
    }

    #[test]
    fn test_rate_quoted_to_six_places() {
        let terms = LoanTerms::new(dec!(100000), dec!(0.0412345678), 30, Decimal::ZERO).unwrap();
        assert_eq!(terms.accrual_rate(), dec!(0.041235));
        assert_eq!(terms.monthly_rate(), dec!(0.041235) / dec!(12));
    }

    #[test]
    fn test_nominal_figures() {
        let terms = LoanTerms::from_months(dec!(100), Decimal::ZERO, 10, Decimal::ZERO).unwrap();
        assert_eq!(terms.annual_payment(), dec!(120));
        assert_eq!(terms.nominal_total_payment(), dec!(100));
        assert_eq!(terms.monthly_growth(), Decimal::ONE);
    }

    #[test]
    fn test_invalid_terms() {
        assert!(LoanTerms::new(Decimal::ZERO, dec!(0.05), 30, Decimal::ZERO).is_err());
        assert!(LoanTerms::new(dec!(-5), dec!(0.05), 30, Decimal::ZERO).is_err());
        assert!(LoanTerms::new(dec!(1000), dec!(-0.01), 30, Decimal::ZERO).is_err());
        assert!(LoanTerms::new(dec!(1000), dec!(1), 30, Decimal::ZERO).is_err());
        assert!(LoanTerms::new(dec!(1000), dec!(0.05), 0, Decimal::ZERO).is_err());
        assert!(LoanTerms::new(dec!(1000), dec!(0.05), 30, dec!(-1)).is_err());
    }

    #[test]
    fn test_invalid_terms_error_names_field() {
        let err = LoanTerms::new(Decimal::ZERO, dec!(0.05), 30, Decimal::ZERO).unwrap_err();
        match err {
            MortgageError::InvalidTerms { field, .. } => assert_eq!(field, "principal"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_without_extra_payment() {
        let terms = LoanTerms::new(dec!(160000), dec!(0.05), 30, dec!(1000)).unwrap();
        let plain = terms.without_extra_payment();
        assert!(terms.has_extra_payment());
        assert!(!plain.has_extra_payment());
        assert_eq!(plain.scheduled_payment(), terms.scheduled_payment());
    }

    #[test]
    fn test_deserialize_from_years() {
        let terms: LoanTerms = serde_json::from_str(
            r#"{"principal": "200000", "annual_rate": "0.05", "term_years": 30}"#,
        )
        .unwrap();
        assert_eq!(terms.term_months(), 360);
        assert_eq!(terms.extra_monthly_principal(), Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_validates() {
        let result: Result<LoanTerms, _> = serde_json::from_str(
            r#"{"principal": "0", "annual_rate": "0.05", "term_months": 360}"#,
        );
        assert!(result.is_err());

        let result: Result<LoanTerms, _> = serde_json::from_str(
            r#"{"principal": "1000", "annual_rate": "0.05", "term_years": 30, "term_months": 300}"#,
        );
        assert!(result.is_err());

        let result: Result<LoanTerms, _> =
            serde_json::from_str(r#"{"principal": "1000", "annual_rate": "0.05"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_omits_derived_payment() {
        let terms = LoanTerms::new(dec!(1000), dec!(0.12), 1, Decimal::ZERO).unwrap();
        let value = serde_json::to_value(terms).unwrap();
        assert!(value.get("scheduled_payment").is_none());
        assert_eq!(value["term_months"], 12);
    }
}
