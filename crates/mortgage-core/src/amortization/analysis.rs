use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::PaymentPeriod;
use super::summary::{summarize, SummaryStatistics};
use super::terms::LoanTerms;
use crate::types::*;
use crate::MortgageResult;

/// Input for a full loan analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub loan: LoanTerms,
    /// Discount rate per month for the present value of payments
    #[serde(default)]
    pub monthly_inflation_rate: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

/// Schedule plus summary for one loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub terms: LoanTerms,
    /// Annuity payment before rounding
    pub monthly_payment: Money,
    pub scheduled_payment: Money,
    pub summary: SummaryStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub periods: Vec<PaymentPeriod>,
}

/// Generate the schedule for `input.loan` and summarise it.
pub fn analyze_loan(input: &AmortizationInput) -> MortgageResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let terms = input.loan;

    let periods: Vec<PaymentPeriod> = terms.schedule().collect();
    let summary = summarize(&terms, &periods, input.monthly_inflation_rate)?;

    if let Some(last) = periods.last() {
        let residue = last.scheduled_payment - terms.scheduled_payment();
        if residue > Decimal::ZERO {
            warnings.push(format!(
                "Final payment exceeds the scheduled payment by {residue} of accumulated rounding"
            ));
        }
    }
    if input.monthly_inflation_rate < Decimal::ZERO {
        warnings.push("Negative inflation rate inflates the present value of payments".into());
    }

    let payoff_date = match input.first_payment_date {
        Some(first) => {
            let date = summary.payoff_date(first);
            if date.is_none() {
                warnings.push("Payoff date is outside the supported calendar range".into());
            }
            date
        }
        None => None,
    };

    let output = AmortizationOutput {
        terms,
        monthly_payment: terms.monthly_payment(),
        scheduled_payment: terms.scheduled_payment(),
        summary,
        payoff_date,
        periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate monthly amortization (payment rounded up, interest rounded half-up)",
        &serde_json::json!({
            "principal": terms.principal().to_string(),
            "annual_rate": terms.annual_rate().to_string(),
            "accrual_rate": terms.accrual_rate().to_string(),
            "term_months": terms.term_months(),
            "extra_monthly_principal": terms.extra_monthly_principal().to_string(),
            "monthly_inflation_rate": input.monthly_inflation_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
