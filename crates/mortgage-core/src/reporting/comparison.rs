use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use super::format::{format_currency, format_percent};
use crate::amortization::{LoanTerms, SummaryStatistics};
use crate::types::*;
use crate::MortgageResult;

/// Input for comparing a loan with and without its extra payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub loan: LoanTerms,
    #[serde(default)]
    pub monthly_inflation_rate: Rate,
}

/// Effect of the extra monthly principal on one loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPaymentComparison {
    pub extra_monthly_principal: Money,
    pub interest_saved: Money,
    pub months_saved: u32,
    pub total_paid_saved: Money,
    pub present_value_saved: Money,
    pub baseline: SummaryStatistics,
    pub accelerated: SummaryStatistics,
}

/// Summaries for the loan as given and for the same loan with no extra
/// payment, and the differences between them.
pub fn compare(terms: &LoanTerms, monthly_inflation_rate: Rate) -> MortgageResult<ExtraPaymentComparison> {
    let baseline = terms.without_extra_payment().summary(monthly_inflation_rate)?;
    let accelerated = terms.summary(monthly_inflation_rate)?;

    Ok(ExtraPaymentComparison {
        extra_monthly_principal: terms.extra_monthly_principal(),
        interest_saved: baseline.total_interest - accelerated.total_interest,
        months_saved: baseline.payoff_months.saturating_sub(accelerated.payoff_months),
        total_paid_saved: baseline.total_payments - accelerated.total_payments,
        present_value_saved: baseline.present_value_of_payments
            - accelerated.present_value_of_payments,
        baseline,
        accelerated,
    })
}

/// Compare the loan with and without its extra payment.
pub fn compare_extra_payment(
    input: &ComparisonInput,
) -> MortgageResult<ComputationOutput<ExtraPaymentComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if !input.loan.has_extra_payment() {
        warnings.push("No extra monthly principal; both schedules are identical".into());
    }

    let comparison = compare(&input.loan, input.monthly_inflation_rate)?;

    if comparison.present_value_saved < Decimal::ZERO {
        warnings.push("Paying early raises the present value of payments at this inflation rate".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra principal comparison (baseline vs accelerated schedule)",
        &serde_json::json!({
            "principal": input.loan.principal().to_string(),
            "annual_rate": input.loan.annual_rate().to_string(),
            "term_months": input.loan.term_months(),
            "extra_monthly_principal": input.loan.extra_monthly_principal().to_string(),
            "monthly_inflation_rate": input.monthly_inflation_rate.to_string(),
        }),
        warnings,
        elapsed,
        comparison,
    ))
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monthly payment:      {}", format_currency(self.monthly_payment))?;
        writeln!(f, "Annual payment:       {}", format_currency(self.annual_payment))?;
        writeln!(f, "Total payments:       {}", format_currency(self.total_payments))?;
        writeln!(f, "Total interest:       {}", format_currency(self.total_interest))?;
        writeln!(
            f,
            "Present value:        {} at {} monthly inflation",
            format_currency(self.present_value_of_payments),
            format_percent(self.monthly_inflation_rate)
        )?;
        write!(f, "Payoff:               {} months", self.payoff_months)
    }
}

impl fmt::Display for ExtraPaymentComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Paying {} extra each month saves {} of interest and {} months.",
            format_currency(self.extra_monthly_principal),
            format_currency(self.interest_saved),
            self.months_saved
        )?;
        writeln!(
            f,
            "Present value of payments drops by {}.",
            format_currency(self.present_value_saved)
        )?;
        writeln!(f)?;
        writeln!(f, "Baseline")?;
        writeln!(f, "{}", self.baseline)?;
        writeln!(f)?;
        writeln!(f, "With extra principal")?;
        write!(f, "{}", self.accelerated)
    }
}
