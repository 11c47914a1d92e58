use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::LoanTerms;
use crate::error::MortgageError;
use crate::types::*;
use crate::MortgageResult;

/// Sweep points allowed per variable.
const MAX_SWEEP_POINTS: usize = 500;

/// Loan figure evaluated in each cell of the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMetric {
    #[default]
    MonthlyPayment,
    TotalInterest,
    TotalPaid,
    PayoffMonths,
}

impl SensitivityMetric {
    fn evaluate(self, terms: &LoanTerms) -> MortgageResult<Decimal> {
        let summary = terms.summary(Decimal::ZERO)?;
        Ok(match self {
            SensitivityMetric::MonthlyPayment => summary.monthly_payment,
            SensitivityMetric::TotalInterest => summary.total_interest,
            SensitivityMetric::TotalPaid => summary.total_payments,
            SensitivityMetric::PayoffMonths => Decimal::from(summary.payoff_months),
        })
    }
}

/// Input for a principal x rate sensitivity grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSensitivityInput {
    /// Base case loan; term and extra payment are held fixed
    pub loan: LoanTerms,
    /// Defaults to the base principal plus 0, 25,000 and 50,000
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_sweep: Option<SensitivityVariable>,
    /// Defaults to the base rate plus 0, 0.75% and 1.50%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_sweep: Option<SensitivityVariable>,
    #[serde(default)]
    pub metric: SensitivityMetric,
}

/// Output of the principal x rate grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSensitivityOutput {
    pub metric: SensitivityMetric,
    pub principal_values: Vec<Decimal>,
    pub rate_values: Vec<Decimal>,
    /// Matrix[i][j] = metric at principal_values[i], rate_values[j]
    pub matrix: Vec<Vec<Decimal>>,
    pub base_case_value: Decimal,
    /// Position of the base case in the matrix (row, col)
    pub base_case_position: (usize, usize),
}

fn default_principal_sweep(loan: &LoanTerms) -> SensitivityVariable {
    SensitivityVariable {
        name: "principal".into(),
        min: loan.principal(),
        max: loan.principal() + dec!(50000),
        step: dec!(25000),
    }
}

fn default_rate_sweep(loan: &LoanTerms) -> SensitivityVariable {
    SensitivityVariable {
        name: "annual_rate".into(),
        min: loan.annual_rate(),
        max: loan.annual_rate() + dec!(0.015),
        step: dec!(0.0075),
    }
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> MortgageResult<Vec<Decimal>> {
    let field = format!("variable:{}", var.name);
    if var.step <= Decimal::ZERO {
        return Err(MortgageError::input(&field, "Step must be positive"));
    }
    if var.min > var.max {
        return Err(MortgageError::input(&field, "Min must be <= max"));
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        if values.len() == MAX_SWEEP_POINTS {
            return Err(MortgageError::input(
                &field,
                format!("Sweep exceeds {MAX_SWEEP_POINTS} points"),
            ));
        }
        values.push(current);
        current += var.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Evaluate `input.metric` for every principal/rate combination.
///
/// Cells whose terms are invalid are reported as warnings and hold zero.
pub fn payment_sensitivity(
    input: &PaymentSensitivityInput,
) -> MortgageResult<ComputationOutput<PaymentSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let loan = &input.loan;

    let principal_var = input
        .principal_sweep
        .clone()
        .unwrap_or_else(|| default_principal_sweep(loan));
    let rate_var = input
        .rate_sweep
        .clone()
        .unwrap_or_else(|| default_rate_sweep(loan));

    let principal_values = generate_sweep_values(&principal_var)?;
    let rate_values = generate_sweep_values(&rate_var)?;
    debug!(
        rows = principal_values.len(),
        cols = rate_values.len(),
        metric = ?input.metric,
        "evaluating sensitivity grid"
    );

    let mut matrix = Vec::with_capacity(principal_values.len());
    for principal in &principal_values {
        let mut row = Vec::with_capacity(rate_values.len());
        for rate in &rate_values {
            let cell = LoanTerms::from_months(
                *principal,
                *rate,
                loan.term_months(),
                loan.extra_monthly_principal(),
            )
            .and_then(|terms| input.metric.evaluate(&terms));
            match cell {
                Ok(val) => row.push(val),
                Err(e) => {
                    warnings.push(format!("Evaluation failed at ({principal}, {rate}): {e}"));
                    row.push(Decimal::ZERO);
                }
            }
        }
        matrix.push(row);
    }

    let base_row = closest_index(&principal_values, loan.principal());
    let base_col = closest_index(&rate_values, loan.annual_rate());
    let base_case_value = matrix[base_row][base_col];

    let output = PaymentSensitivityOutput {
        metric: input.metric,
        principal_values,
        rate_values,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Principal x Rate Sensitivity Grid",
        &serde_json::json!({
            "principal": principal_var,
            "annual_rate": rate_var,
            "term_months": loan.term_months(),
            "metric": input.metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
