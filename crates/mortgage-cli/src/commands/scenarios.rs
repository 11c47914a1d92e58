use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::scenarios::sensitivity::{self, PaymentSensitivityInput, SensitivityMetric};
use mortgage_core::SensitivityVariable;

use super::amortization::{resolve_input, LoanArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    MonthlyPayment,
    TotalInterest,
    TotalPaid,
    PayoffMonths,
}

impl From<MetricArg> for SensitivityMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::MonthlyPayment => SensitivityMetric::MonthlyPayment,
            MetricArg::TotalInterest => SensitivityMetric::TotalInterest,
            MetricArg::TotalPaid => SensitivityMetric::TotalPaid,
            MetricArg::PayoffMonths => SensitivityMetric::PayoffMonths,
        }
    }
}

/// Arguments for the principal x rate sensitivity grid
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Loan figure to evaluate in each cell
    #[arg(long, value_enum, default_value = "monthly-payment")]
    pub metric: MetricArg,

    /// Principal sweep in format min:max:step (e.g. "150000:200000:25000")
    #[arg(long)]
    pub principal_sweep: Option<String>,

    /// Rate sweep in format min:max:step (e.g. "0.045:0.06:0.0075")
    #[arg(long)]
    pub rate_sweep: Option<String>,
}

fn parse_sweep(name: &str, sweep: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = sweep.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Sweep must be min:max:step, got '{}'", sweep).into());
    }
    Ok(SensitivityVariable {
        name: name.to_string(),
        min: parts[0].trim().parse::<Decimal>()?,
        max: parts[1].trim().parse::<Decimal>()?,
        step: parts[2].trim().parse::<Decimal>()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: PaymentSensitivityInput = resolve_input(args.loan.input.as_deref(), || {
        Ok(PaymentSensitivityInput {
            loan: args.loan.terms()?,
            principal_sweep: args
                .principal_sweep
                .as_deref()
                .map(|s| parse_sweep("principal", s))
                .transpose()?,
            rate_sweep: args
                .rate_sweep
                .as_deref()
                .map(|s| parse_sweep("annual_rate", s))
                .transpose()?,
            metric: args.metric.into(),
        })
    })?;
    let result = sensitivity::payment_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_sweep() {
        let var = parse_sweep("principal", "150000:200000:25000").unwrap();
        assert_eq!(var.name, "principal");
        assert_eq!(var.min, dec!(150000));
        assert_eq!(var.max, dec!(200000));
        assert_eq!(var.step, dec!(25000));
    }

    #[test]
    fn test_parse_sweep_rejects_wrong_arity() {
        assert!(parse_sweep("annual_rate", "0.04:0.06").is_err());
        assert!(parse_sweep("annual_rate", "a:b:c").is_err());
    }
}
