use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use mortgage_core::amortization::{self, AmortizationInput, LoanTerms};
use mortgage_core::reporting::{self, ComparisonInput};
use mortgage_core::time_value::MONTHS_IN_YEAR;

use crate::input;

/// Loan terms shared by every command that amortizes a loan
#[derive(Args)]
pub struct LoanArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (e.g. 0.05)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub years: u32,

    /// Extra principal paid every month
    #[arg(long, default_value = "0")]
    pub extra: Decimal,
}

impl LoanArgs {
    pub fn terms(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        let principal = self.principal.ok_or("--principal is required")?;
        let rate = self.rate.ok_or("--rate is required")?;
        Ok(LoanTerms::new(principal, rate, self.years, self.extra)?)
    }
}

/// Discounting and calendar options for schedule-based commands
#[derive(Args)]
pub struct ScheduleOptions {
    /// Annual inflation rate used to discount payments (divided by 12)
    #[arg(long, default_value = "0")]
    pub annual_inflation: Decimal,

    /// Date of the first payment (YYYY-MM-DD), used to report the payoff date
    #[arg(long)]
    pub first_payment: Option<NaiveDate>,
}

impl ScheduleOptions {
    pub fn monthly_inflation_rate(&self) -> Decimal {
        self.annual_inflation / Decimal::from(MONTHS_IN_YEAR)
    }
}

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub options: ScheduleOptions,
}

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Annual inflation rate used to discount payments (divided by 12)
    #[arg(long, default_value = "0")]
    pub annual_inflation: Decimal,
}

/// Resolve a typed input from `--input`, then piped stdin, then flags.
pub fn resolve_input<T, F>(path: Option<&str>, from_flags: F) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<T, Box<dyn std::error::Error>>,
{
    if let Some(path) = path {
        debug!(path, "reading input file");
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        debug!("reading input from stdin");
        Ok(serde_json::from_value(data)?)
    } else {
        from_flags()
    }
}

fn amortization_input(args: &ScheduleArgs) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    resolve_input(args.loan.input.as_deref(), || {
        Ok(AmortizationInput {
            loan: args.loan.terms()?,
            monthly_inflation_rate: args.options.monthly_inflation_rate(),
            first_payment_date: args.options.first_payment,
        })
    })
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input = amortization_input(&args)?;
    let result = amortization::analyze_loan(&amort_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Loan summary without the per-period rows.
pub fn run_summary(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input = amortization_input(&args)?;
    let result = amortization::analyze_loan(&amort_input)?;
    let report = result.result.summary.to_string();

    let mut value = serde_json::to_value(result)?;
    if let Some(res) = value.get_mut("result").and_then(Value::as_object_mut) {
        res.remove("periods");
    }
    attach_report(&mut value, report);
    Ok(value)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cmp_input: ComparisonInput = resolve_input(args.loan.input.as_deref(), || {
        Ok(ComparisonInput {
            loan: args.loan.terms()?,
            monthly_inflation_rate: args.annual_inflation / Decimal::from(MONTHS_IN_YEAR),
        })
    })?;
    let result = reporting::compare_extra_payment(&cmp_input)?;
    let report = result.result.to_string();

    let mut value = serde_json::to_value(result)?;
    attach_report(&mut value, report);
    Ok(value)
}

pub fn attach_report(value: &mut Value, report: String) {
    if let Some(map) = value.as_object_mut() {
        map.insert("report".to_string(), Value::String(report));
    }
}
