use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use mortgage_core::housing::all_in::{
    self, AffordabilityInput, AllInRateTableInput, PitiInput, PropertyCosts,
    RentEquivalentInput, DEFAULT_CAP_RATE,
};

use super::amortization::{resolve_input, LoanArgs};

#[derive(Args)]
pub struct AllInArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated annual rates (e.g. "0.04,0.05,0.06")
    #[arg(long, value_delimiter = ',')]
    pub rates: Vec<Decimal>,

    /// Loan term in months
    #[arg(long, default_value = "360")]
    pub term_months: u32,

    /// Annual property tax as a fraction of price
    #[arg(long, default_value = "0.033")]
    pub tax_rate: Decimal,

    /// Annual insurance as a fraction of price
    #[arg(long, default_value = "0.01")]
    pub insurance_rate: Decimal,
}

#[derive(Args)]
pub struct PitiArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Purchase price of the property
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Annual property tax as a fraction of price
    #[arg(long, default_value = "0.033")]
    pub tax_rate: Decimal,

    /// Annual insurance as a fraction of price
    #[arg(long, default_value = "0.01")]
    pub insurance_rate: Decimal,
}

#[derive(Args)]
pub struct RentEquivalentArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Current monthly rent
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// All-in annual carrying cost per unit borrowed
    #[arg(long)]
    pub cap_rate: Option<Decimal>,

    /// Loan-to-value ratio
    #[arg(long, default_value = "0.80")]
    pub ltv: Decimal,
}

#[derive(Args)]
pub struct AffordArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Gross annual income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Share of income available for housing
    #[arg(long, default_value = "0.20")]
    pub dti: Decimal,

    /// All-in annual carrying cost per unit borrowed
    #[arg(long)]
    pub cap_rate: Option<Decimal>,
}

pub fn run_all_in(args: AllInArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table_input: AllInRateTableInput = resolve_input(args.input.as_deref(), || {
        let rates = if args.rates.is_empty() {
            vec![dec!(0.04), dec!(0.05), dec!(0.06), dec!(0.07)]
        } else {
            args.rates.clone()
        };
        Ok(AllInRateTableInput {
            rates,
            term_months: args.term_months,
            tax_rate: args.tax_rate,
            insurance_rate: args.insurance_rate,
        })
    })?;
    let result = all_in::all_in_rate_table(&table_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_piti(args: PitiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let piti_input: PitiInput = resolve_input(args.loan.input.as_deref(), || {
        Ok(PitiInput {
            loan: args.loan.terms()?,
            property: PropertyCosts {
                price: args.price.ok_or("--price is required")?,
                tax_rate: args.tax_rate,
                insurance_rate: args.insurance_rate,
            },
        })
    })?;
    let result = all_in::monthly_piti(&piti_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rent_equivalent(args: RentEquivalentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rent_input: RentEquivalentInput = resolve_input(args.input.as_deref(), || {
        Ok(RentEquivalentInput {
            monthly_rent: args.rent.ok_or("--rent is required")?,
            cap_rate: args.cap_rate.unwrap_or(DEFAULT_CAP_RATE),
            loan_to_value: args.ltv,
        })
    })?;
    let result = all_in::rent_equivalent(&rent_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_afford(args: AffordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = resolve_input(args.input.as_deref(), || {
        Ok(AffordabilityInput {
            annual_income: args.income.ok_or("--income is required")?,
            debt_to_income: args.dti,
            cap_rate: args.cap_rate.unwrap_or(DEFAULT_CAP_RATE),
        })
    })?;
    let result = all_in::affordability(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}
