use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{round_to_cents, LoanTerms, RoundingMode};
use crate::error::MortgageError;
use crate::time_value::{pmt, MONTHS_IN_YEAR};
use crate::types::*;
use crate::MortgageResult;

/// Price, annual property-tax rate and annual insurance rate of a house, as
/// supplied by whatever looks up local tax tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCosts {
    pub price: Money,
    /// Annual property tax as a fraction of price
    pub tax_rate: Rate,
    /// Annual homeowner's insurance as a fraction of price
    pub insurance_rate: Rate,
}

impl PropertyCosts {
    fn validate(&self) -> MortgageResult<()> {
        if self.price <= Decimal::ZERO {
            return Err(MortgageError::input("price", "Price must be positive"));
        }
        check_non_negative("tax_rate", self.tax_rate)?;
        check_non_negative("insurance_rate", self.insurance_rate)
    }

    fn carrying_rate(&self) -> Rate {
        self.tax_rate + self.insurance_rate
    }
}

fn check_non_negative(field: &str, value: Decimal) -> MortgageResult<()> {
    if value < Decimal::ZERO {
        return Err(MortgageError::input(field, "Must not be negative"));
    }
    Ok(())
}

fn check_positive(field: &str, value: Decimal) -> MortgageResult<()> {
    if value <= Decimal::ZERO {
        return Err(MortgageError::input(field, "Must be positive"));
    }
    Ok(())
}

fn check_fraction(field: &str, value: Decimal) -> MortgageResult<()> {
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(MortgageError::input(field, "Must be in (0, 1]"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PITI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitiInput {
    pub loan: LoanTerms,
    pub property: PropertyCosts,
}

/// Monthly principal, interest, taxes and insurance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitiBreakdown {
    pub principal_and_interest: Money,
    pub taxes: Money,
    pub insurance: Money,
    pub total: Money,
    /// Twelve months of PITI as a fraction of price
    pub all_in_annual_rate: Rate,
    pub loan_to_value: Rate,
}

pub fn monthly_piti(input: &PitiInput) -> MortgageResult<ComputationOutput<PitiBreakdown>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let property = &input.property;
    property.validate()?;

    let months = Decimal::from(MONTHS_IN_YEAR);
    let principal_and_interest = input.loan.scheduled_payment();
    let taxes = round_to_cents(property.price * property.tax_rate / months, RoundingMode::RoundHalfUp);
    let insurance = round_to_cents(
        property.price * property.insurance_rate / months,
        RoundingMode::RoundHalfUp,
    );
    let total = principal_and_interest + taxes + insurance;
    let loan_to_value = input.loan.principal() / property.price;

    if loan_to_value > Decimal::ONE {
        warnings.push(format!("Loan exceeds the property price (LTV {loan_to_value:.4})"));
    }
    if input.loan.has_extra_payment() {
        warnings.push("Extra monthly principal is not part of PITI".into());
    }

    let output = PitiBreakdown {
        principal_and_interest,
        taxes,
        insurance,
        total,
        all_in_annual_rate: total * months / property.price,
        loan_to_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly PITI (scheduled payment + 1/12 annual tax and insurance)",
        &serde_json::json!({
            "price": property.price.to_string(),
            "tax_rate": property.tax_rate.to_string(),
            "insurance_rate": property.insurance_rate.to_string(),
            "principal": input.loan.principal().to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// All-in rate table
// ---------------------------------------------------------------------------

fn default_term_months() -> u32 {
    360
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllInRateTableInput {
    pub rates: Vec<Rate>,
    #[serde(default = "default_term_months")]
    pub term_months: u32,
    pub tax_rate: Rate,
    pub insurance_rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllInRateRow {
    pub annual_rate: Rate,
    /// Twelve months of principal and interest per unit borrowed
    pub principal_and_interest_rate: Rate,
    /// `principal_and_interest_rate / annual_rate`; absent at a zero rate
    pub principal_and_interest_multiple: Option<Decimal>,
    pub all_in_rate: Rate,
    pub all_in_multiple: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllInRateTable {
    pub rows: Vec<AllInRateRow>,
}

/// Annual carrying cost per unit borrowed at each rate, with and without
/// taxes and insurance.
pub fn all_in_rate_table(
    input: &AllInRateTableInput,
) -> MortgageResult<ComputationOutput<AllInRateTable>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.rates.is_empty() {
        return Err(MortgageError::input("rates", "At least one rate is required"));
    }
    check_non_negative("tax_rate", input.tax_rate)?;
    check_non_negative("insurance_rate", input.insurance_rate)?;

    let months = Decimal::from(MONTHS_IN_YEAR);
    let carrying = input.tax_rate + input.insurance_rate;
    let mut rows = Vec::with_capacity(input.rates.len());

    for &annual_rate in &input.rates {
        check_non_negative("rates", annual_rate)?;
        let monthly = pmt(annual_rate / months, input.term_months, dec!(-1), Decimal::ZERO)?;
        let principal_and_interest_rate = monthly * months;
        let all_in_rate = principal_and_interest_rate + carrying;
        let multiple = |value: Decimal| (!annual_rate.is_zero()).then(|| value / annual_rate);

        rows.push(AllInRateRow {
            annual_rate,
            principal_and_interest_rate,
            principal_and_interest_multiple: multiple(principal_and_interest_rate),
            all_in_rate,
            all_in_multiple: multiple(all_in_rate),
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "All-in annual cost per unit borrowed (P&I + tax + insurance)",
        &serde_json::json!({
            "term_months": input.term_months,
            "tax_rate": input.tax_rate.to_string(),
            "insurance_rate": input.insurance_rate.to_string(),
        }),
        warnings,
        elapsed,
        AllInRateTable { rows },
    ))
}

// ---------------------------------------------------------------------------
// Rent equivalence and affordability
// ---------------------------------------------------------------------------

/// All-in annual rate for 30 years at 4% with 3% tax and 1% insurance.
pub const DEFAULT_CAP_RATE: Rate = dec!(0.1003);

fn default_cap_rate() -> Rate {
    DEFAULT_CAP_RATE
}

fn default_loan_to_value() -> Rate {
    dec!(0.80)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentEquivalentInput {
    pub monthly_rent: Money,
    /// All-in annual carrying cost per unit borrowed
    #[serde(default = "default_cap_rate")]
    pub cap_rate: Rate,
    #[serde(default = "default_loan_to_value")]
    pub loan_to_value: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentEquivalentOutput {
    pub annual_rent: Money,
    pub equivalent_loan: Money,
    pub equivalent_price: Money,
}

/// House price whose all-in payments equal the current rent.
pub fn rent_equivalent(
    input: &RentEquivalentInput,
) -> MortgageResult<ComputationOutput<RentEquivalentOutput>> {
    let start = Instant::now();
    check_positive("monthly_rent", input.monthly_rent)?;
    check_positive("cap_rate", input.cap_rate)?;
    check_fraction("loan_to_value", input.loan_to_value)?;

    let annual_rent = input.monthly_rent * Decimal::from(MONTHS_IN_YEAR);
    let equivalent_loan = annual_rent / input.cap_rate;
    let equivalent_price = equivalent_loan / input.loan_to_value;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rent equivalence (annual rent / all-in rate / LTV)",
        &serde_json::json!({
            "cap_rate": input.cap_rate.to_string(),
            "loan_to_value": input.loan_to_value.to_string(),
        }),
        Vec::new(),
        elapsed,
        RentEquivalentOutput {
            annual_rent,
            equivalent_loan,
            equivalent_price,
        },
    ))
}

fn default_debt_to_income() -> Rate {
    dec!(0.20)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub annual_income: Money,
    /// Share of income available for housing payments
    #[serde(default = "default_debt_to_income")]
    pub debt_to_income: Rate,
    #[serde(default = "default_cap_rate")]
    pub cap_rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub annual_housing_budget: Money,
    pub affordable_value: Money,
}

/// Largest all-in financed value an income supports at a debt-to-income cap.
pub fn affordability(
    input: &AffordabilityInput,
) -> MortgageResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    check_positive("annual_income", input.annual_income)?;
    check_fraction("debt_to_income", input.debt_to_income)?;
    check_positive("cap_rate", input.cap_rate)?;

    if input.debt_to_income > dec!(0.43) {
        warnings.push("Debt-to-income above 43% exceeds common underwriting limits".into());
    }

    let annual_housing_budget = input.annual_income * input.debt_to_income;
    let affordable_value = annual_housing_budget / input.cap_rate;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Affordability (income x DTI / all-in rate)",
        &serde_json::json!({
            "debt_to_income": input.debt_to_income.to_string(),
            "cap_rate": input.cap_rate.to_string(),
        }),
        warnings,
        elapsed,
        AffordabilityOutput {
            annual_housing_budget,
            affordable_value,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::{format_currency, format_percent};
    use rust_decimal_macros::dec;

    fn piti_input() -> PitiInput {
        PitiInput {
            loan: LoanTerms::new(dec!(160000), dec!(0.05), 30, Decimal::ZERO).unwrap(),
            property: PropertyCosts {
                price: dec!(200000),
                tax_rate: dec!(0.033),
                insurance_rate: dec!(0.01),
            },
        }
    }

    #[test]
    fn test_monthly_piti() {
        let result = monthly_piti(&piti_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.principal_and_interest, dec!(858.92));
        assert_eq!(out.taxes, dec!(550.00));
        assert_eq!(out.insurance, dec!(166.67));
        assert_eq!(out.total, dec!(1575.59));
        assert_eq!(out.loan_to_value, dec!(0.8));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_piti_warns_on_high_ltv() {
        let mut input = piti_input();
        input.property.price = dec!(150000);
        let result = monthly_piti(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_piti_rejects_bad_property() {
        let mut input = piti_input();
        input.property.tax_rate = dec!(-0.01);
        assert!(monthly_piti(&input).is_err());
        input.property.tax_rate = dec!(0.01);
        input.property.price = Decimal::ZERO;
        assert!(monthly_piti(&input).is_err());
    }

    #[test]
    fn test_all_in_rate_table() {
        let input = AllInRateTableInput {
            rates: vec![dec!(0.04), dec!(0.05)],
            term_months: 360,
            tax_rate: dec!(0.033),
            insurance_rate: dec!(0.01),
        };
        let result = all_in_rate_table(&input).unwrap();
        let row = &result.result.rows[0];
        assert_eq!(format_percent(row.principal_and_interest_rate), "5.73%");
        assert_eq!(format_percent(row.all_in_rate), "10.03%");
        let multiple = row.principal_and_interest_multiple.unwrap();
        assert!((multiple - dec!(1.432)).abs() < dec!(0.001), "got {multiple}");
        assert!(result.result.rows[1].all_in_rate > row.all_in_rate);
    }

    #[test]
    fn test_all_in_rate_table_zero_rate() {
        let input = AllInRateTableInput {
            rates: vec![Decimal::ZERO],
            term_months: 360,
            tax_rate: Decimal::ZERO,
            insurance_rate: Decimal::ZERO,
        };
        let result = all_in_rate_table(&input).unwrap();
        let row = &result.result.rows[0];
        assert!((row.principal_and_interest_rate - dec!(0.0333333)).abs() < dec!(0.0000001));
        assert!(row.all_in_multiple.is_none());
    }

    #[test]
    fn test_rent_equivalent() {
        let input = RentEquivalentInput {
            monthly_rent: dec!(1035),
            cap_rate: DEFAULT_CAP_RATE,
            loan_to_value: dec!(0.80),
        };
        let out = rent_equivalent(&input).unwrap().result;
        assert_eq!(out.annual_rent, dec!(12420));
        assert_eq!(format_currency(out.equivalent_price), "$154,786");
    }

    #[test]
    fn test_affordability() {
        let input = AffordabilityInput {
            annual_income: dec!(60000),
            debt_to_income: dec!(0.20),
            cap_rate: DEFAULT_CAP_RATE,
        };
        let result = affordability(&input).unwrap();
        assert_eq!(result.result.annual_housing_budget, dec!(12000));
        assert_eq!(format_currency(result.result.affordable_value), "$119,641");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_defaults_from_json() {
        let input: RentEquivalentInput = serde_json::from_str(r#"{"monthly_rent": "1000"}"#).unwrap();
        assert_eq!(input.cap_rate, DEFAULT_CAP_RATE);
        assert_eq!(input.loan_to_value, dec!(0.80));

        let input: AffordabilityInput =
            serde_json::from_str(r#"{"annual_income": "65000", "debt_to_income": "0.5"}"#).unwrap();
        assert_eq!(affordability(&input).unwrap().warnings.len(), 1);
    }

    #[test]
    fn test_invalid_fractions() {
        let input = RentEquivalentInput {
            monthly_rent: dec!(1000),
            cap_rate: DEFAULT_CAP_RATE,
            loan_to_value: dec!(1.2),
        };
        assert!(rent_equivalent(&input).is_err());
    }
}
