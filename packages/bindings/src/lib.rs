use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::amortization::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_extra_payment(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::reporting::ComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_core::reporting::compare_extra_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn payment_sensitivity(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::scenarios::sensitivity::PaymentSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::scenarios::sensitivity::payment_sensitivity(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Housing
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_piti(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::housing::all_in::PitiInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::housing::all_in::monthly_piti(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn all_in_rate_table(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::housing::all_in::AllInRateTableInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_core::housing::all_in::all_in_rate_table(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rent_equivalent(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::housing::all_in::RentEquivalentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::housing::all_in::rent_equivalent(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn affordability(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::housing::all_in::AffordabilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::housing::all_in::affordability(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
