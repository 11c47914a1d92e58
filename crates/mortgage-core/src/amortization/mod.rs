//! Fixed-rate loan amortization: terms, the per-period schedule generator and
//! reductions over the generated schedule.

pub mod analysis;
pub mod rounding;
pub mod schedule;
pub mod summary;
pub mod terms;

pub use analysis::{analyze_loan, AmortizationInput, AmortizationOutput};
pub use rounding::{round_to_cents, RoundingMode};
pub use schedule::{generate_schedule, PaymentPeriod, Schedule};
pub use summary::{present_value, summarize, SummaryStatistics};
pub use terms::{LoanTerms, LoanTermsInput};
