pub mod amortization;
pub mod error;
pub mod reporting;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "housing")]
pub mod housing;

pub use amortization::{LoanTerms, PaymentPeriod, Schedule, SummaryStatistics};
pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage operations
pub type MortgageResult<T> = Result<T, MortgageError>;
