//! Consumers of the amortization engine: extra-payment comparisons and
//! human-readable formatting.

pub mod comparison;
pub mod format;

pub use comparison::{compare, compare_extra_payment, ComparisonInput, ExtraPaymentComparison};
pub use format::{format_currency, format_percent};
