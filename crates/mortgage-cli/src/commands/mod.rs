pub mod amortization;
pub mod housing;
pub mod scenarios;
