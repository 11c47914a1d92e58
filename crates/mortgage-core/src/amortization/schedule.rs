use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rounding::{round_to_cents, zero_cents, RoundingMode};
use super::terms::LoanTerms;
use crate::types::Money;

/// One month of an amortization schedule. Field order is the column order of
/// every tabular export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPeriod {
    pub index: u32,
    pub beginning_balance: Money,
    pub scheduled_payment: Money,
    pub extra_payment: Money,
    pub interest: Money,
    pub principal_portion: Money,
    pub ending_balance: Money,
}

impl PaymentPeriod {
    /// Cash paid in the period, scheduled plus extra.
    pub fn total_payment(&self) -> Money {
        self.scheduled_payment + self.extra_payment
    }

    pub fn is_final(&self) -> bool {
        self.ending_balance.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Accruing,
    Done,
}

/// Why the loan closed in a given period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    /// The scheduled payment alone covers balance plus interest.
    Payoff,
    /// Scheduled plus extra covers it; the extra is clipped.
    ExtraPayoff,
    /// Last contractual month; any rounding residue is swept into the payment.
    Maturity,
}

/// Forward-only generator of [`PaymentPeriod`] rows for one loan.
///
/// Owns its running balance, so independent schedules never share state.
/// Yields `None` forever once the closing row has been produced.
#[derive(Debug, Clone)]
pub struct Schedule {
    terms: LoanTerms,
    balance: Money,
    index: u32,
    phase: Phase,
}

/// Start a schedule at the full principal of `terms`.
pub fn generate_schedule(terms: &LoanTerms) -> Schedule {
    debug!(
        principal = %terms.principal(),
        annual_rate = %terms.annual_rate(),
        term_months = terms.term_months(),
        scheduled_payment = %terms.scheduled_payment(),
        extra = %terms.extra_monthly_principal(),
        "generating amortization schedule"
    );
    Schedule {
        terms: *terms,
        balance: terms.principal(),
        index: 0,
        phase: Phase::Accruing,
    }
}

impl Schedule {
    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    fn closing(&self, interest: Money) -> Option<Closing> {
        let due = self.balance + interest;
        let payment = self.terms.scheduled_payment();
        if payment >= due {
            Some(Closing::Payoff)
        } else if payment + self.terms.extra_monthly_principal() >= due {
            Some(Closing::ExtraPayoff)
        } else if self.index >= self.terms.term_months() {
            Some(Closing::Maturity)
        } else {
            None
        }
    }

    fn close(&mut self, closing: Closing, interest: Money) -> PaymentPeriod {
        let balance = self.balance;
        let payment = self.terms.scheduled_payment();
        let (scheduled_payment, extra_payment, principal_portion) = match closing {
            Closing::Payoff | Closing::Maturity => (balance + interest, zero_cents(), balance),
            Closing::ExtraPayoff => (payment, balance + interest - payment, payment - interest),
        };

        self.balance = zero_cents();
        self.phase = Phase::Done;
        debug!(periods = self.index, ?closing, "schedule closed");

        PaymentPeriod {
            index: self.index,
            beginning_balance: balance,
            scheduled_payment,
            extra_payment,
            interest,
            principal_portion,
            ending_balance: zero_cents(),
        }
    }

    fn accrue(&mut self, interest: Money) -> PaymentPeriod {
        let balance = self.balance;
        let payment = self.terms.scheduled_payment();
        let extra = self.terms.extra_monthly_principal();
        let principal_portion = round_to_cents(payment - interest, RoundingMode::RoundUp);
        let ending_balance = balance - principal_portion - extra;
        self.balance = ending_balance;

        PaymentPeriod {
            index: self.index,
            beginning_balance: balance,
            scheduled_payment: payment,
            extra_payment: extra,
            interest,
            principal_portion,
            ending_balance,
        }
    }
}

impl Iterator for Schedule {
    type Item = PaymentPeriod;

    fn next(&mut self) -> Option<PaymentPeriod> {
        if self.phase == Phase::Done {
            return None;
        }

        self.index += 1;
        let interest = self.terms.interest_on(self.balance);
        let period = match self.closing(interest) {
            Some(closing) => self.close(closing, interest),
            None => self.accrue(interest),
        };

        trace!(
            index = period.index,
            interest = %period.interest,
            principal = %period.principal_portion,
            extra = %period.extra_payment,
            ending_balance = %period.ending_balance,
            "period"
        );
        Some(period)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.phase {
            Phase::Done => (0, Some(0)),
            Phase::Accruing => {
                let remaining = self.terms.term_months().saturating_sub(self.index) as usize;
                (1, Some(remaining.max(1)))
            }
        }
    }
}

impl FusedIterator for Schedule {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn collect(principal: Decimal, rate: Decimal, months: u32, extra: Decimal) -> Vec<PaymentPeriod> {
        LoanTerms::from_months(principal, rate, months, extra)
            .unwrap()
            .schedule()
            .collect()
    }

    #[test]
    fn test_first_period_split() {
        let rows = collect(dec!(200000), dec!(0.05), 360, Decimal::ZERO);
        let first = rows[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.beginning_balance, dec!(200000.00));
        assert_eq!(first.scheduled_payment, dec!(1073.65));
        assert_eq!(first.interest, dec!(833.33));
        assert_eq!(first.principal_portion, dec!(240.32));
        assert_eq!(first.ending_balance, dec!(199759.68));
    }

    #[test]
    fn test_final_payment_covers_balance_and_interest() {
        let rows = collect(dec!(200000), dec!(0.05), 360, Decimal::ZERO);
        assert_eq!(rows.len(), 360);
        let last = rows[359];
        assert_eq!(last.beginning_balance, dec!(1063.87));
        assert_eq!(last.interest, dec!(4.43));
        assert_eq!(last.principal_portion, dec!(1063.87));
        assert_eq!(last.scheduled_payment, dec!(1068.30));
        assert_eq!(last.extra_payment, Decimal::ZERO);
        assert!(last.is_final());
    }

    #[test]
    fn test_extra_payment_clipped_on_closing_row() {
        let rows = collect(dec!(160000), dec!(0.05), 360, dec!(1000));
        assert_eq!(rows.len(), 107);
        let last = rows[106];
        assert_eq!(last.beginning_balance, dec!(1514.99));
        assert_eq!(last.scheduled_payment, dec!(858.92));
        assert_eq!(last.interest, dec!(6.31));
        assert_eq!(last.principal_portion, dec!(852.61));
        assert_eq!(last.extra_payment, dec!(662.38));
        assert_eq!(last.ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_payoff_check_cancels_extra_payment() {
        // By month 8 the scheduled payment alone clears the loan, so the
        // configured extra payment is dropped for that row.
        let rows = collect(dec!(1000), dec!(0.12), 12, dec!(50));
        assert_eq!(rows.len(), 8);
        let last = rows[7];
        assert_eq!(last.beginning_balance, dec!(70.54));
        assert_eq!(last.extra_payment, Decimal::ZERO);
        assert_eq!(last.scheduled_payment, dec!(71.25));
        assert_eq!(rows[6].extra_payment, dec!(50.00));
    }

    #[test]
    fn test_maturity_sweeps_rounding_residue() {
        // Interest accrues at 0.000201 while the payment is priced at
        // 0.0002009, so the balance is not cleared by period 360.
        let rows = collect(dec!(999999), dec!(0.0002009), 360, Decimal::ZERO);
        assert_eq!(rows.len(), 360);
        assert_eq!(rows[358].scheduled_payment, dec!(2786.18));
        assert_eq!(rows[358].ending_balance, dec!(2786.75));

        let last = rows[359];
        assert_eq!(last.index, 360);
        assert_eq!(last.beginning_balance, dec!(2786.75));
        assert_eq!(last.interest, dec!(0.05));
        assert_eq!(last.scheduled_payment, last.beginning_balance + last.interest);
        assert_eq!(last.scheduled_payment, dec!(2786.80));
        assert_eq!(last.principal_portion, dec!(2786.75));
        assert_eq!(last.extra_payment, Decimal::ZERO);
        assert!(last.is_final());
    }

    #[test]
    fn test_one_cent_payment_finishes_early() {
        // The rounded-up payment is a whole cent, so a tiny balance clears
        // well before the term ends.
        let rows = collect(dec!(1), dec!(0.05), 360, Decimal::ZERO);
        assert_eq!(rows[0].scheduled_payment, dec!(0.01));
        assert_eq!(rows.len(), 100);
        assert!(rows.iter().all(|r| r.interest.is_zero()));
        assert!(rows[99].is_final());
    }

    #[test]
    fn test_zero_rate_schedule() {
        let rows = collect(dec!(100), Decimal::ZERO, 10, Decimal::ZERO);
        assert_eq!(rows.len(), 10);
        for row in &rows {
            assert_eq!(row.interest, Decimal::ZERO);
            assert_eq!(row.principal_portion, dec!(10.00));
            assert_eq!(row.scheduled_payment, dec!(10.00));
        }
        assert_eq!(rows[9].beginning_balance, dec!(10.00));
        assert_eq!(rows[9].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_single_month_loan() {
        let rows = collect(dec!(1000), dec!(0.12), 1, Decimal::ZERO);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].interest, dec!(10.00));
        assert_eq!(rows[0].scheduled_payment, dec!(1010.00));
        assert_eq!(rows[0].principal_portion, dec!(1000.00));
    }

    #[test]
    fn test_schedule_is_fused() {
        let terms = LoanTerms::from_months(dec!(100), Decimal::ZERO, 2, Decimal::ZERO).unwrap();
        let mut schedule = terms.schedule();
        assert!(schedule.next().is_some());
        assert!(schedule.next().is_some());
        assert!(schedule.next().is_none());
        assert!(schedule.next().is_none());
        assert_eq!(schedule.size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_each_call_restarts() {
        let terms = LoanTerms::new(dec!(1000), dec!(0.12), 1, Decimal::ZERO).unwrap();
        let mut first = terms.schedule();
        first.next();
        let second: Vec<_> = terms.schedule().collect();
        assert_eq!(second[0].beginning_balance, dec!(1000.00));
        assert_eq!(second.len(), 12);
    }

    #[test]
    fn test_size_hint_bounded_by_term() {
        let terms = LoanTerms::new(dec!(1000), dec!(0.12), 1, Decimal::ZERO).unwrap();
        let schedule = terms.schedule();
        assert_eq!(schedule.size_hint(), (1, Some(12)));
    }

    #[test]
    fn test_rows_serialize_in_column_order() {
        let rows = collect(dec!(100), Decimal::ZERO, 10, Decimal::ZERO);
        let json = serde_json::to_string(&rows[0]).unwrap();
        let columns = [
            "index",
            "beginning_balance",
            "scheduled_payment",
            "extra_payment",
            "interest",
            "principal_portion",
            "ending_balance",
        ];
        let positions: Vec<usize> = columns
            .iter()
            .map(|c| json.find(&format!("\"{c}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }
}
