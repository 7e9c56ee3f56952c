use chrono::NaiveDate;
use log::trace;
use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InterestMethod {
    Simple,
    CompoundMonthly,
    DecliningBalance,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Frequency {
    Monthly,
    Quarterly,
}

impl Frequency {
    fn period_days(&self) -> u64 {
        match self {
            Frequency::Monthly => 30,
            Frequency::Quarterly => 90,
        }
    }

    fn periods(&self, tenure_months: u32) -> u32 {
        match self {
            Frequency::Monthly => tenure_months,
            Frequency::Quarterly => tenure_months / 3,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryStatus {
    NotDue,
    Due,
    PartiallyPaid,
    Paid,
    Overdue,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScheduleStatus {
    Pending,
    Active,
    Completed,
}

#[derive(Error, Debug, PartialEq)]
pub enum ScheduleError {
    #[error("tenure of {tenure_months} months yields no {frequency} periods")]
    NoPeriods { tenure_months: u32, frequency: Frequency },
    #[error("schedule has no period {0}")]
    NoSuchPeriod(u32),
}

/// One instalment of a repayment schedule.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleEntry {
    pub period: u32,
    pub due_date: NaiveDate,
    pub principal_amount: f64,
    pub interest_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub outstanding_amount: f64,
    pub status: EntryStatus,
    pub days_overdue: i64,
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "period {}, due {}, principal ${:.2}, interest ${:.2}, total ${:.2}, outstanding ${:.2}",
            self.period,
            self.due_date,
            self.principal_amount,
            self.interest_amount,
            self.total_amount,
            self.outstanding_amount
        )
    }
}

/// Repayment schedule for a disbursed loan. Entries are generated up front
/// from the interest method; payments are applied per period and the totals
/// kept in step.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    pub loan_amount: f64,
    pub tenure_months: u32,
    pub annual_rate: f64,
    pub method: InterestMethod,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub dec_places: f64,
    entries: Vec<ScheduleEntry>,
    pub total_principal: f64,
    pub total_interest: f64,
    pub total_amount: f64,
    pub total_paid: f64,
    pub total_outstanding: f64,
    pub status: ScheduleStatus,
}

impl Schedule {
    pub fn build(
        loan_amount: f64,
        tenure_months: u32,
        annual_rate: f64,
        method: InterestMethod,
        frequency: Frequency,
        start_date: NaiveDate,
        dec_places: f64,
    ) -> Result<Self, ScheduleError> {
        let periods = frequency.periods(tenure_months);
        if periods == 0 {
            return Err(ScheduleError::NoPeriods { tenure_months, frequency });
        }

        let entries = add_schedule_entries(
            &loan_amount,
            periods,
            &annual_rate,
            &method,
            &frequency,
            &start_date,
            &dec_places,
        );

        let mut schedule = Self {
            loan_amount,
            tenure_months,
            annual_rate,
            method,
            frequency,
            start_date,
            dec_places,
            entries,
            total_principal: 0.,
            total_interest: 0.,
            total_amount: 0.,
            total_paid: 0.,
            total_outstanding: 0.,
            status: ScheduleStatus::Pending,
        };
        schedule.recompute_totals();
        Ok(schedule)
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn get_entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn get_entry_info(&self, &period: &usize) -> String {
        if period >= 1 && period <= self.get_entry_count() {
            self.entries[period - 1].to_string()
        } else {
            "No schedule information.".to_string()
        }
    }

    pub fn show_schedule(&self) {
        for entry in &self.entries {
            println!("{}", entry);
        }
    }

    /// Apply a payment to one period and refresh statuses and totals.
    pub fn record_payment(
        &mut self,
        period: u32,
        amount: f64,
        payment_date: NaiveDate,
    ) -> Result<(), ScheduleError> {
        let dec = self.dec_places;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.period == period)
            .ok_or(ScheduleError::NoSuchPeriod(period))?;

        entry.paid_amount = round(entry.paid_amount + amount, dec);
        entry.outstanding_amount = round(entry.total_amount - entry.paid_amount, dec);
        entry.status = if entry.outstanding_amount <= 0. {
            EntryStatus::Paid
        } else {
            EntryStatus::PartiallyPaid
        };
        trace!(
            "payment of {} on period {}, outstanding now {}",
            amount,
            period,
            entry.outstanding_amount
        );

        self.update_statuses(payment_date);
        self.recompute_totals();
        Ok(())
    }

    /// Refresh entry statuses as of a date. Paid entries are final; anything
    /// unpaid past its due date reads Overdue with its days counted, an entry
    /// falling due on as_of reads Due.
    pub fn update_statuses(&mut self, as_of: NaiveDate) {
        for entry in &mut self.entries {
            if entry.status == EntryStatus::Paid {
                entry.days_overdue = 0;
                continue;
            }
            let days_past = as_of.signed_duration_since(entry.due_date).num_days();
            if days_past > 0 {
                entry.status = EntryStatus::Overdue;
                entry.days_overdue = days_past;
            } else {
                entry.status = if entry.paid_amount > 0. {
                    EntryStatus::PartiallyPaid
                } else if days_past == 0 {
                    EntryStatus::Due
                } else {
                    EntryStatus::NotDue
                };
                entry.days_overdue = 0;
            }
        }
    }

    /// Sum of outstanding amounts on periods that were due strictly before
    /// as_of and are not fully paid.
    pub fn overdue_amount(&self, as_of: NaiveDate) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.due_date < as_of && e.status != EntryStatus::Paid)
            .map(|e| e.outstanding_amount)
            .sum()
    }

    /// Days past the earliest unpaid due date, 0 when nothing is overdue.
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.due_date < as_of && e.status != EntryStatus::Paid)
            .map(|e| as_of.signed_duration_since(e.due_date).num_days())
            .max()
            .unwrap_or(0)
    }

    fn recompute_totals(&mut self) {
        let mut total_principal = 0.;
        let mut total_interest = 0.;
        let mut total_amount = 0.;
        let mut total_paid = 0.;
        let mut total_outstanding = 0.;

        for entry in &self.entries {
            total_principal += entry.principal_amount;
            total_interest += entry.interest_amount;
            total_amount += entry.total_amount;
            total_paid += entry.paid_amount;
            total_outstanding += entry.outstanding_amount;
        }

        self.total_principal = total_principal;
        self.total_interest = total_interest;
        self.total_amount = total_amount;
        self.total_paid = total_paid;
        self.total_outstanding = total_outstanding;

        self.status = if total_outstanding <= 0. && total_paid > 0. {
            ScheduleStatus::Completed
        } else if total_paid > 0. {
            ScheduleStatus::Active
        } else {
            ScheduleStatus::Pending
        };
    }
}

fn round(amt: f64, dec: f64) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powf(dec)).round() / 10_f64.powf(dec)
    }
}

// generate the full vector of instalments for Schedule::build
fn add_schedule_entries(
    &loan_amount: &f64,
    periods: u32,
    &annual_rate: &f64,
    &method: &InterestMethod,
    &frequency: &Frequency,
    &start_date: &NaiveDate,
    &dec_places: &f64,
) -> Vec<ScheduleEntry> {
    let mut entries: Vec<ScheduleEntry> = Vec::new();

    let period_days = frequency.period_days();
    let per_period_principal = loan_amount / periods as f64;
    // simple interest accrues daily on the full principal; the other two
    // methods charge a monthly rate on the declining outstanding balance
    let daily_rate = annual_rate / 100. / 365.;
    let monthly_rate = annual_rate / 12. / 100.;

    let mut outstanding = loan_amount;

    for period in 1..=periods {
        let interest = match method {
            InterestMethod::Simple => loan_amount * daily_rate * period_days as f64,
            InterestMethod::CompoundMonthly | InterestMethod::DecliningBalance => {
                outstanding * monthly_rate
            }
        };
        outstanding -= per_period_principal;

        let due_date = match start_date.checked_add_days(chrono::Days::new(period_days * period as u64)) {
            Some(due_date) => due_date,
            None => panic!("{} does not yield a due date for period {}", start_date, period),
        };
        trace!("period {}, due {}, interest {}", period, due_date, interest);

        let total = round(per_period_principal + interest, dec_places);
        entries.push(ScheduleEntry {
            period,
            due_date,
            principal_amount: round(per_period_principal, dec_places),
            interest_amount: round(interest, dec_places),
            total_amount: total,
            paid_amount: 0.,
            outstanding_amount: total,
            status: EntryStatus::NotDue,
            days_overdue: 0,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::{
        EntryStatus, Frequency, InterestMethod, Schedule, ScheduleError, ScheduleStatus,
    };
    use chrono::NaiveDate;
    use test_log::test;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    #[test]
    fn test_simple_interest_schedule() {
        let schedule = Schedule::build(
            10000.,
            12,
            20.,
            InterestMethod::Simple,
            Frequency::Monthly,
            start(),
            2.,
        )
        .unwrap();

        assert_eq!(schedule.get_entry_count(), 12);
        assert_eq!(
            schedule.get_entry_info(&1),
            "period 1, due 2026-01-31, principal $833.33, interest $164.38, total $997.72, outstanding $997.72"
        );
        // simple interest is flat across periods
        assert_eq!(
            schedule.get_entry_info(&12),
            "period 12, due 2026-12-27, principal $833.33, interest $164.38, total $997.72, outstanding $997.72"
        );
        assert!((schedule.total_interest - 1972.56).abs() < 1e-9);
        assert!((schedule.total_principal - 9999.96).abs() < 1e-9);
        assert!((schedule.total_amount - 11966.64).abs() < 1e-9);
        assert_eq!(schedule.total_paid, 0.);
        assert_eq!(schedule.status, ScheduleStatus::Pending);
    }

    #[test]
    fn test_declining_balance_schedule() {
        let schedule = Schedule::build(
            10000.,
            3,
            12.,
            InterestMethod::DecliningBalance,
            Frequency::Monthly,
            start(),
            2.,
        )
        .unwrap();

        assert_eq!(schedule.get_entry_count(), 3);
        assert_eq!(
            schedule.get_entry_info(&1),
            "period 1, due 2026-01-31, principal $3333.33, interest $100.00, total $3433.33, outstanding $3433.33"
        );
        assert_eq!(
            schedule.get_entry_info(&2),
            "period 2, due 2026-03-02, principal $3333.33, interest $66.67, total $3400.00, outstanding $3400.00"
        );
        assert_eq!(
            schedule.get_entry_info(&3),
            "period 3, due 2026-04-01, principal $3333.33, interest $33.33, total $3366.67, outstanding $3366.67"
        );
        assert!((schedule.total_interest - 200.).abs() < 1e-9);
        assert_eq!(schedule.get_entry_info(&4), "No schedule information.");
    }

    #[test]
    fn test_compound_monthly_matches_declining_balance() {
        // the source system computes both methods identically
        let compound = Schedule::build(
            5000.,
            6,
            18.,
            InterestMethod::CompoundMonthly,
            Frequency::Monthly,
            start(),
            2.,
        )
        .unwrap();
        let declining = Schedule::build(
            5000.,
            6,
            18.,
            InterestMethod::DecliningBalance,
            Frequency::Monthly,
            start(),
            2.,
        )
        .unwrap();
        assert_eq!(compound.entries(), declining.entries());
    }

    #[test]
    fn test_quarterly_schedule() {
        let schedule = Schedule::build(
            9000.,
            12,
            20.,
            InterestMethod::Simple,
            Frequency::Quarterly,
            start(),
            2.,
        )
        .unwrap();

        assert_eq!(schedule.get_entry_count(), 4);
        let entries = schedule.entries();
        assert_eq!(entries[0].due_date, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert_eq!(entries[1].due_date, NaiveDate::from_ymd_opt(2026, 6, 30).unwrap());
        assert_eq!(entries[0].principal_amount, 2250.);
        // 9000 * 20% / 365 * 90 days
        assert_eq!(entries[0].interest_amount, 443.84);
    }

    #[test]
    fn test_zero_periods_is_an_error() {
        assert_eq!(
            Schedule::build(
                10000.,
                2,
                20.,
                InterestMethod::Simple,
                Frequency::Quarterly,
                start(),
                2.,
            ),
            Err(ScheduleError::NoPeriods {
                tenure_months: 2,
                frequency: Frequency::Quarterly
            })
        );
        assert!(Schedule::build(
            10000.,
            0,
            20.,
            InterestMethod::DecliningBalance,
            Frequency::Monthly,
            start(),
            2.,
        )
        .is_err());
    }

    #[test]
    fn test_record_payment_updates_entry_and_totals() {
        let mut schedule = Schedule::build(
            10000.,
            3,
            12.,
            InterestMethod::DecliningBalance,
            Frequency::Monthly,
            start(),
            2.,
        )
        .unwrap();

        // payments made before anything falls due
        let pay_date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

        schedule.record_payment(1, 3433.33, pay_date).unwrap();
        assert_eq!(schedule.entries()[0].status, EntryStatus::Paid);
        assert_eq!(schedule.entries()[0].outstanding_amount, 0.);
        assert_eq!(schedule.status, ScheduleStatus::Active);
        assert!((schedule.total_paid - 3433.33).abs() < 1e-9);

        schedule.record_payment(2, 1000., pay_date).unwrap();
        assert_eq!(schedule.entries()[1].status, EntryStatus::PartiallyPaid);
        assert_eq!(schedule.entries()[1].outstanding_amount, 2400.);

        schedule.record_payment(2, 2400., pay_date).unwrap();
        schedule.record_payment(3, 3366.67, pay_date).unwrap();
        assert_eq!(schedule.status, ScheduleStatus::Completed);
        assert_eq!(schedule.total_outstanding, 0.);

        assert_eq!(
            schedule.record_payment(9, 100., pay_date),
            Err(ScheduleError::NoSuchPeriod(9))
        );
    }

    #[test]
    fn test_overdue_reporting() {
        let mut schedule = Schedule::build(
            10000.,
            3,
            12.,
            InterestMethod::DecliningBalance,
            Frequency::Monthly,
            start(),
            2.,
        )
        .unwrap();

        // nothing due yet on the start date
        assert_eq!(schedule.overdue_amount(start()), 0.);
        assert_eq!(schedule.days_overdue(start()), 0);

        // first two periods due, second only partially paid
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        schedule.record_payment(2, 1000., as_of).unwrap();
        assert!((schedule.overdue_amount(as_of) - (3433.33 + 2400.)).abs() < 1e-9);
        // period 1 was due 2026-01-31
        assert_eq!(schedule.days_overdue(as_of), 38);
        assert_eq!(schedule.entries()[0].status, EntryStatus::Overdue);
        assert_eq!(schedule.entries()[0].days_overdue, 38);
        assert_eq!(schedule.entries()[1].status, EntryStatus::Overdue);
        assert_eq!(schedule.entries()[1].days_overdue, 8);
        assert_eq!(schedule.entries()[2].status, EntryStatus::NotDue);
    }

    #[test]
    fn test_update_statuses_marks_due_and_overdue() {
        let mut schedule = Schedule::build(
            10000.,
            3,
            12.,
            InterestMethod::DecliningBalance,
            Frequency::Monthly,
            start(),
            2.,
        )
        .unwrap();

        // period 1 falls due 2026-01-31
        schedule.update_statuses(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(schedule.entries()[0].status, EntryStatus::Due);
        assert_eq!(schedule.entries()[0].days_overdue, 0);
        assert_eq!(schedule.entries()[1].status, EntryStatus::NotDue);

        schedule.update_statuses(NaiveDate::from_ymd_opt(2026, 2, 5).unwrap());
        assert_eq!(schedule.entries()[0].status, EntryStatus::Overdue);
        assert_eq!(schedule.entries()[0].days_overdue, 5);
        assert_eq!(schedule.entries()[1].status, EntryStatus::NotDue);

        // a partial payment does not clear the overdue flag
        let pay_date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        schedule.record_payment(1, 1000., pay_date).unwrap();
        assert_eq!(schedule.entries()[0].status, EntryStatus::Overdue);
        assert_eq!(schedule.entries()[0].days_overdue, 10);

        // paying it off is final, a later refresh leaves it Paid
        schedule.record_payment(1, 2433.33, pay_date).unwrap();
        schedule.update_statuses(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(schedule.entries()[0].status, EntryStatus::Paid);
        assert_eq!(schedule.entries()[0].days_overdue, 0);
    }
}
