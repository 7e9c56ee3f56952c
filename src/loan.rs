use chrono::NaiveDate;
use log::{info, warn};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LoanStatus {
    Draft,
    Approved,
    Disbursed,
    Active,
    Closed,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Draft => write!(f, "Draft"),
            LoanStatus::Approved => write!(f, "Approved"),
            LoanStatus::Disbursed => write!(f, "Disbursed"),
            LoanStatus::Active => write!(f, "Active"),
            LoanStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// Product terms a loan must stay inside.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoanProduct {
    pub name: String,
    pub annual_rate_min: f64,
    pub annual_rate_max: f64,
    pub min_tenure_months: u32,
}

impl LoanProduct {
    pub fn new(name: &str, annual_rate_min: f64, annual_rate_max: f64, min_tenure_months: u32) -> Self {
        Self {
            name: name.to_string(),
            annual_rate_min,
            annual_rate_max,
            min_tenure_months,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum LoanError {
    #[error("interest rate {rate} must be between {min} and {max}")]
    RateOutsideProductRange { rate: f64, min: f64, max: f64 },
    #[error("tenure of {tenure_months} months is below the product minimum of {min}")]
    TenureBelowMinimum { tenure_months: u32, min: u32 },
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("loan status {status} does not allow {action}")]
    StatusDoesNotAllow { status: LoanStatus, action: &'static str },
    #[error("disbursement of {amount} would exceed approved amount {approved} (already disbursed {disbursed})")]
    DisbursementExceedsApproved { amount: f64, approved: f64, disbursed: f64 },
    #[error("allocated {allocated} exceeds payment amount {payment}")]
    AllocationExceedsPayment { allocated: f64, payment: f64 },
    #[error("loan still has {outstanding} outstanding")]
    OutstandingBalance { outstanding: f64 },
}

/// An approved loan moving through disbursement and repayment. Guards here
/// mirror the submit-time checks of the record controllers; amounts already
/// validated upstream are taken at face value.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Loan {
    pub borrower: String,
    pub approved_amount: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub status: LoanStatus,
    pub closure_date: Option<NaiveDate>,
    disbursed_amount: f64,
}

impl Loan {
    pub fn new(borrower: &str, approved_amount: f64, annual_rate: f64, tenure_months: u32) -> Self {
        Self {
            borrower: borrower.to_string(),
            approved_amount,
            annual_rate,
            tenure_months,
            status: LoanStatus::Draft,
            closure_date: None,
            disbursed_amount: 0.,
        }
    }

    pub fn total_disbursed(&self) -> f64 {
        self.disbursed_amount
    }

    /// Rate and tenure must fall inside the product range.
    pub fn validate_against_product(&self, product: &LoanProduct) -> Result<(), LoanError> {
        if self.annual_rate < product.annual_rate_min || self.annual_rate > product.annual_rate_max {
            return Err(LoanError::RateOutsideProductRange {
                rate: self.annual_rate,
                min: product.annual_rate_min,
                max: product.annual_rate_max,
            });
        }
        if self.tenure_months < product.min_tenure_months {
            return Err(LoanError::TenureBelowMinimum {
                tenure_months: self.tenure_months,
                min: product.min_tenure_months,
            });
        }
        Ok(())
    }

    pub fn approve(&mut self) -> Result<(), LoanError> {
        if self.status != LoanStatus::Draft {
            return Err(LoanError::StatusDoesNotAllow {
                status: self.status,
                action: "approval",
            });
        }
        if self.approved_amount <= 0. {
            return Err(LoanError::NonPositiveAmount);
        }
        self.status = LoanStatus::Approved;
        info!("loan for {} approved at {}", self.borrower, self.approved_amount);
        Ok(())
    }

    /// Pay out part or all of the approved amount. Cumulative disbursements
    /// may never exceed the approval; full disbursement activates the loan.
    pub fn disburse(&mut self, amount: f64) -> Result<(), LoanError> {
        if self.status != LoanStatus::Approved && self.status != LoanStatus::Disbursed {
            return Err(LoanError::StatusDoesNotAllow {
                status: self.status,
                action: "disbursement",
            });
        }
        if amount <= 0. {
            return Err(LoanError::NonPositiveAmount);
        }
        if self.disbursed_amount + amount > self.approved_amount {
            return Err(LoanError::DisbursementExceedsApproved {
                amount,
                approved: self.approved_amount,
                disbursed: self.disbursed_amount,
            });
        }

        self.disbursed_amount += amount;
        self.status = if self.disbursed_amount >= self.approved_amount {
            LoanStatus::Active
        } else {
            LoanStatus::Disbursed
        };
        info!(
            "disbursed {} to {}, total {} of {}",
            amount, self.borrower, self.disbursed_amount, self.approved_amount
        );
        Ok(())
    }

    /// Accept a repayment split across schedule periods. Returns the
    /// unallocated remainder.
    pub fn accept_repayment(&self, payment_amount: f64, allocations: &[f64]) -> Result<f64, LoanError> {
        if self.status != LoanStatus::Active && self.status != LoanStatus::Disbursed {
            return Err(LoanError::StatusDoesNotAllow {
                status: self.status,
                action: "repayment",
            });
        }
        if payment_amount <= 0. {
            return Err(LoanError::NonPositiveAmount);
        }

        let allocated: f64 = allocations.iter().sum();
        if allocated > payment_amount {
            return Err(LoanError::AllocationExceedsPayment {
                allocated,
                payment: payment_amount,
            });
        }

        let unallocated = payment_amount - allocated;
        if unallocated > 0. {
            warn!(
                "unallocated amount of {} on repayment from {} will not be applied",
                unallocated, self.borrower
            );
        }
        Ok(unallocated)
    }

    /// Close out a fully repaid loan. total_outstanding is the schedule's
    /// remaining balance; anything above zero keeps the loan open.
    pub fn close(&mut self, total_outstanding: f64, closure_date: NaiveDate) -> Result<(), LoanError> {
        if self.status != LoanStatus::Active && self.status != LoanStatus::Disbursed {
            return Err(LoanError::StatusDoesNotAllow {
                status: self.status,
                action: "closure",
            });
        }
        if total_outstanding > 0. {
            return Err(LoanError::OutstandingBalance {
                outstanding: total_outstanding,
            });
        }
        self.status = LoanStatus::Closed;
        self.closure_date = Some(closure_date);
        info!("loan for {} closed on {}", self.borrower, closure_date);
        Ok(())
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: approved ${:.2}, rate {}%, tenure {} months, status {}",
            self.borrower, self.approved_amount, self.annual_rate, self.tenure_months, self.status
        )
    }
}
