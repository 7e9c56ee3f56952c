use log::trace;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw user entry for a numeric form field. The editing surface hands over
/// whatever the user typed; arithmetic always goes through to_number_or_zero.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldValue {
    #[default]
    Blank,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce to f64. Blank fields and unparseable text both read as 0.
    pub fn to_number_or_zero(&self) -> f64 {
        match self {
            FieldValue::Blank => 0.,
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse().unwrap_or(0.),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            FieldValue::Blank
        } else {
            FieldValue::Text(s.to_string())
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Blank => write!(f, ""),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// The loan interest calculation record being edited. approved_amount,
/// interest and tenure are user-entered; interest_amount and final_amount
/// are derived and only ever written by recalculate.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterestCalculation {
    pub full_name: String,
    pub email: String,
    pub approved_amount: FieldValue,
    pub interest: FieldValue,
    pub tenure: FieldValue,
    pub interest_amount: f64,
    pub final_amount: f64,
}

impl InterestCalculation {
    pub fn new(full_name: &str, email: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    /// Recompute both derived fields from the current inputs. interest is a
    /// percentage, tenure is quoted in the same unit as the rate.
    pub fn recalculate(&mut self) {
        let approved_amount = self.approved_amount.to_number_or_zero();
        let rate = self.interest.to_number_or_zero();
        let tenure = self.tenure.to_number_or_zero();

        self.interest_amount = approved_amount * rate * tenure / 100.;
        self.final_amount = self.interest_amount + approved_amount;

        trace!(
            "recalculated: amount {}, rate {}, tenure {} -> interest {}, final {}",
            approved_amount,
            rate,
            tenure,
            self.interest_amount,
            self.final_amount
        );
    }
}

impl fmt::Display for InterestCalculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}>, approved ${:.2}, interest amount ${:.2}, final ${:.2}",
            self.full_name,
            self.email,
            self.approved_amount.to_number_or_zero(),
            self.interest_amount,
            self.final_amount
        )
    }
}
