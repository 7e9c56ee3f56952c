use crate::record::{FieldValue, InterestCalculation};
use log::{info, trace};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The input fields whose edits drive a recalculation. Edits to any other
/// field leave the derived amounts untouched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TriggerField {
    ApprovedAmount,
    Interest,
    Tenure,
}

impl TriggerField {
    pub const ALL: [TriggerField; 3] = [
        TriggerField::ApprovedAmount,
        TriggerField::Interest,
        TriggerField::Tenure,
    ];

    pub fn fieldname(&self) -> &'static str {
        match self {
            TriggerField::ApprovedAmount => "approved_amount",
            TriggerField::Interest => "interest",
            TriggerField::Tenure => "tenure",
        }
    }

    pub fn from_fieldname(fieldname: &str) -> Option<TriggerField> {
        match fieldname {
            "approved_amount" => Some(TriggerField::ApprovedAmount),
            "interest" => Some(TriggerField::Interest),
            "tenure" => Some(TriggerField::Tenure),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fieldname())
    }
}

/// Editing surface for one InterestCalculation record. The host forwards
/// field-change notifications here; trigger fields are written and the
/// derived fields recomputed in the same turn.
#[derive(Clone, PartialEq, Debug)]
pub struct InterestForm {
    pub record: InterestCalculation,
}

impl InterestForm {
    pub fn new(record: InterestCalculation) -> Self {
        let mut form = Self { record };
        // the record may arrive with stale derived fields
        form.record.recalculate();
        form
    }

    /// Field-change entry point. Returns true when the change hit a trigger
    /// field and a recalculation ran.
    pub fn field_changed(&mut self, fieldname: &str, value: FieldValue) -> bool {
        let Some(trigger) = TriggerField::from_fieldname(fieldname) else {
            trace!("change to {} ignored, not a trigger field", fieldname);
            return false;
        };
        match trigger {
            TriggerField::ApprovedAmount => self.record.approved_amount = value,
            TriggerField::Interest => self.record.interest = value,
            TriggerField::Tenure => self.record.tenure = value,
        }
        self.record.recalculate();
        info!(
            "{} changed, interest {} final {}",
            trigger, self.record.interest_amount, self.record.final_amount
        );
        true
    }

    /// Filter handed to the full_name lookup: only candidates sharing this
    /// record's email are offered.
    pub fn full_name_filter(&self) -> LookupFilter {
        LookupFilter::equals("email", &self.record.email)
    }
}

/// A selectable entry offered by the full_name lookup.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    pub full_name: String,
    pub email: String,
}

impl Candidate {
    pub fn new(full_name: &str, email: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            email: email.to_string(),
        }
    }

    fn field(&self, fieldname: &str) -> Option<&str> {
        match fieldname {
            "full_name" => Some(&self.full_name),
            "email" => Some(&self.email),
            _ => None,
        }
    }
}

/// Equality predicate narrowing a reference-field selector.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LookupFilter {
    pub fieldname: String,
    pub value: String,
}

impl LookupFilter {
    pub fn equals(fieldname: &str, value: &str) -> Self {
        Self {
            fieldname: fieldname.to_string(),
            value: value.to_string(),
        }
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        candidate.field(&self.fieldname) == Some(self.value.as_str())
    }

    pub fn apply<'a>(&self, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
        candidates.iter().filter(|c| self.matches(c)).collect()
    }
}

impl fmt::Display for LookupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.fieldname, self.value)
    }
}
