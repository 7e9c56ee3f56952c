pub mod form;
pub mod loan;
pub mod record;
pub mod schedule;
