#![allow(unused_imports, dead_code)]
use chrono::NaiveDate;
use log::{info, warn};
use microloan::form::InterestForm;
use microloan::record::{FieldValue, InterestCalculation};
use microloan::schedule::{Frequency, InterestMethod, Schedule, ScheduleEntry};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let mut form = InterestForm::new(InterestCalculation::new("Ama Mensah", "ama@example.com"));
    form.field_changed("approved_amount", FieldValue::Number(10000.));
    form.field_changed("interest", FieldValue::Number(20.));
    form.field_changed("tenure", FieldValue::Number(2.));
    println!("{}", form.record);

    let schedule = Schedule::build(
        10000.,
        12,
        20.,
        InterestMethod::DecliningBalance,
        Frequency::Monthly,
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        2.,
    )
    .unwrap();

    schedule.show_schedule();
}

// verifies that types can implement the gated traits below
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<ScheduleEntry>();
}
