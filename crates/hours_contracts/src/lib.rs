#![forbid(unsafe_code)]

pub mod common;
pub mod schedule;

pub use common::{ContractViolation, SchemaVersion, Validate};
pub use schedule::{
    HourType, OrdinalWeek, ScheduleCandidate, ScheduleEntry, Weekday, WireTime,
    ENTRY_FIELD_COUNT, ENTRY_SEPARATOR, FIELD_SEPARATOR, HOURS_CONTRACT_VERSION,
};
