#![forbid(unsafe_code)]

use crate::{ContractViolation, SchemaVersion, Validate};

pub const HOURS_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Wire encoding of one schedule entry: 14 comma-separated slots, entries
/// joined by `;`. The slot layout is fixed; changing it breaks the
/// generation prompt, the validation battery, and the bulk template at once.
pub const ENTRY_FIELD_COUNT: usize = 14;
pub const ENTRY_SEPARATOR: char = ';';
pub const FIELD_SEPARATOR: char = ',';

pub const SLOT_DAY_OF_WEEK: usize = 0;
pub const SLOT_OPEN_TIME: usize = 1;
pub const SLOT_CLOSE_TIME: usize = 2;
pub const SLOT_INFO_MARKER: usize = 7;
pub const SLOT_WEEK_OF_MONTH: usize = 8;
pub const SLOT_DAY_OF_MONTH: usize = 9;
pub const SLOT_HOUR_TYPE: usize = 10;

/// Slots that must be empty in every valid entry regardless of hour type.
pub const RESERVED_SLOTS: [usize; 7] = [3, 4, 5, 6, 11, 12, 13];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn parse_label(raw: &str) -> Option<Weekday> {
        Weekday::ALL.into_iter().find(|d| d.as_label() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HourType {
    Weekly,
    EveryOtherWeek,
    DayOfMonth,
    WeekOfMonth,
    CallForInformation,
}

impl HourType {
    pub const ALL: [HourType; 5] = [
        HourType::Weekly,
        HourType::EveryOtherWeek,
        HourType::DayOfMonth,
        HourType::WeekOfMonth,
        HourType::CallForInformation,
    ];

    pub fn as_label(self) -> &'static str {
        match self {
            HourType::Weekly => "Weekly",
            HourType::EveryOtherWeek => "Every Other Week",
            HourType::DayOfMonth => "Day of Month",
            HourType::WeekOfMonth => "Week of Month",
            HourType::CallForInformation => "Call for Information",
        }
    }

    pub fn parse_label(raw: &str) -> Option<HourType> {
        HourType::ALL.into_iter().find(|t| t.as_label() == raw)
    }
}

/// 24-hour wall-clock time as it appears on the wire (`HH:MM`, hour may be
/// one or two digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireTime {
    hour: u8,
    minute: u8,
}

impl WireTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ContractViolation> {
        if hour > 23 {
            return Err(ContractViolation::InvalidValue {
                field: "wire_time.hour",
                reason: "must be 0..=23",
            });
        }
        if minute > 59 {
            return Err(ContractViolation::InvalidValue {
                field: "wire_time.minute",
                reason: "must be 0..=59",
            });
        }
        Ok(Self { hour, minute })
    }

    pub fn parse(raw: &str) -> Option<WireTime> {
        let (hour_part, minute_part) = raw.split_once(':')?;
        if hour_part.is_empty()
            || hour_part.len() > 2
            || minute_part.len() != 2
            || !hour_part.bytes().all(|b| b.is_ascii_digit())
            || !minute_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let hour: u8 = hour_part.parse().ok()?;
        let minute: u8 = minute_part.parse().ok()?;
        WireTime::new(hour, minute).ok()
    }

    pub fn minute_of_day(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    pub fn as_wire(self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Week-of-month / day-of-month recurrence ordinal (1..=5) with the textual
/// spellings the ordinal cross-reference rule matches against source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrdinalWeek(u8);

impl OrdinalWeek {
    pub fn new(value: u8) -> Result<Self, ContractViolation> {
        if !(1..=5).contains(&value) {
            return Err(ContractViolation::InvalidValue {
                field: "ordinal_week",
                reason: "must be 1..=5",
            });
        }
        Ok(Self(value))
    }

    pub fn parse_digit(raw: &str) -> Option<OrdinalWeek> {
        if raw.len() != 1 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        OrdinalWeek::new(raw.as_bytes()[0] - b'0').ok()
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn spellings(self) -> &'static [&'static str] {
        match self.0 {
            1 => &["1st", "First"],
            2 => &["2nd", "Second"],
            3 => &["3rd", "Third"],
            4 => &["4th", "Fourth"],
            _ => &["5th", "Fifth"],
        }
    }

    pub fn as_wire(self) -> String {
        self.0.to_string()
    }
}

/// Structured form of one 14-slot wire entry. The wire stays positional for
/// the generation service and the bulk template; everything downstream of
/// decode works with these variants instead of slot indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleEntry {
    Recurring {
        weekday: Weekday,
        open: WireTime,
        close: WireTime,
        hour_type: HourType,
        ordinal: Option<OrdinalWeek>,
    },
    CallForInformation,
}

impl ScheduleEntry {
    pub fn decode_wire(raw: &str) -> Result<ScheduleEntry, ContractViolation> {
        let slots: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();
        if slots.len() != ENTRY_FIELD_COUNT {
            return Err(ContractViolation::InvalidValue {
                field: "schedule_entry",
                reason: "must have exactly 14 comma-separated slots",
            });
        }
        for idx in RESERVED_SLOTS {
            if !slots[idx].is_empty() {
                return Err(ContractViolation::InvalidValue {
                    field: "schedule_entry.reserved",
                    reason: "reserved slots must be empty",
                });
            }
        }
        let hour_type = HourType::parse_label(slots[SLOT_HOUR_TYPE]).ok_or(
            ContractViolation::InvalidValue {
                field: "schedule_entry.hour_type",
                reason: "unrecognized hour type label",
            },
        )?;

        if hour_type == HourType::CallForInformation {
            let marker = slots[SLOT_INFO_MARKER];
            if !marker.is_empty() && marker != HourType::CallForInformation.as_label() {
                return Err(ContractViolation::InvalidValue {
                    field: "schedule_entry.info_marker",
                    reason: "must be empty or the canonical info label",
                });
            }
            let positional_empty = [
                SLOT_DAY_OF_WEEK,
                SLOT_OPEN_TIME,
                SLOT_CLOSE_TIME,
                SLOT_WEEK_OF_MONTH,
                SLOT_DAY_OF_MONTH,
            ]
            .into_iter()
            .all(|idx| slots[idx].is_empty());
            if !positional_empty {
                return Err(ContractViolation::InvalidValue {
                    field: "schedule_entry",
                    reason: "call-for-information entry must have no recurrence slots",
                });
            }
            return Ok(ScheduleEntry::CallForInformation);
        }

        if !slots[SLOT_INFO_MARKER].is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "schedule_entry.info_marker",
                reason: "must be empty for recurring entries",
            });
        }
        let weekday = Weekday::parse_label(slots[SLOT_DAY_OF_WEEK]).ok_or(
            ContractViolation::InvalidValue {
                field: "schedule_entry.day_of_week",
                reason: "unrecognized weekday name",
            },
        )?;
        let open = WireTime::parse(slots[SLOT_OPEN_TIME]).ok_or(
            ContractViolation::InvalidValue {
                field: "schedule_entry.open_time",
                reason: "must be HH:MM 24-hour",
            },
        )?;
        let close = WireTime::parse(slots[SLOT_CLOSE_TIME]).ok_or(
            ContractViolation::InvalidValue {
                field: "schedule_entry.close_time",
                reason: "must be HH:MM 24-hour",
            },
        )?;
        if close.minute_of_day() <= open.minute_of_day() {
            return Err(ContractViolation::InvalidValue {
                field: "schedule_entry.close_time",
                reason: "must be strictly later than open_time",
            });
        }

        let week_ordinal = slots[SLOT_WEEK_OF_MONTH];
        let day_ordinal = slots[SLOT_DAY_OF_MONTH];
        let ordinal = match hour_type {
            HourType::Weekly | HourType::EveryOtherWeek => {
                if !week_ordinal.is_empty() || !day_ordinal.is_empty() {
                    return Err(ContractViolation::InvalidValue {
                        field: "schedule_entry.ordinal",
                        reason: "weekly entries must have no recurrence ordinal",
                    });
                }
                None
            }
            HourType::DayOfMonth => {
                if !week_ordinal.is_empty() {
                    return Err(ContractViolation::InvalidValue {
                        field: "schedule_entry.week_of_month",
                        reason: "must be empty for day-of-month entries",
                    });
                }
                Some(OrdinalWeek::parse_digit(day_ordinal).ok_or(
                    ContractViolation::InvalidValue {
                        field: "schedule_entry.day_of_month",
                        reason: "must be a digit 1..=5",
                    },
                )?)
            }
            HourType::WeekOfMonth => {
                if !day_ordinal.is_empty() {
                    return Err(ContractViolation::InvalidValue {
                        field: "schedule_entry.day_of_month",
                        reason: "must be empty for week-of-month entries",
                    });
                }
                Some(OrdinalWeek::parse_digit(week_ordinal).ok_or(
                    ContractViolation::InvalidValue {
                        field: "schedule_entry.week_of_month",
                        reason: "must be a digit 1..=5",
                    },
                )?)
            }
            HourType::CallForInformation => unreachable!("match guarded above"),
        };

        Ok(ScheduleEntry::Recurring {
            weekday,
            open,
            close,
            hour_type,
            ordinal,
        })
    }

    pub fn encode_wire(&self) -> String {
        let mut slots = vec![String::new(); ENTRY_FIELD_COUNT];
        match self {
            ScheduleEntry::CallForInformation => {
                slots[SLOT_HOUR_TYPE] = HourType::CallForInformation.as_label().to_string();
            }
            ScheduleEntry::Recurring {
                weekday,
                open,
                close,
                hour_type,
                ordinal,
            } => {
                slots[SLOT_DAY_OF_WEEK] = weekday.as_label().to_string();
                slots[SLOT_OPEN_TIME] = open.as_wire();
                slots[SLOT_CLOSE_TIME] = close.as_wire();
                slots[SLOT_HOUR_TYPE] = hour_type.as_label().to_string();
                if let Some(ordinal) = ordinal {
                    let slot = match hour_type {
                        HourType::WeekOfMonth => SLOT_WEEK_OF_MONTH,
                        _ => SLOT_DAY_OF_MONTH,
                    };
                    slots[slot] = ordinal.as_wire();
                }
            }
        }
        slots.join(",")
    }

    pub fn hour_type(&self) -> HourType {
        match self {
            ScheduleEntry::CallForInformation => HourType::CallForInformation,
            ScheduleEntry::Recurring { hour_type, .. } => *hour_type,
        }
    }
}

impl Validate for ScheduleEntry {
    fn validate(&self) -> Result<(), ContractViolation> {
        match self {
            ScheduleEntry::CallForInformation => Ok(()),
            ScheduleEntry::Recurring {
                open,
                close,
                hour_type,
                ordinal,
                ..
            } => {
                if close.minute_of_day() <= open.minute_of_day() {
                    return Err(ContractViolation::InvalidValue {
                        field: "schedule_entry.close_time",
                        reason: "must be strictly later than open_time",
                    });
                }
                let needs_ordinal =
                    matches!(hour_type, HourType::DayOfMonth | HourType::WeekOfMonth);
                if needs_ordinal != ordinal.is_some() {
                    return Err(ContractViolation::InvalidValue {
                        field: "schedule_entry.ordinal",
                        reason: "present iff hour type is day-of-month or week-of-month",
                    });
                }
                Ok(())
            }
        }
    }
}

/// One row's full generation result: the untouched source text, the raw
/// multi-entry wire string, and the accept flag. The flag starts true and
/// only the rule battery moves it, one way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCandidate {
    original_text: String,
    formatted: String,
    is_valid: bool,
}

impl ScheduleCandidate {
    pub fn assembled(original_text: impl Into<String>, formatted: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            formatted: formatted.into(),
            is_valid: true,
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn formatted(&self) -> &str {
        &self.formatted
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Monotonic AND-reduction: rules only ever clear the flag.
    pub fn invalidate(&mut self) {
        self.is_valid = false;
    }

    /// Raw per-entry strings, split on the entry separator. No deeper
    /// parsing; slot access belongs to the rules and the wire decoder.
    pub fn entry_strings(&self) -> impl Iterator<Item = &str> {
        self.formatted.split(ENTRY_SEPARATOR)
    }
}
