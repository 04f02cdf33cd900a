#![forbid(unsafe_code)]

use hours_contracts::schedule::{
    RESERVED_SLOTS, SLOT_CLOSE_TIME, SLOT_DAY_OF_MONTH, SLOT_DAY_OF_WEEK, SLOT_HOUR_TYPE,
    SLOT_OPEN_TIME, SLOT_WEEK_OF_MONTH,
};
use hours_contracts::{
    HourType, OrdinalWeek, ScheduleCandidate, Weekday, WireTime, ENTRY_FIELD_COUNT,
    ENTRY_SEPARATOR, FIELD_SEPARATOR,
};

/// Identity of one rule in the battery, for per-rule diagnostics on review
/// queues. Labels are stable; the bulk summary and the adapter response both
/// surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    EntryFormat,
    DayOfWeek,
    OpenCloseTimeSyntax,
    OpenBeforeClose,
    DayOfMonthShape,
    WeekOfMonthShape,
    WeeklyShape,
    CallForInformationShape,
    ReservedSlotsEmpty,
    HourTypeEnum,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::EntryFormat => "entry_format",
            RuleId::DayOfWeek => "day_of_week",
            RuleId::OpenCloseTimeSyntax => "open_close_time_syntax",
            RuleId::OpenBeforeClose => "open_before_close",
            RuleId::DayOfMonthShape => "day_of_month_shape",
            RuleId::WeekOfMonthShape => "week_of_month_shape",
            RuleId::WeeklyShape => "weekly_shape",
            RuleId::CallForInformationShape => "call_for_information_shape",
            RuleId::ReservedSlotsEmpty => "reserved_slots_empty",
            RuleId::HourTypeEnum => "hour_type_enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub failed_rules: Vec<RuleId>,
}

impl ValidationReport {
    pub fn failed_rule_labels(&self) -> Vec<String> {
        self.failed_rules
            .iter()
            .map(|rule| rule.as_str().to_string())
            .collect()
    }
}

/// Canonical battery order: cheap structural rules first so malformed
/// candidates fail fast, cross-referential rules last. Order never changes
/// the final flag (pure AND-reduction); every rule runs so the report names
/// every failure, not just the first.
const RULE_BATTERY: [(RuleId, fn(&ScheduleCandidate) -> bool); 10] = [
    (RuleId::EntryFormat, rule_entry_format),
    (RuleId::HourTypeEnum, rule_hour_type_enum),
    (RuleId::DayOfWeek, rule_day_of_week),
    (RuleId::OpenCloseTimeSyntax, rule_open_close_time_syntax),
    (RuleId::OpenBeforeClose, rule_open_before_close),
    (RuleId::WeeklyShape, rule_weekly_shape),
    (
        RuleId::CallForInformationShape,
        rule_call_for_information_shape,
    ),
    (RuleId::ReservedSlotsEmpty, rule_reserved_slots_empty),
    (RuleId::DayOfMonthShape, rule_day_of_month_shape),
    (RuleId::WeekOfMonthShape, rule_week_of_month_shape),
];

/// Run the full battery, AND each outcome into the candidate's flag, and
/// report every failed rule.
pub fn run_rule_battery(candidate: &mut ScheduleCandidate) -> ValidationReport {
    let mut failed_rules = Vec::new();
    for (rule_id, rule) in RULE_BATTERY {
        if !rule(candidate) {
            failed_rules.push(rule_id);
            candidate.invalidate();
        }
    }
    ValidationReport {
        is_valid: candidate.is_valid(),
        failed_rules,
    }
}

/// Missing slots read as `None`, so a truncated entry fails the rule that
/// touches it instead of panicking.
fn slot<'a>(slots: &[&'a str], idx: usize) -> Option<&'a str> {
    slots.get(idx).copied()
}

fn entry_slots(entry: &str) -> Vec<&str> {
    entry.split(FIELD_SEPARATOR).collect()
}

fn is_call_for_information(slots: &[&str]) -> bool {
    slot(slots, SLOT_HOUR_TYPE) == Some(HourType::CallForInformation.as_label())
}

fn all_entries(candidate: &ScheduleCandidate, check: impl Fn(&[&str]) -> bool) -> bool {
    candidate
        .entry_strings()
        .all(|entry| check(&entry_slots(entry)))
}

/// Rule 1: every entry splits into exactly 14 slots, and the raw comma count
/// equals 13 per entry. The count check is deliberate belt-and-braces: a
/// stray comma inside a slot keeps the split arity of one entry intact while
/// shifting another, and only counting catches it.
pub fn rule_entry_format(candidate: &ScheduleCandidate) -> bool {
    let formatted = candidate.formatted();
    let semicolons = formatted.matches(ENTRY_SEPARATOR).count();
    let commas = formatted.matches(FIELD_SEPARATOR).count();
    commas == (ENTRY_FIELD_COUNT - 1) * (semicolons + 1)
        && all_entries(candidate, |slots| slots.len() == ENTRY_FIELD_COUNT)
}

/// Rule 2: a recognized weekday name, or empty on a call-for-information
/// entry.
pub fn rule_day_of_week(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        let Some(day) = slot(slots, SLOT_DAY_OF_WEEK) else {
            return false;
        };
        Weekday::parse_label(day).is_some()
            || (day.is_empty() && is_call_for_information(slots))
    })
}

/// Rule 3: open and close are syntactically `HH:MM`; call-for-information
/// entries are exempt (their emptiness is rule 8's business).
pub fn rule_open_close_time_syntax(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        if is_call_for_information(slots) {
            return true;
        }
        let (Some(open), Some(close)) =
            (slot(slots, SLOT_OPEN_TIME), slot(slots, SLOT_CLOSE_TIME))
        else {
            return false;
        };
        WireTime::parse(open).is_some() && WireTime::parse(close).is_some()
    })
}

/// Rule 4: close is strictly later than open. A parse failure on either side
/// is acceptable only under call-for-information.
pub fn rule_open_before_close(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        let open = slot(slots, SLOT_OPEN_TIME).and_then(WireTime::parse);
        let close = slot(slots, SLOT_CLOSE_TIME).and_then(WireTime::parse);
        match (open, close) {
            (Some(open), Some(close)) => close.minute_of_day() > open.minute_of_day(),
            _ => is_call_for_information(slots),
        }
    })
}

fn ordinal_appears_in_source(ordinal_slot: &str, original_text: &str) -> bool {
    let Some(ordinal) = OrdinalWeek::parse_digit(ordinal_slot) else {
        return false;
    };
    let source = original_text.to_lowercase();
    ordinal
        .spellings()
        .iter()
        .any(|spelling| source.contains(&spelling.to_lowercase()))
}

/// Rule 5: day-of-month entries carry a digit ordinal in the day slot only,
/// and that ordinal's textual form must occur in the original, unnormalized
/// text. The cross-reference is the guard against the generator inventing a
/// recurrence the source never stated.
pub fn rule_day_of_month_shape(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        if slot(slots, SLOT_HOUR_TYPE) != Some(HourType::DayOfMonth.as_label()) {
            return true;
        }
        let (Some(week_ordinal), Some(day_ordinal)) = (
            slot(slots, SLOT_WEEK_OF_MONTH),
            slot(slots, SLOT_DAY_OF_MONTH),
        ) else {
            return false;
        };
        week_ordinal.is_empty()
            && ordinal_appears_in_source(day_ordinal, candidate.original_text())
    })
}

/// Rule 6: symmetric to rule 5 with the ordinal slots swapped.
pub fn rule_week_of_month_shape(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        if slot(slots, SLOT_HOUR_TYPE) != Some(HourType::WeekOfMonth.as_label()) {
            return true;
        }
        let (Some(week_ordinal), Some(day_ordinal)) = (
            slot(slots, SLOT_WEEK_OF_MONTH),
            slot(slots, SLOT_DAY_OF_MONTH),
        ) else {
            return false;
        };
        day_ordinal.is_empty()
            && ordinal_appears_in_source(week_ordinal, candidate.original_text())
    })
}

/// Rule 7: weekly and every-other-week entries have no recurrence ordinal.
pub fn rule_weekly_shape(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        let weekly = matches!(
            slot(slots, SLOT_HOUR_TYPE),
            Some(label) if label == HourType::Weekly.as_label()
                || label == HourType::EveryOtherWeek.as_label()
        );
        if !weekly {
            return true;
        }
        slot(slots, SLOT_WEEK_OF_MONTH) == Some("") && slot(slots, SLOT_DAY_OF_MONTH) == Some("")
    })
}

/// Rule 8: call-for-information entries have no positional content. Slot 7
/// is exempt; postprocessing may leave the canonical label there.
pub fn rule_call_for_information_shape(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        if !is_call_for_information(slots) {
            return true;
        }
        if slots.len() != ENTRY_FIELD_COUNT {
            return false;
        }
        let must_be_empty = (0..7)
            .chain([SLOT_WEEK_OF_MONTH, SLOT_DAY_OF_MONTH])
            .chain(11..ENTRY_FIELD_COUNT);
        must_be_empty
            .map(|idx| slots[idx])
            .all(str::is_empty)
    })
}

/// Rule 9: reserved slots are empty in every entry regardless of hour type.
/// Intentionally overlaps rules 7/8: a generator that guesses the hour type
/// wrong must still be caught here.
pub fn rule_reserved_slots_empty(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        RESERVED_SLOTS
            .into_iter()
            .all(|idx| slot(slots, idx) == Some(""))
    })
}

/// Rule 10: the hour type slot holds one of the five recognized labels.
pub fn rule_hour_type_enum(candidate: &ScheduleCandidate) -> bool {
    all_entries(candidate, |slots| {
        slot(slots, SLOT_HOUR_TYPE)
            .and_then(HourType::parse_label)
            .is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(original: &str, formatted: &str) -> ScheduleCandidate {
        ScheduleCandidate::assembled(original, formatted)
    }

    fn battery(original: &str, formatted: &str) -> ValidationReport {
        let mut c = candidate(original, formatted);
        run_rule_battery(&mut c)
    }

    #[test]
    fn scenario_a_weekly_entry_passes_all_rules() {
        let report = battery(
            "Every Monday, from 3pm-5pm",
            "Monday,15:00,17:00,,,,,,,,Weekly,,,",
        );
        assert!(report.is_valid);
        assert!(report.failed_rules.is_empty());
    }

    #[test]
    fn scenario_b_close_before_open_fails_ordering_rule() {
        let report = battery(
            "Every Monday, from 2pm-1pm",
            "Monday,14:00,13:00,,,,,,,,Weekly,,,",
        );
        assert!(!report.is_valid);
        assert_eq!(report.failed_rules, vec![RuleId::OpenBeforeClose]);
    }

    #[test]
    fn scenario_c_ordinal_cross_reference_passes() {
        let report = battery(
            "3rd Tuesday, 9am-10am",
            "Tuesday,09:00,10:00,,,,,,,3,Day of Month,,,",
        );
        assert!(report.is_valid);
    }

    #[test]
    fn scenario_c_ordinal_word_variant_also_passes() {
        let report = battery(
            "The third Tuesday of each month, 9am-10am",
            "Tuesday,09:00,10:00,,,,,,,3,Day of Month,,,",
        );
        assert!(report.is_valid);
    }

    #[test]
    fn scenario_d_invented_ordinal_fails_cross_reference() {
        let report = battery(
            "3rd Tuesday, 9am-10am",
            "Tuesday,09:00,10:00,,,,,,,7,Day of Month,,,",
        );
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::DayOfMonthShape));
    }

    #[test]
    fn scenario_e_canonicalized_info_entry_passes_rule_8() {
        // Text-adapter output for a marker-only generation.
        let report = battery(
            "Call for hours",
            ",,,,,,,Call for Information,,,Call for Information,,,",
        );
        assert!(report.is_valid, "failed: {:?}", report.failed_rules);
    }

    #[test]
    fn week_of_month_shape_mirrors_day_of_month() {
        let report = battery(
            "2nd week of the month, Friday 8:30am-noon",
            "Friday,08:30,12:00,,,,,,2,,Week of Month,,,",
        );
        assert!(report.is_valid);

        let report = battery(
            "Friday mornings",
            "Friday,08:30,12:00,,,,,,2,,Week of Month,,,",
        );
        assert!(!report.is_valid);
        assert_eq!(report.failed_rules, vec![RuleId::WeekOfMonthShape]);
    }

    #[test]
    fn ordinal_slot_on_wrong_side_fails_shape_rule() {
        let report = battery(
            "3rd Tuesday, 9am-10am",
            "Tuesday,09:00,10:00,,,,,,3,,Day of Month,,,",
        );
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::DayOfMonthShape));
    }

    #[test]
    fn weekly_entry_with_ordinal_fails_weekly_shape() {
        let report = battery(
            "Every Monday 3pm-5pm",
            "Monday,15:00,17:00,,,,,,,3,Weekly,,,",
        );
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::WeeklyShape));
    }

    #[test]
    fn unknown_hour_type_fails_enum_rule() {
        let report = battery(
            "Friday 3pm-5pm",
            "Friday,15:00,17:00,,,,,,,,Year of Week,,,",
        );
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::HourTypeEnum));
    }

    #[test]
    fn misspelled_weekday_fails_day_rule() {
        let report = battery(
            "Mursday noon to 1",
            "Mursday,12:00,13:00,,,,,,,,Weekly,,,",
        );
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::DayOfWeek));
    }

    #[test]
    fn twelve_hour_clock_fails_time_syntax() {
        let report = battery(
            "Monday noon to 1pm",
            "Monday,12pm,1pm,,,,,,,,Weekly,,,",
        );
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::OpenCloseTimeSyntax));
        assert!(report.failed_rules.contains(&RuleId::OpenBeforeClose));
    }

    #[test]
    fn populated_reserved_slot_fails_reserved_rule() {
        let report = battery(
            "Monday 3pm-5pm",
            "Monday,15:00,17:00,x,,,,,,,Weekly,,,",
        );
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::ReservedSlotsEmpty));
    }

    #[test]
    fn comma_count_invariant_holds_for_valid_multi_entry_candidates() {
        let formatted =
            "Tuesday,09:00,10:00,,,,,,,3,Day of Month,,,;Wednesday,09:00,10:00,,,,,,,,Weekly,,,";
        let report = battery("3rd Tuesday and every Wednesday, 9am-10am", formatted);
        assert!(report.is_valid);
        let semicolons = formatted.matches(';').count();
        let commas = formatted.matches(',').count();
        assert_eq!(commas, 13 * (semicolons + 1));
    }

    #[test]
    fn short_entry_fails_format_without_panicking() {
        let report = battery("Monday noon", "Monday,12:00,13:00,3,Week of Month");
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::EntryFormat));
    }

    #[test]
    fn truncated_entry_fails_every_rule_that_touches_missing_slots() {
        // Two slots only: everything downstream of the split must report
        // failure, not index out of range.
        let report = battery("whenever", "Monday,09:00");
        assert!(!report.is_valid);
        assert!(report.failed_rules.contains(&RuleId::EntryFormat));
        assert!(report.failed_rules.contains(&RuleId::HourTypeEnum));
        assert!(report.failed_rules.contains(&RuleId::ReservedSlotsEmpty));
    }

    #[test]
    fn one_bad_entry_invalidates_the_whole_candidate() {
        let report = battery(
            "Mon and Tue",
            "Monday,09:00,10:00,,,,,,,,Weekly,,,;Tuesday,10:00,09:00,,,,,,,,Weekly,,,",
        );
        assert!(!report.is_valid);
        assert_eq!(report.failed_rules, vec![RuleId::OpenBeforeClose]);
    }

    #[test]
    fn call_for_information_never_fails_rule_8_when_canonical() {
        let c = candidate("call us", ",,,,,,,,,,Call for Information,,,");
        assert!(rule_call_for_information_shape(&c));
        assert!(rule_day_of_week(&c));
        assert!(rule_open_close_time_syntax(&c));
        assert!(rule_open_before_close(&c));
    }

    #[test]
    fn call_for_information_with_times_fails_rule_8() {
        let report = battery(
            "call us",
            "Monday,09:00,10:00,,,,,,,,Call for Information,,,",
        );
        assert!(!report.is_valid);
        assert!(report
            .failed_rules
            .contains(&RuleId::CallForInformationShape));
    }

    #[test]
    fn battery_is_idempotent() {
        let mut c = candidate(
            "3rd Tuesday, 9am-10am",
            "Tuesday,09:00,10:00,,,,,,,7,Day of Month,,,",
        );
        let first = run_rule_battery(&mut c);
        let second = run_rule_battery(&mut c);
        assert_eq!(first.is_valid, second.is_valid);
        assert_eq!(first.failed_rules, second.failed_rules);
    }

    #[test]
    fn report_labels_are_stable() {
        let report = battery("whenever", "not,a,schedule");
        let labels = report.failed_rule_labels();
        assert!(labels.contains(&"entry_format".to_string()));
        assert!(labels.contains(&"hour_type_enum".to_string()));
    }
}
