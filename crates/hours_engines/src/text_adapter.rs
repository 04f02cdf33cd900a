#![forbid(unsafe_code)]

use hours_contracts::schedule::{SLOT_HOUR_TYPE, SLOT_INFO_MARKER};
use hours_contracts::{HourType, ENTRY_FIELD_COUNT, ENTRY_SEPARATOR, FIELD_SEPARATOR};

/// Raw marker some generations emit in the info slot instead of setting the
/// hour type.
const INFO_MARKER_SKEW: &str = "For information";

/// Split a multi-part hours description into independently generated
/// clauses.
pub fn split_clauses(raw: &str) -> Vec<&str> {
    raw.split(ENTRY_SEPARATOR).collect()
}

/// Normalize one clause before it is sent to the generation service.
/// Slashes read as day/time list separators ("Mon/Wed 9-5"), which collides
/// with the delimiter grammar the prompt teaches, so they become commas.
pub fn preprocess_clause(raw: &str) -> String {
    raw.trim().replace('/', ", ")
}

/// Canonicalize one raw generated entry before assembly.
///
/// Known output skew: the generator signals "no regular hours" by filling
/// the info-marker slot and leaving the hour type unset. When the marker is
/// the only populated slot (hour type aside), force the canonical
/// Call-for-Information type; when it carries the literal skew text, rewrite
/// it to the canonical label. Entries that do not split into 14 slots pass
/// through untouched for the rule battery to reject.
pub fn postprocess_entry(raw: &str) -> String {
    let mut slots: Vec<String> = raw
        .split(FIELD_SEPARATOR)
        .map(str::to_string)
        .collect();
    if slots.len() != ENTRY_FIELD_COUNT {
        return raw.to_string();
    }

    let marker_only = !slots[SLOT_INFO_MARKER].is_empty()
        && slots
            .iter()
            .enumerate()
            .all(|(idx, slot)| {
                idx == SLOT_INFO_MARKER || idx == SLOT_HOUR_TYPE || slot.is_empty()
            });
    if marker_only {
        slots[SLOT_HOUR_TYPE] = HourType::CallForInformation.as_label().to_string();
    }
    if slots[SLOT_INFO_MARKER] == INFO_MARKER_SKEW {
        slots[SLOT_INFO_MARKER] = HourType::CallForInformation.as_label().to_string();
    }
    slots.join(",")
}
