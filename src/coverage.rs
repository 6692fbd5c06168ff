use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{CoverageSnapshot, ScheduleEntry, ShiftType};

/// Work entries per shift type on `date`. Types nobody works are absent.
pub fn staff_by_type(entries: &[ScheduleEntry], date: NaiveDate) -> BTreeMap<ShiftType, u32> {
    let mut counts = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.date == date && e.is_work()) {
        *counts.entry(entry.shift_type).or_insert(0) += 1;
    }
    counts
}

/// Staffing per involved shift type before and after a proposed swap.
///
/// This is bookkeeping, not a reassignment simulation: a same-type swap
/// changes nothing, a cross-type swap takes one person off the requester's
/// shift type and leaves the target's shift type as it was.
pub fn estimate_swap_impact(
    date: NaiveDate,
    entries: &[ScheduleEntry],
    requester_shift: ShiftType,
    target_shift: ShiftType,
    required_staff: u32,
) -> Vec<CoverageSnapshot> {
    let counts = staff_by_type(entries, date);
    let current = |shift_type: ShiftType| counts.get(&shift_type).copied().unwrap_or(0);

    let snapshot = |shift_type: ShiftType, after_swap_staff: u32| CoverageSnapshot {
        date,
        shift_type,
        current_staff: current(shift_type),
        after_swap_staff,
        required_staff,
    };

    if requester_shift == target_shift {
        return vec![snapshot(requester_shift, current(requester_shift))];
    }

    vec![
        snapshot(
            requester_shift,
            current(requester_shift).saturating_sub(1),
        ),
        snapshot(target_shift, current(target_shift)),
    ]
}

pub fn has_coverage_warning(snapshots: &[CoverageSnapshot]) -> bool {
    snapshots.iter().any(CoverageSnapshot::below_minimum)
}
