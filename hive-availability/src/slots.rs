use hive_common::{BusyInterval, FreeSlot, TimeWindow};

/// Free slots of one member inside `window`.
///
/// Busy intervals may arrive unsorted and overlapping. Intervals outside the
/// window are dropped and those straddling an edge are clipped, so every
/// emitted slot lies inside the window. The result is sorted and disjoint.
pub fn compute_free_slots(busy: &[BusyInterval], window: &TimeWindow) -> Vec<FreeSlot> {
    let mut sorted: Vec<BusyInterval> = busy.iter().filter_map(|b| b.clip_to(window)).collect();
    sorted.sort_by_key(|b| b.start);

    let mut slots = Vec::new();
    let mut cursor = window.start;

    for interval in &sorted {
        if cursor < interval.start {
            slots.push(FreeSlot::new(cursor, interval.start));
        }
        cursor = cursor.max(interval.end);
    }

    if cursor < window.end {
        slots.push(FreeSlot::new(cursor, window.end));
    }

    slots
}

/// Pairwise intersection of two slot lists.
pub fn intersect_slots(a: &[FreeSlot], b: &[FreeSlot]) -> Vec<FreeSlot> {
    let mut left = a.to_vec();
    let mut right = b.to_vec();
    left.sort_by_key(|s| s.start);
    right.sort_by_key(|s| s.start);

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if let Some(common) = left[i].intersect(&right[j]) {
            out.push(common);
        }
        // Advance whichever slot finishes first; it cannot meet anything further.
        if left[i].end <= right[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// Slots free for every member of the group.
///
/// An empty group has no common time.
pub fn common_free_slots(per_member: &[Vec<FreeSlot>]) -> Vec<FreeSlot> {
    let mut iter = per_member.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    iter.fold(first.clone(), |acc, slots| intersect_slots(&acc, slots))
}
