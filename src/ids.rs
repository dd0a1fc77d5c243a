use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use log::warn;

use crate::models::group::Group;

/// Hands out group ids that only ever go up.
///
/// The counter starts at the current time in milliseconds so ids stay ahead of
/// those written by earlier runs, and every call also moves past the largest id
/// already present in the collection being appended to. When that would
/// overflow `i64`, the lowest free positive id is used instead.
#[derive(Debug)]
pub struct GroupIdGenerator {
    last: AtomicI64,
}

impl GroupIdGenerator {
    pub fn new() -> Self {
        GroupIdGenerator::starting_at(Utc::now().timestamp_millis())
    }

    pub fn starting_at(last: i64) -> Self {
        GroupIdGenerator {
            last: AtomicI64::new(last),
        }
    }

    pub fn next_id(&self, existing: &[Group]) -> i64 {
        let floor = existing.iter().map(|group| group.id).max().unwrap_or(i64::MIN);
        let mut current = self.last.load(Ordering::SeqCst);
        loop {
            let Some(candidate) = current.max(floor).checked_add(1) else {
                let id = lowest_free_id(existing);
                warn!("Group ids exhausted at i64::MAX, reusing free id {}", id);
                return id;
            };
            match self.last.compare_exchange(current, candidate, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Smallest positive id no group in `existing` uses.
fn lowest_free_id(existing: &[Group]) -> i64 {
    let used: HashSet<i64> = existing.iter().map(|group| group.id).collect();
    (1..=existing.len() as i64 + 1)
        .find(|id| !used.contains(id))
        .unwrap_or(1)
}

impl Default for GroupIdGenerator {
    fn default() -> Self {
        GroupIdGenerator::new()
    }
}

// test module
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_without_gaps_in_quick_succession() {
        let ids = GroupIdGenerator::starting_at(100);
        assert_eq!(ids.next_id(&[]), 101);
        assert_eq!(ids.next_id(&[]), 102);
        assert_eq!(ids.next_id(&[]), 103);
    }

    #[test]
    fn test_skips_past_existing_ids() {
        let ids = GroupIdGenerator::starting_at(5);
        let existing = vec![Group::new(40, "a", vec![]), Group::new(12, "b", vec![])];
        assert_eq!(ids.next_id(&existing), 41);
        assert_eq!(ids.next_id(&[]), 42);
    }

    #[test]
    fn test_stored_max_id_does_not_overflow() {
        let ids = GroupIdGenerator::starting_at(10);
        let existing = vec![Group::new(i64::MAX, "max", vec![]), Group::new(1, "one", vec![])];
        assert_eq!(ids.next_id(&existing), 2);
    }

    #[test]
    fn test_saturated_counter_falls_back_to_free_id() {
        let ids = GroupIdGenerator::starting_at(i64::MAX);
        assert_eq!(ids.next_id(&[]), 1);
        assert_eq!(ids.next_id(&[Group::new(1, "a", vec![])]), 2);
    }

    #[test]
    fn test_default_starts_from_clock() {
        let before = Utc::now().timestamp_millis();
        let id = GroupIdGenerator::default().next_id(&[]);
        assert!(id > before);
    }
}
