use std::collections::HashSet;

use crate::models::group::{Group, Summary};
use crate::validator::is_restorable_url;

/// Filters every group's urls down to restorable ones and drops the groups
/// left with nothing to restore. Group order is kept.
pub fn normalize(groups: Vec<Group>) -> Vec<Group> {
    groups
        .into_iter()
        .filter_map(|mut group| {
            group.urls.retain(|url| is_restorable_url(url));
            if group.urls.is_empty() {
                None
            } else {
                Some(group)
            }
        })
        .collect()
}

pub fn summarize(groups: &[Group]) -> Summary {
    Summary {
        group_count: groups.len(),
        tab_count: groups.iter().map(|group| group.urls.len()).sum(),
    }
}

/// The group's urls with repeats collapsed, in first-seen order.
pub fn unique_urls(group: &Group) -> Vec<String> {
    let mut seen = HashSet::new();
    group
        .urls
        .iter()
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}
