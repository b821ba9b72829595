use std::collections::{BTreeMap, HashMap, HashSet};

use crate::snapshot::ProcessRecord;

/// Resident-page totals for the matched process groups.
///
/// `total_pages` always equals the sum over `pages_by_name`: every pid
/// contributes to exactly one name bucket.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Sum of resident pages across every process in every matched group.
    pub total_pages: u64,
    /// Per-command-name share of the total, lexicographically ordered.
    pub pages_by_name: BTreeMap<String, u64>,
}

/// Sum resident pages over the process groups that contain at least one
/// process named in `targets`.
///
/// Every pid in a matched group is counted, not only the ones whose name
/// matched: the goal is "memory used by this app and everything in its
/// process group", so a worker pool's siblings land in their own buckets
/// even when no target names them.
pub fn aggregate(records: &[ProcessRecord], targets: &[String]) -> AggregateResult {
    let mut records_by_group: HashMap<i32, Vec<&ProcessRecord>> = HashMap::new();
    let mut groups_by_name: HashMap<&str, HashSet<i32>> = HashMap::new();
    for record in records {
        records_by_group
            .entry(record.group_id)
            .or_default()
            .push(record);
        groups_by_name
            .entry(record.name.as_str())
            .or_default()
            .insert(record.group_id);
    }

    // A group is counted once no matter how many of its members matched.
    let matched_groups: HashSet<i32> = targets
        .iter()
        .filter_map(|name| groups_by_name.get(name.as_str()))
        .flatten()
        .copied()
        .collect();

    let mut result = AggregateResult::default();
    for group_id in matched_groups {
        for record in &records_by_group[&group_id] {
            // Malformed records must not skew the buckets.
            if record.resident_pages == 0 || record.name.is_empty() {
                continue;
            }
            result.total_pages += record.resident_pages;
            *result.pages_by_name.entry(record.name.clone()).or_default() +=
                record.resident_pages;
        }
    }
    result
}
