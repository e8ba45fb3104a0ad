use crate::overlay::Overlay;
use domain::{EnrichedLiveRecord, LiveRecord, MetadataFields, MetadataLookup, SnapshotRecord};
use std::collections::HashMap;

/// Merges the current schedule with stale snapshot data and fresh metadata.
///
/// Title precedence is fresh metadata, then the previous snapshot, then
/// nothing. Snapshot entries without a non-empty title are ignored. The
/// output has exactly one record per current live, in the same order.
pub fn merge(
    current: &[LiveRecord],
    previous: &[SnapshotRecord],
    fresh: &MetadataLookup,
) -> Vec<EnrichedLiveRecord> {
    let stale_by_id: HashMap<&str, &SnapshotRecord> = previous
        .iter()
        .filter(|record| record.usable_title().is_some())
        .map(|record| (record.video_id.as_str(), record))
        .collect();

    let mut stale_hits = 0usize;
    let mut fresh_hits = 0usize;

    let merged: Vec<EnrichedLiveRecord> = current
        .iter()
        .map(|live| {
            let fresh_fields = fresh
                .get(&live.video_id)
                .map(MetadataFields::from)
                .unwrap_or_default();
            let stale_fields = stale_by_id
                .get(live.video_id.as_str())
                .map(|record| MetadataFields::from(*record))
                .unwrap_or_default();

            if fresh_fields.title.is_some() {
                fresh_hits += 1;
            } else if stale_fields.title.is_some() {
                stale_hits += 1;
            }

            let title = stale_fields.overlay(fresh_fields).title;
            title.overlay(live.clone())
        })
        .collect();

    tracing::debug!(
        lives = current.len(),
        fresh = fresh_hits,
        stale = stale_hits,
        "merged schedule"
    );

    merged
}
