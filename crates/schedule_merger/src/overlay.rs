//! Ordered field overlay.
//!
//! `base.overlay(over)` keeps every field of `base` that `over` does not
//! carry and takes every field that `over` does carry. The right-hand side
//! always wins, so chaining `a.overlay(b).overlay(c)` gives the precedence
//! `c > b > a`.

use domain::{EnrichedLiveRecord, LiveRecord, MetadataFields};

pub trait Overlay<Over = Self> {
    type Output;

    fn overlay(self, over: Over) -> Self::Output;
}

impl<T> Overlay for Option<T> {
    type Output = Option<T>;

    fn overlay(self, over: Option<T>) -> Option<T> {
        over.or(self)
    }
}

impl Overlay for MetadataFields {
    type Output = MetadataFields;

    fn overlay(self, over: MetadataFields) -> MetadataFields {
        MetadataFields {
            title: self.title.overlay(over.title),
            description: self.description.overlay(over.description),
            channel_id: self.channel_id.overlay(over.channel_id),
            channel_title: self.channel_title.overlay(over.channel_title),
            published_at: self.published_at.overlay(over.published_at),
        }
    }
}

/// Places a current record on top of a derived title.
///
/// [`LiveRecord`] has no title of its own, so the record contributes every
/// other field and the title comes from the base.
impl Overlay<LiveRecord> for Option<String> {
    type Output = EnrichedLiveRecord;

    fn overlay(self, live: LiveRecord) -> EnrichedLiveRecord {
        EnrichedLiveRecord { live, title: self }
    }
}
