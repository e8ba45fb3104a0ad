use chrono::{DateTime, TimeDelta, Utc};
use domain::LiveRecord;

/// How far ahead of now a live may be scheduled and still get fresh metadata.
pub const RECENCY_WINDOW_HOURS: i64 = 24;

/// Whether `time` falls in `[now, now + 24h]`. Both bounds are inclusive.
pub fn within_window(time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let end = now + TimeDelta::hours(RECENCY_WINDOW_HOURS);
    now <= time && time <= end
}

/// Selects the lives that are imminent enough to be worth a metadata lookup.
///
/// Lives further out are picked up by a later run once they enter the window;
/// lives already in the past are left out. Input order is preserved.
pub fn recency_window(lives: &[LiveRecord], now: DateTime<Utc>) -> Vec<&LiveRecord> {
    lives
        .iter()
        .filter(|live| within_window(live.time, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn live_at(id: &str, time: DateTime<Utc>) -> LiveRecord {
        LiveRecord {
            video_id: id.to_string(),
            time,
            link: String::new(),
            streamer: String::new(),
            avatar: None,
            image_url: None,
            guests: Vec::new(),
            streaming: false,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let t = now();
        let day = TimeDelta::hours(24);
        let ms = TimeDelta::milliseconds(1);

        assert!(within_window(t, t));
        assert!(within_window(t + day, t));
        assert!(!within_window(t + day + ms, t));
        assert!(!within_window(t - ms, t));
    }

    #[test]
    fn window_keeps_imminent_lives_in_order() {
        let t = now();
        let lives = vec![
            live_at("past", t - TimeDelta::hours(2)),
            live_at("soon", t + TimeDelta::hours(1)),
            live_at("far", t + TimeDelta::hours(30)),
            live_at("now", t),
            live_at("edge", t + TimeDelta::hours(24)),
        ];

        let ids: Vec<&str> = recency_window(&lives, t)
            .into_iter()
            .map(|live| live.video_id.as_str())
            .collect();
        assert_eq!(ids, vec!["soon", "now", "edge"]);
    }

    #[test]
    fn empty_input_gives_empty_window() {
        assert!(recency_window(&[], now()).is_empty());
    }
}
