//! Reads the schedule page into live records.
//!
//! The page is a sequence of day headers (`MM/DD`, Japan time) each followed
//! by the cards of that day. A card links to the broadcast and carries the
//! start time, the streamer name, a preview thumbnail and one avatar per
//! participant; the first avatar belongs to the streamer.

mod images;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use domain::{ImageDictionary, LiveRecord};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

pub use images::ImageKeys;

const JST_OFFSET_SECONDS: i32 = 9 * 3600;

const ENTRY_SELECTOR: &str = ".holodule.navbar-text, a.thumbnail";
const TIME_SELECTOR: &str = ".datetime";
const NAME_SELECTOR: &str = ".name";
const IMAGE_SELECTOR: &str = "img";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid selector {selector:?}: {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
    #[error("no schedule found in page")]
    NoSchedule,
    #[error("unreadable day header {0:?}")]
    InvalidDay(String),
}

/// The current lives and the image dictionary they refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSchedule {
    pub lives: Vec<LiveRecord>,
    pub dict: ImageDictionary,
}

/// Parses the schedule page.
///
/// `image_map` is the dictionary published by the previous run, if it could
/// be fetched; known images keep their keys and new ones are appended. `now`
/// anchors the year of the page's `MM/DD` headers.
pub fn parse_schedule(
    html: &str,
    image_map: Option<&ImageDictionary>,
    now: DateTime<Utc>,
) -> Result<ParsedSchedule, ParseError> {
    let entry = selector(ENTRY_SELECTOR)?;
    let time = selector(TIME_SELECTOR)?;
    let name = selector(NAME_SELECTOR)?;
    let image = selector(IMAGE_SELECTOR)?;

    let document = Html::parse_document(html);
    let mut keys = ImageKeys::new(image_map.cloned().unwrap_or_default());
    let mut seen = HashSet::new();
    let mut lives = Vec::new();
    let mut day: Option<NaiveDate> = None;
    let mut headers = 0usize;

    for element in document.select(&entry) {
        if element.value().name() != "a" {
            let text = element_text(element);
            day = Some(parse_day(&text, now)?);
            headers += 1;
            continue;
        }

        let Some(date) = day else {
            tracing::debug!("skipping card before the first day header");
            continue;
        };

        let card = Card {
            element,
            time: &time,
            name: &name,
            image: &image,
        };
        match card.read(date, &mut keys) {
            Some(live) => {
                if seen.insert(live.video_id.clone()) {
                    lives.push(live);
                } else {
                    tracing::debug!(video_id = %live.video_id, "skipping duplicate card");
                }
            }
            None => tracing::debug!(
                href = element.value().attr("href").unwrap_or_default(),
                "skipping unreadable card"
            ),
        }
    }

    if headers == 0 {
        return Err(ParseError::NoSchedule);
    }

    tracing::debug!(lives = lives.len(), days = headers, "parsed schedule page");
    Ok(ParsedSchedule {
        lives,
        dict: keys.into_dictionary(),
    })
}

struct Card<'a> {
    element: ElementRef<'a>,
    time: &'a Selector,
    name: &'a Selector,
    image: &'a Selector,
}

impl Card<'_> {
    fn read(&self, date: NaiveDate, keys: &mut ImageKeys) -> Option<LiveRecord> {
        let link = self.element.value().attr("href")?.trim().to_string();
        let video_id = video_id_from_link(&link)?;

        let clock = self
            .element
            .select(self.time)
            .next()
            .map(element_text)
            .and_then(|text| NaiveTime::parse_from_str(&text, "%H:%M").ok())?;
        let time = jst()
            .from_local_datetime(&date.and_time(clock))
            .single()?
            .with_timezone(&Utc);

        let streamer = self
            .element
            .select(self.name)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let mut image_url = None;
        let mut avatars = Vec::new();
        for img in self.element.select(self.image) {
            let Some(src) = img.value().attr("src").map(str::trim) else {
                continue;
            };
            if image_url.is_none() && is_thumbnail(src) {
                image_url = Some(src.to_string());
            } else {
                avatars.push(keys.key_for(src));
            }
        }
        let mut avatars = avatars.into_iter();
        let avatar = avatars.next();

        let streaming = self
            .element
            .value()
            .attr("style")
            .is_some_and(|style| style.contains("red"));

        Some(LiveRecord {
            video_id,
            time,
            link,
            streamer,
            avatar,
            image_url,
            guests: avatars.collect(),
            streaming,
        })
    }
}

fn selector(source: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(source).map_err(|e| ParseError::Selector {
        selector: source,
        message: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

fn is_thumbnail(src: &str) -> bool {
    src.contains("img.youtube.com/vi/") || src.contains("i.ytimg.com/vi/")
}

/// Extracts the video id from a watch or short link.
pub fn video_id_from_link(link: &str) -> Option<String> {
    let id = if let Some((_, rest)) = link.split_once("youtu.be/") {
        rest.split(['?', '&', '#', '/']).next()
    } else {
        let (_, query) = link.split_once('?')?;
        query
            .split(['&', '#'])
            .find_map(|pair| pair.strip_prefix("v="))
    }?;

    (!id.is_empty()).then(|| id.to_string())
}

/// Reads a `MM/DD` day header and picks the year that puts it closest to
/// `now` in Japan time, so a January page read in late December lands in the
/// following year.
fn parse_day(text: &str, now: DateTime<Utc>) -> Result<NaiveDate, ParseError> {
    let invalid = || ParseError::InvalidDay(text.to_string());

    let head = text.split_whitespace().next().ok_or_else(invalid)?;
    let (month, day) = head.split_once('/').ok_or_else(invalid)?;
    let month: u32 = month.trim().parse().map_err(|_| invalid())?;
    let day: u32 = day.trim().parse().map_err(|_| invalid())?;

    let today = now.with_timezone(&jst()).date_naive();
    [today.year() - 1, today.year(), today.year() + 1]
        .into_iter()
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .min_by_key(|date| (*date - today).num_days().abs())
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        // 2024-05-01 21:00 JST
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn page(body: &str) -> String {
        format!("<html><body><div class=\"container\">{body}</div></body></html>")
    }

    fn card(id: &str, time: &str, name: &str, style: &str, avatars: &[&str]) -> String {
        let avatars: String = avatars
            .iter()
            .map(|src| format!("<img src=\"{src}\">"))
            .collect();
        format!(
            r#"<a href="https://www.youtube.com/watch?v={id}" class="thumbnail" style="{style}">
                <div class="datetime"> {time} </div>
                <div class="name"> {name} </div>
                <img src="https://img.youtube.com/vi/{id}/mqdefault.jpg">
                {avatars}
            </a>"#
        )
    }

    fn header(day: &str) -> String {
        format!(r#"<div class="holodule navbar-text"> {day} (水) </div>"#)
    }

    #[test]
    fn reads_cards_under_their_day() {
        let html = page(&format!(
            "{}{}{}{}",
            header("05/01"),
            card("aaa", "21:00", "Aqua", "border: 3px red solid", &["https://yt3/a.jpg"]),
            header("05/02"),
            card("bbb", "01:30", "Pekora", "", &["https://yt3/p.jpg", "https://yt3/a.jpg"]),
        ));

        let parsed = parse_schedule(&html, None, now()).unwrap();
        assert_eq!(parsed.lives.len(), 2);

        let first = &parsed.lives[0];
        assert_eq!(first.video_id, "aaa");
        assert_eq!(first.time, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(first.streamer, "Aqua");
        assert!(first.streaming);
        assert_eq!(
            first.image_url.as_deref(),
            Some("https://img.youtube.com/vi/aaa/mqdefault.jpg")
        );

        let second = &parsed.lives[1];
        assert_eq!(second.time, Utc.with_ymd_and_hms(2024, 5, 1, 16, 30, 0).unwrap());
        assert!(!second.streaming);
        assert_eq!(second.guests, vec![first.avatar.clone().unwrap()]);
        assert_eq!(parsed.dict.len(), 2);
    }

    #[test]
    fn page_without_headers_is_an_error() {
        let html = page("<p>maintenance</p>");
        assert!(matches!(
            parse_schedule(&html, None, now()),
            Err(ParseError::NoSchedule)
        ));
    }

    #[test]
    fn garbled_header_is_an_error() {
        let html = page(&header("tomorrow"));
        assert!(matches!(
            parse_schedule(&html, None, now()),
            Err(ParseError::InvalidDay(_))
        ));
    }

    #[test]
    fn cards_without_video_or_time_are_skipped() {
        let html = page(&format!(
            "{}{}{}{}",
            header("05/01"),
            r#"<a href="https://twitch.tv/someone" class="thumbnail"><div class="datetime">20:00</div></a>"#,
            card("ccc", "soon", "Noel", "", &[]),
            card("ddd", "22:00", "Flare", "", &[]),
        ));

        let parsed = parse_schedule(&html, None, now()).unwrap();
        let ids: Vec<&str> = parsed.lives.iter().map(|l| l.video_id.as_str()).collect();
        assert_eq!(ids, vec!["ddd"]);
        assert_eq!(parsed.lives[0].avatar, None);
    }

    #[test]
    fn duplicate_cards_keep_the_first() {
        let html = page(&format!(
            "{}{}{}",
            header("05/01"),
            card("aaa", "21:00", "Aqua", "", &[]),
            card("aaa", "23:00", "Aqua", "", &[]),
        ));

        let parsed = parse_schedule(&html, None, now()).unwrap();
        assert_eq!(parsed.lives.len(), 1);
        assert_eq!(parsed.lives[0].time.hour_jst(), 21);
    }

    #[test]
    fn existing_image_keys_are_reused() {
        let map = ImageDictionary::from([("7".to_string(), "https://yt3/a.jpg".to_string())]);
        let html = page(&format!(
            "{}{}",
            header("05/01"),
            card("aaa", "21:00", "Aqua", "", &["https://yt3/a.jpg", "https://yt3/new.jpg"]),
        ));

        let parsed = parse_schedule(&html, Some(&map), now()).unwrap();
        assert_eq!(parsed.lives[0].avatar.as_deref(), Some("7"));
        assert_eq!(parsed.lives[0].guests, vec!["8".to_string()]);
        assert_eq!(parsed.dict.get("8").map(String::as_str), Some("https://yt3/new.jpg"));
    }

    #[test]
    fn video_id_from_various_links() {
        assert_eq!(
            video_id_from_link("https://www.youtube.com/watch?v=abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            video_id_from_link("https://www.youtube.com/watch?feature=x&v=abc123&t=5").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            video_id_from_link("https://youtu.be/abc123?t=1").as_deref(),
            Some("abc123")
        );
        assert_eq!(video_id_from_link("https://www.youtube.com/watch?v="), None);
        assert_eq!(video_id_from_link("https://twitch.tv/x"), None);
    }

    #[test]
    fn day_header_rolls_over_the_year_end() {
        let late_december = Utc.with_ymd_and_hms(2024, 12, 31, 10, 0, 0).unwrap();
        assert_eq!(
            parse_day("01/01 (水)", late_december).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );

        let early_january = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(
            parse_day("12/31", early_january).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    trait HourJst {
        fn hour_jst(&self) -> u32;
    }

    impl HourJst for DateTime<Utc> {
        fn hour_jst(&self) -> u32 {
            use chrono::Timelike;
            self.with_timezone(&jst()).hour()
        }
    }
}
