//! Natural-language date parsing
//!
//! The pipeline only depends on [`DateParser`]; [`ChronoDateParser`] is the
//! default rule-based implementation.

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

use super::text_normalizer::parse_number;

/// Time used when a date is given without a time of day
pub const DEFAULT_TIME: (u32, u32) = (9, 0);

/// Date/time parser collaborator
pub trait DateParser: Send + Sync {
    /// Find a date and/or time in free text
    fn parse_date(&self, text: &str) -> Option<NaiveDateTime>;
}

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

const MONTH_ALT: &str = "january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept|sep|october|oct|november|nov|december|dec";

lazy_static! {
    static ref ISO_DATE: Regex =
        Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid iso date regex");
    static ref SLASH_DATE: Regex =
        Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").expect("valid slash date regex");
    static ref MONTH_DAY: Regex = Regex::new(&format!(
        r"\b(?:on\s+)?({MONTH_ALT})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .expect("valid month-day regex");
    static ref DAY_MONTH: Regex = Regex::new(&format!(
        r"\b(?:on\s+)?(?:the\s+)?(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_ALT})\b"
    ))
    .expect("valid day-month regex");
    static ref RELATIVE: Regex = Regex::new(
        r"\bin\s+(\d+|one|two|three|four|five|six|seven|eight|nine|ten)\s+(days?|weeks?)\b"
    )
    .expect("valid relative date regex");
    static ref WEEKDAY: Regex = Regex::new(
        r"\b(?:(next|this|on|by)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b"
    )
    .expect("valid weekday regex");
    static ref DAY_WORD: Regex = Regex::new(
        r"\b(?:(?:on|by|for)\s+)?(day after tomorrow|tomorrow|today|tonight|next week)\b"
    )
    .expect("valid day word regex");
    static ref TIME_AMPM: Regex =
        Regex::new(r"\b(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("valid am/pm regex");
    static ref TIME_24H: Regex =
        Regex::new(r"\b(?:at\s+)?(\d{1,2}):(\d{2})\b").expect("valid 24h time regex");
    static ref TIME_BARE_AT: Regex = Regex::new(r"\bat\s+(\d{1,2})\b").expect("valid bare time regex");
    static ref TIME_WORD: Regex = Regex::new(
        r"\b(?:(?:at|in the|this)\s+)?(noon|midnight|morning|afternoon|evening)\b"
    )
    .expect("valid time word regex");
    /// Every pattern above, for stripping dates out of titles and topics
    static ref TEMPORAL: Vec<&'static Regex> = vec![
        &*ISO_DATE,
        &*SLASH_DATE,
        &*MONTH_DAY,
        &*DAY_MONTH,
        &*RELATIVE,
        &*WEEKDAY,
        &*DAY_WORD,
        &*TIME_AMPM,
        &*TIME_24H,
        &*TIME_BARE_AT,
        &*TIME_WORD,
    ];
}

/// Rule-based parser over chrono
#[derive(Debug, Clone, Default)]
pub struct ChronoDateParser {
    /// Fixed "now" for deterministic tests; `None` uses the local clock
    reference: Option<NaiveDateTime>,
}

impl ChronoDateParser {
    pub fn new() -> Self {
        Self { reference: None }
    }

    /// Parser anchored at a fixed moment
    pub fn with_reference(reference: NaiveDateTime) -> Self {
        Self {
            reference: Some(reference),
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.reference
            .unwrap_or_else(|| Local::now().naive_local())
    }

    fn parse_day(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        if let Some(caps) = ISO_DATE.captures(text) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        if let Some(caps) = DAY_WORD.captures(text) {
            let offset = match &caps[1] {
                "day after tomorrow" => 2,
                "tomorrow" => 1,
                "next week" => 7,
                _ => 0,
            };
            return today.checked_add_days(Days::new(offset));
        }

        if let Some(caps) = RELATIVE.captures(text) {
            let n = parse_number(&caps[1])? as u64;
            let days = if caps[2].starts_with("week") { n * 7 } else { n };
            return today.checked_add_days(Days::new(days));
        }

        if let Some(caps) = WEEKDAY.captures(text) {
            let target = WEEKDAYS.iter().position(|d| *d == &caps[2])? as i64;
            let current = today.weekday().num_days_from_monday() as i64;
            let mut diff = (target - current).rem_euclid(7);
            if diff == 0 {
                diff = 7;
            }
            return today.checked_add_days(Days::new(diff as u64));
        }

        if let Some(caps) = MONTH_DAY.captures(text) {
            return month_day(today, &caps[1], &caps[2]);
        }

        if let Some(caps) = DAY_MONTH.captures(text) {
            return month_day(today, &caps[2], &caps[1]);
        }

        if let Some(caps) = SLASH_DATE.captures(text) {
            let month: u32 = caps[1].parse().ok()?;
            let day: u32 = caps[2].parse().ok()?;
            let year = match caps.get(3) {
                Some(y) => {
                    let y: i32 = y.as_str().parse().ok()?;
                    if y < 100 {
                        2000 + y
                    } else {
                        y
                    }
                }
                None => today.year(),
            };
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        None
    }

    fn parse_time(&self, text: &str) -> Option<NaiveTime> {
        if let Some(caps) = TIME_AMPM.captures(text) {
            let mut hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            if hour == 0 || hour > 12 {
                return None;
            }
            match &caps[3] {
                "pm" if hour != 12 => hour += 12,
                "am" if hour == 12 => hour = 0,
                _ => {}
            }
            return NaiveTime::from_hms_opt(hour, minute, 0);
        }

        if let Some(caps) = TIME_24H.captures(text) {
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps[2].parse().ok()?;
            return NaiveTime::from_hms_opt(hour, minute, 0);
        }

        if let Some(caps) = TIME_BARE_AT.captures(text) {
            let mut hour: u32 = caps[1].parse().ok()?;
            // "at 3" almost always means the afternoon
            if (1..8).contains(&hour) {
                hour += 12;
            }
            return NaiveTime::from_hms_opt(hour, 0, 0);
        }

        if let Some(caps) = TIME_WORD.captures(text) {
            let hour = match &caps[1] {
                "noon" => 12,
                "midnight" => 0,
                "morning" => 9,
                "afternoon" => 14,
                _ => 18,
            };
            return NaiveTime::from_hms_opt(hour, 0, 0);
        }

        if text.contains("tonight") {
            return NaiveTime::from_hms_opt(20, 0, 0);
        }

        None
    }
}

impl DateParser for ChronoDateParser {
    fn parse_date(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.to_lowercase();
        let now = self.now();
        let day = self.parse_day(&text, now.date());
        let time = self.parse_time(&text);

        if day.is_none() && time.is_none() {
            return None;
        }

        let default_time = NaiveTime::from_hms_opt(DEFAULT_TIME.0, DEFAULT_TIME.1, 0)?;
        Some(day.unwrap_or(now.date()).and_time(time.unwrap_or(default_time)))
    }
}

/// Remove date and time phrases so they don't leak into topics or titles
pub fn strip_temporal(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in TEMPORAL.iter() {
        result = pattern.replace_all(&result, " ").to_string();
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn month_day(today: NaiveDate, month: &str, day: &str) -> Option<NaiveDate> {
    let month = MONTHS.iter().find(|(name, _)| *name == month)?.1;
    let day: u32 = day.parse().ok()?;
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ChronoDateParser {
        // Wednesday, 2025-03-12 10:30
        let reference = NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        ChronoDateParser::with_reference(reference)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_relative_days() {
        let p = parser();
        assert_eq!(p.parse_date("tomorrow at 3pm"), Some(at(2025, 3, 13, 15, 0)));
        assert_eq!(p.parse_date("today"), Some(at(2025, 3, 12, 9, 0)));
        assert_eq!(p.parse_date("tonight"), Some(at(2025, 3, 12, 20, 0)));
        assert_eq!(p.parse_date("in 2 weeks"), Some(at(2025, 3, 26, 9, 0)));
        assert_eq!(
            p.parse_date("the day after tomorrow at 10:15"),
            Some(at(2025, 3, 14, 10, 15))
        );
    }

    #[test]
    fn test_weekdays_are_always_in_the_future() {
        let p = parser();
        assert_eq!(p.parse_date("on friday"), Some(at(2025, 3, 14, 9, 0)));
        assert_eq!(p.parse_date("next wednesday"), Some(at(2025, 3, 19, 9, 0)));
        assert_eq!(p.parse_date("monday morning"), Some(at(2025, 3, 17, 9, 0)));
    }

    #[test]
    fn test_absolute_dates() {
        let p = parser();
        assert_eq!(p.parse_date("2025-05-01"), Some(at(2025, 5, 1, 9, 0)));
        assert_eq!(p.parse_date("march 20 at noon"), Some(at(2025, 3, 20, 12, 0)));
        assert_eq!(p.parse_date("3rd of january"), Some(at(2026, 1, 3, 9, 0)));
        assert_eq!(p.parse_date("4/2"), Some(at(2025, 4, 2, 9, 0)));
    }

    #[test]
    fn test_time_only_means_today() {
        let p = parser();
        assert_eq!(p.parse_date("at 7:45 pm"), Some(at(2025, 3, 12, 19, 45)));
        assert_eq!(p.parse_date("at 4"), Some(at(2025, 3, 12, 16, 0)));
    }

    #[test]
    fn test_no_date() {
        let p = parser();
        assert_eq!(p.parse_date("make 5 flashcards about react"), None);
    }

    #[test]
    fn test_strip_temporal() {
        assert_eq!(
            strip_temporal("chemistry exam tomorrow at 3pm"),
            "chemistry exam"
        );
        assert_eq!(strip_temporal("meeting with sam on friday"), "meeting with sam");
        assert_eq!(strip_temporal("physics"), "physics");
    }
}
