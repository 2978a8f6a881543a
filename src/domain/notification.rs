use chrono::{DateTime, TimeZone};

const HELD_TEXT: &str = "開催あり 🎉";
const NOT_HELD_TEXT: &str = "開催なし ❌";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub date: String,
    pub body_text: String,
}

impl NotificationMessage {
    pub fn new(date: &str, venue_name: &str, held: bool) -> Self {
        let held_text = match held {
            true => HELD_TEXT,
            false => NOT_HELD_TEXT,
        };

        NotificationMessage {
            date: date.to_string(),
            body_text: format!("{} の{}競艇：{}", date, venue_name, held_text),
        }
    }

    pub fn for_day<Tz>(day: &DateTime<Tz>, venue_name: &str, held: bool) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let date = day.format("%Y-%m-%d").to_string();
        NotificationMessage::new(&date, venue_name, held)
    }
}
