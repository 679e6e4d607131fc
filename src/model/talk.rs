//! A single scheduled talk belonging to one seminar series.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{FieldValue, Record};

use super::Faceted;

/// A talk, constructed fresh per request from a store query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Talk {
    /// Shortname of the owning series.
    pub seminar_id: String,
    /// Counter within the series; `(seminar_id, seminar_ctr)` is the key.
    pub seminar_ctr: u32,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    pub speaker: String,
    #[serde(default)]
    pub speaker_email: String,
    #[serde(default)]
    pub speaker_affiliation: String,
    #[serde(default)]
    pub speaker_homepage: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Access tier tag (`open` / `users`), independent of display/hidden.
    #[serde(default = "default_access")]
    pub access: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub video_link: String,
    #[serde(default)]
    pub slides_link: String,
    #[serde(default)]
    pub paper_link: String,
    #[serde(default)]
    pub stream_link: String,
    #[serde(default)]
    pub comments: String,
    /// Moderation flag; talks with `display = false` never appear.
    #[serde(default = "default_true")]
    pub display: bool,
    /// Organizer-set flag; legacy rows may lack it entirely.
    #[serde(default)]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub deleted: bool,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_access() -> String {
    super::ACCESS_OPEN.to_string()
}

fn default_true() -> bool {
    true
}

impl Faceted for Talk {
    fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }

    fn subjects(&self) -> &BTreeSet<String> {
        &self.subjects
    }

    fn language(&self) -> &str {
        &self.language
    }
}

impl Record for Talk {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "seminar_id" => FieldValue::Str(&self.seminar_id),
            "seminar_ctr" => FieldValue::Int(i64::from(self.seminar_ctr)),
            "title" => FieldValue::Str(&self.title),
            "abstract" => FieldValue::Str(&self.abstract_text),
            "speaker" => FieldValue::Str(&self.speaker),
            "speaker_email" => FieldValue::Str(&self.speaker_email),
            "speaker_affiliation" => FieldValue::Str(&self.speaker_affiliation),
            "speaker_homepage" => FieldValue::Str(&self.speaker_homepage),
            "start_time" => FieldValue::Time(self.start_time),
            "end_time" => FieldValue::Time(self.end_time),
            "topics" => FieldValue::StrSet(&self.topics),
            "subjects" => FieldValue::StrSet(&self.subjects),
            "language" => FieldValue::Str(&self.language),
            "access" => FieldValue::Str(&self.access),
            "online" => FieldValue::Bool(self.online),
            "room" => {
                if self.room.is_empty() {
                    FieldValue::Missing
                } else {
                    FieldValue::Str(&self.room)
                }
            }
            "video_link" => FieldValue::Str(&self.video_link),
            "slides_link" => FieldValue::Str(&self.slides_link),
            "paper_link" => FieldValue::Str(&self.paper_link),
            "stream_link" => FieldValue::Str(&self.stream_link),
            "comments" => FieldValue::Str(&self.comments),
            "display" => FieldValue::Bool(self.display),
            "hidden" => match self.hidden {
                Some(b) => FieldValue::Bool(b),
                None => FieldValue::Missing,
            },
            "deleted" => FieldValue::Bool(self.deleted),
            _ => FieldValue::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample() -> Talk {
        Talk {
            seminar_id: "numthy".to_string(),
            seminar_ctr: 7,
            title: "Zeros of the zeta function".to_string(),
            abstract_text: "We discuss the Riemann hypothesis.".to_string(),
            speaker: "Leonhard Euler".to_string(),
            speaker_email: "euler@example.edu".to_string(),
            speaker_affiliation: "Basel".to_string(),
            speaker_homepage: String::new(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap(),
            topics: ["math_number-theory".to_string()].into_iter().collect(),
            subjects: ["math".to_string()].into_iter().collect(),
            language: "en".to_string(),
            access: "open".to_string(),
            online: true,
            room: String::new(),
            video_link: String::new(),
            slides_link: String::new(),
            paper_link: String::new(),
            stream_link: String::new(),
            comments: String::new(),
            display: true,
            hidden: None,
            deleted: false,
        }
    }

    #[test]
    fn test_room_projects_missing_when_empty() {
        let mut talk = sample();
        assert!(matches!(talk.field("room"), FieldValue::Missing));
        talk.room = "MC 5501".to_string();
        assert!(matches!(talk.field("room"), FieldValue::Str("MC 5501")));
    }

    #[test]
    fn test_unknown_field_is_missing() {
        let talk = sample();
        assert!(matches!(talk.field("nonsense"), FieldValue::Missing));
    }
}
