//! ICS (RFC 5545) rendering for talk calendars.

use chrono::{DateTime, Utc};

use crate::model::Talk;

const PRODID: &str = "-//colloquia//seminar directory//EN";

/// Render talks as a VCALENDAR of VEVENTs.
///
/// `now` becomes the DTSTAMP of every event so feeds are reproducible in
/// tests.
pub fn render_ics(talks: &[Talk], now: DateTime<Utc>) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];
    for talk in talks {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!(
            "UID:{}-{}@colloquia",
            escape_text(&talk.seminar_id),
            talk.seminar_ctr
        ));
        lines.push(format!("DTSTAMP:{}", format_utc(now)));
        lines.push(format!("DTSTART:{}", format_utc(talk.start_time)));
        lines.push(format!("DTEND:{}", format_utc(talk.end_time)));
        let summary = if talk.speaker.is_empty() {
            talk.title.clone()
        } else {
            format!("{} - {}", talk.title, talk.speaker)
        };
        lines.push(format!("SUMMARY:{}", escape_text(&summary)));
        if !talk.abstract_text.is_empty() {
            lines.push(format!("DESCRIPTION:{}", escape_text(&talk.abstract_text)));
        }
        if !talk.room.is_empty() {
            lines.push(format!("LOCATION:{}", escape_text(&talk.room)));
        }
        if !talk.video_link.is_empty() {
            lines.push(format!("URL:{}", escape_text(&talk.video_link)));
        } else if !talk.stream_link.is_empty() {
            lines.push(format!("URL:{}", escape_text(&talk.stream_link)));
        }
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        for folded in fold_line(&line) {
            out.push_str(&folded);
            out.push_str("\r\n");
        }
    }
    out
}

fn format_utc(t: DateTime<Utc>) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape text per RFC 5545: backslash, semicolon, comma, and newlines.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line at 75 octets; continuations start with a space.
fn fold_line(line: &str) -> Vec<String> {
    const LIMIT: usize = 75;
    let mut parts = Vec::new();
    let mut current = String::new();
    for ch in line.chars() {
        if current.len() + ch.len_utf8() > LIMIT {
            parts.push(current);
            current = " ".to_string();
        }
        current.push(ch);
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn talk() -> Talk {
        Talk {
            seminar_id: "numthy".to_string(),
            seminar_ctr: 7,
            title: "Zeros, poles; and more".to_string(),
            abstract_text: "Line one\nLine two".to_string(),
            speaker: "Leonhard Euler".to_string(),
            speaker_email: String::new(),
            speaker_affiliation: String::new(),
            speaker_homepage: String::new(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap(),
            topics: BTreeSet::new(),
            subjects: BTreeSet::new(),
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

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_calendar_structure() {
        let ics = render_ics(&[talk()], now());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("BEGIN:VEVENT\r\n"));
        assert!(ics.contains("UID:numthy-7@colloquia\r\n"));
        assert!(ics.contains("DTSTART:20240115T140000Z\r\n"));
        assert!(ics.contains("DTEND:20240115T150000Z\r\n"));
    }

    #[test]
    fn test_text_escaping() {
        let ics = render_ics(&[talk()], now());
        assert!(ics.contains("SUMMARY:Zeros\\, poles\\; and more - Leonhard Euler"));
        assert!(ics.contains("DESCRIPTION:Line one\\nLine two"));
    }

    #[test]
    fn test_long_lines_folded() {
        let mut long = talk();
        long.abstract_text = "x".repeat(300);
        let ics = render_ics(&[long], now());
        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "unfolded line: {line:?}");
        }
        assert!(ics.contains("\r\n x"));
    }

    #[test]
    fn test_empty_talk_list() {
        let ics = render_ics(&[], now());
        assert!(!ics.contains("VEVENT"));
        assert!(ics.contains("PRODID"));
    }
}
