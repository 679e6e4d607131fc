//! Per-row class tags and visibility for client-side filtering.
//!
//! The browse pages filter rows in the browser without a round trip: every
//! row carries one class per topic/subject/language plus `*-filtered`
//! marker classes for each dimension whose current selection excludes it.
//! Whether an excluded row is actually hidden depends on the per-dimension
//! enforcement toggles; hidden rows do not advance the alternating
//! background.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::Faceted;

/// Client filter preferences, snapshotted from cookies per request.
#[derive(Debug, Clone, Default)]
pub struct FilterPrefs {
    /// Subjects the viewer has opted into.
    pub subjects: HashSet<String>,
    /// Whether subject filtering is enforced.
    pub filter_subject: bool,
    pub topics: HashSet<String>,
    pub filter_topic: bool,
    pub languages: HashSet<String>,
    pub filter_language: bool,
    /// Hide items not on the viewer's subscribed calendar.
    pub filter_calendar: bool,
}

impl FilterPrefs {
    /// Parse a `Cookie:` header value.
    ///
    /// Absent cookies mean empty selections and disabled toggles; a toggle
    /// cookie is on for any value other than `0`.
    pub fn from_cookie_header(header: &str) -> Self {
        let mut prefs = Self::default();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            match name {
                "subjects" => prefs.subjects = split_codes(value),
                "topics" => prefs.topics = split_codes(value),
                "languages" => prefs.languages = split_codes(value),
                "filter_subject" => prefs.filter_subject = value != "0",
                "filter_topic" => prefs.filter_topic = value != "0",
                "filter_language" => prefs.filter_language = value != "0",
                "filter_calendar" => prefs.filter_calendar = value != "0",
                _ => {}
            }
        }
        prefs
    }
}

fn split_codes(value: &str) -> HashSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Computed attributes for one result row.
#[derive(Debug, Clone, Serialize)]
pub struct RowAttributes {
    /// Ordered class-like tags.
    pub classes: Vec<String>,
    /// Whether an enforced dimension hides this row.
    pub filtered: bool,
    /// Inline style: hidden, or the alternating background.
    pub style: String,
}

/// Annotate a result list against the viewer's filter preferences.
///
/// `subscribed` reports whether an item is on the viewer's calendar.
pub fn annotate_rows<T: Faceted>(
    items: &[T],
    prefs: &FilterPrefs,
    subscribed: impl Fn(&T) -> bool,
) -> Vec<RowAttributes> {
    let mut attributes = Vec::with_capacity(items.len());
    let mut visible_counter = 0usize;
    for item in items {
        let (classes, filtered) = classify(item, prefs, &subscribed);
        let style = if filtered {
            "display: none;".to_string()
        } else {
            visible_counter += 1;
            if visible_counter % 2 == 1 {
                "background: none;".to_string()
            } else {
                "background: #E3F2FD;".to_string()
            }
        };
        attributes.push(RowAttributes {
            classes,
            filtered,
            style,
        });
    }
    attributes
}

fn classify<T: Faceted>(
    item: &T,
    prefs: &FilterPrefs,
    subscribed: &impl Fn(&T) -> bool,
) -> (Vec<String>, bool) {
    let mut filtered = false;
    let mut classes = vec!["talk".to_string()];

    let mut topic_excluded = true;
    for topic in item.topics() {
        classes.push(format!("topic-{topic}"));
        if prefs.topics.contains(topic) {
            topic_excluded = false;
        }
    }
    if topic_excluded {
        classes.push("topic-filtered".to_string());
        if prefs.filter_topic {
            filtered = true;
        }
    }

    let mut subject_excluded = true;
    for subject in item.subjects() {
        classes.push(format!("subject-{subject}"));
        if prefs.subjects.contains(subject) {
            subject_excluded = false;
        }
    }
    if subject_excluded {
        classes.push("subject-filtered".to_string());
        if prefs.filter_subject {
            filtered = true;
        }
    }

    classes.push(format!("lang-{}", item.language()));
    if !prefs.languages.contains(item.language()) {
        classes.push("language-filtered".to_string());
        if prefs.filter_language {
            filtered = true;
        }
    }

    if !subscribed(item) {
        classes.push("calendar-filtered".to_string());
        if prefs.filter_calendar {
            filtered = true;
        }
    }

    (classes, filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    struct Item {
        topics: BTreeSet<String>,
        subjects: BTreeSet<String>,
        language: String,
    }

    impl Item {
        fn with_topics(topics: &[&str]) -> Self {
            Self {
                topics: topics.iter().map(|s| s.to_string()).collect(),
                subjects: ["math".to_string()].into_iter().collect(),
                language: "en".to_string(),
            }
        }
    }

    impl Faceted for Item {
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

    fn prefs_topic_t1() -> FilterPrefs {
        FilterPrefs {
            topics: ["t1".to_string()].into_iter().collect(),
            filter_topic: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_enforced_topic_filter_hides_and_skips_alternation() {
        let items = vec![
            Item::with_topics(&["t1"]),
            Item::with_topics(&["t1", "t2"]),
            Item::with_topics(&["t2"]),
        ];
        let rows = annotate_rows(&items, &prefs_topic_t1(), |_| true);

        assert!(!rows[0].filtered);
        assert_eq!(rows[0].style, "background: none;");
        assert!(!rows[1].filtered);
        assert_eq!(rows[1].style, "background: #E3F2FD;");
        assert!(rows[2].filtered);
        assert_eq!(rows[2].style, "display: none;");
    }

    #[test]
    fn test_alternation_counts_visible_rows_only() {
        let items = vec![
            Item::with_topics(&["t2"]),
            Item::with_topics(&["t1"]),
            Item::with_topics(&["t1"]),
        ];
        let rows = annotate_rows(&items, &prefs_topic_t1(), |_| true);
        // First row hidden; the next visible row is "odd".
        assert_eq!(rows[1].style, "background: none;");
        assert_eq!(rows[2].style, "background: #E3F2FD;");
    }

    #[test]
    fn test_marker_classes_present_even_when_not_enforced() {
        let prefs = FilterPrefs {
            topics: ["t1".to_string()].into_iter().collect(),
            filter_topic: false,
            ..Default::default()
        };
        let items = vec![Item::with_topics(&["t2"])];
        let rows = annotate_rows(&items, &prefs, |_| true);
        assert!(!rows[0].filtered);
        assert!(rows[0].classes.contains(&"topic-filtered".to_string()));
        assert!(rows[0].classes.contains(&"topic-t2".to_string()));
        assert!(rows[0].classes.contains(&"lang-en".to_string()));
    }

    #[test]
    fn test_calendar_filter() {
        let prefs = FilterPrefs {
            filter_calendar: true,
            ..Default::default()
        };
        let items = vec![Item::with_topics(&["t1"]), Item::with_topics(&["t1"])];
        let rows = annotate_rows(&items, &prefs, |i| i.topics.contains("t1"));
        assert!(!rows[0].filtered);

        let rows = annotate_rows(&items, &prefs, |_| false);
        assert!(rows[0].filtered);
        assert!(rows[0].classes.contains(&"calendar-filtered".to_string()));
    }

    #[test]
    fn test_cookie_header_parsing() {
        let prefs = FilterPrefs::from_cookie_header(
            "subjects=math,physics; filter_subject=1; topics=; filter_topic=0; filter_calendar=2",
        );
        assert_eq!(prefs.subjects.len(), 2);
        assert!(prefs.filter_subject);
        assert!(prefs.topics.is_empty());
        assert!(!prefs.filter_topic);
        assert!(prefs.filter_calendar);
    }

    #[test]
    fn test_empty_header_defaults() {
        let prefs = FilterPrefs::from_cookie_header("");
        assert!(!prefs.filter_subject && !prefs.filter_topic);
        assert!(prefs.subjects.is_empty());
    }
}
