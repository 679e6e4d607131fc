//! Raw search form fields and pagination.
//!
//! Field names are the wire contract with the search form; values arrive as
//! loosely-typed strings and every field is optional and independent.

use serde::Deserialize;

/// Deserialized query-string fields from the search form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub daterange: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub talk_count: Option<String>,
    #[serde(default)]
    pub talk_start: Option<String>,
    #[serde(default)]
    pub seminar_count: Option<String>,
    #[serde(default)]
    pub seminar_start: Option<String>,
}

impl SearchCriteria {
    pub fn subject(&self) -> Option<&str> {
        non_empty(&self.subject)
    }

    pub fn topic(&self) -> Option<&str> {
        non_empty(&self.topic)
    }

    pub fn institution(&self) -> Option<&str> {
        non_empty(&self.institution)
    }

    pub fn venue(&self) -> Option<&str> {
        non_empty(&self.venue)
    }

    pub fn keywords(&self) -> Option<&str> {
        non_empty(&self.keywords)
    }

    pub fn access(&self) -> Option<&str> {
        non_empty(&self.access)
    }

    pub fn speaker(&self) -> Option<&str> {
        non_empty(&self.speaker)
    }

    pub fn affiliation(&self) -> Option<&str> {
        non_empty(&self.affiliation)
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn organizer(&self) -> Option<&str> {
        non_empty(&self.organizer)
    }

    pub fn daterange(&self) -> Option<&str> {
        non_empty(&self.daterange)
    }

    pub fn video(&self) -> Option<&str> {
        non_empty(&self.video)
    }

    pub fn language(&self) -> Option<&str> {
        non_empty(&self.language)
    }

    /// Pagination window for talk searches.
    pub fn talk_window(&self) -> PageWindow {
        PageWindow::from_raw(self.talk_count.as_deref(), self.talk_start.as_deref())
    }

    /// Pagination window for seminar searches.
    pub fn seminar_window(&self) -> PageWindow {
        PageWindow::from_raw(self.seminar_count.as_deref(), self.seminar_start.as_deref())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub count: usize,
    pub start: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            start: 0,
        }
    }
}

const DEFAULT_COUNT: usize = 50;

impl PageWindow {
    /// Parse raw `*_count`/`*_start` fields.
    ///
    /// Malformed integers silently fall back to the defaults. A negative
    /// start is shifted up by whole pages until it is non-negative.
    pub fn from_raw(count: Option<&str>, start: Option<&str>) -> Self {
        let parsed = (|| {
            let count: i64 = count?.trim().parse().ok()?;
            let start: i64 = start?.trim().parse().ok()?;
            if count <= 0 {
                return None;
            }
            let start = if start < 0 {
                start + (1 - (start + 1).div_euclid(count)) * count
            } else {
                start
            };
            Some(Self {
                count: count as usize,
                start: start.max(0) as usize,
            })
        })();
        parsed.unwrap_or_default()
    }
}
