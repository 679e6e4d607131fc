//! Aggregate facet counters over a result set.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::Faceted;
use crate::vocab::Vocabulary;

/// Per-request frequency tables for the faceted sidebar.
///
/// An item increments every topic and subject it carries, and exactly one
/// language. The `languages` list only includes codes present in the
/// results, ordered by descending count then display name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CounterSet {
    pub topic_counts: HashMap<String, usize>,
    pub subject_counts: HashMap<String, usize>,
    pub language_counts: HashMap<String, usize>,
    pub languages: Vec<(String, String)>,
}

/// Compute facet counters for a fetched, sorted result list.
pub fn count_facets<T: Faceted>(items: &[T], vocab: &Vocabulary) -> CounterSet {
    let mut counters = CounterSet::default();
    for item in items {
        for topic in item.topics() {
            *counters.topic_counts.entry(topic.clone()).or_default() += 1;
        }
        for subject in item.subjects() {
            *counters.subject_counts.entry(subject.clone()).or_default() += 1;
        }
        *counters
            .language_counts
            .entry(item.language().to_string())
            .or_default() += 1;
    }
    counters.languages = counters
        .language_counts
        .keys()
        .map(|code| (code.clone(), vocab.language_name(code)))
        .collect();
    counters.languages.sort_by(|a, b| {
        let ca = counters.language_counts[&a.0];
        let cb = counters.language_counts[&b.0];
        cb.cmp(&ca).then_with(|| a.1.cmp(&b.1))
    });
    counters
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
        fn new(topics: &[&str], subjects: &[&str], language: &str) -> Self {
            Self {
                topics: topics.iter().map(|s| s.to_string()).collect(),
                subjects: subjects.iter().map(|s| s.to_string()).collect(),
                language: language.to_string(),
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

    #[test]
    fn test_items_count_every_topic_they_carry() {
        let items = vec![
            Item::new(&["t1"], &["math"], "en"),
            Item::new(&["t1", "t2"], &["math"], "fr"),
            Item::new(&["t2"], &["physics"], "en"),
        ];
        let counters = count_facets(&items, &Vocabulary::builtin());
        assert_eq!(counters.topic_counts["t1"], 2);
        assert_eq!(counters.topic_counts["t2"], 2);
        assert_eq!(counters.subject_counts["math"], 2);
        assert_eq!(counters.subject_counts["physics"], 1);
        assert_eq!(counters.language_counts["en"], 2);
        assert_eq!(counters.language_counts["fr"], 1);
    }

    #[test]
    fn test_languages_sorted_by_count_then_name() {
        let items = vec![
            Item::new(&[], &[], "fr"),
            Item::new(&[], &[], "de"),
            Item::new(&[], &[], "en"),
            Item::new(&[], &[], "en"),
        ];
        let counters = count_facets(&items, &Vocabulary::builtin());
        let codes: Vec<&str> = counters.languages.iter().map(|(c, _)| c.as_str()).collect();
        // English first on count; French and German tie, broken by name.
        assert_eq!(codes, vec!["en", "fr", "de"]);
        assert_eq!(counters.languages[0].1, "English");
    }

    #[test]
    fn test_empty_results_empty_counters() {
        let items: Vec<Item> = Vec::new();
        let counters = count_facets(&items, &Vocabulary::builtin());
        assert!(counters.topic_counts.is_empty());
        assert!(counters.languages.is_empty());
    }
}
