//! Controlled vocabulary of subjects, topics, and languages.
//!
//! Subjects namespace topics: the stored topic code is
//! `{subject}_{abbreviation}` (e.g. `math_algebra`). Language codes map to
//! display names used by the faceted counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A topic in the controlled vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Short code within the subject (e.g. "algebra").
    pub abbreviation: String,
    /// Subject namespace (e.g. "math").
    pub subject: String,
    /// Display name.
    pub name: String,
}

impl Topic {
    /// Fully qualified topic code as stored on talks and series.
    pub fn code(&self) -> String {
        format!("{}_{}", self.subject, self.abbreviation)
    }
}

/// The controlled vocabulary shared by the search form and the browse pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Subject code -> display name.
    subjects: BTreeMap<String, String>,
    /// All known topics.
    topics: Vec<Topic>,
    /// Language code -> display name.
    languages: BTreeMap<String, String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Vocabulary {
    /// The built-in vocabulary.
    pub fn builtin() -> Self {
        let subjects = [
            ("math", "Mathematics"),
            ("physics", "Physics"),
            ("bio", "Biology"),
            ("cs", "Computer science"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let topics = [
            ("algebra", "math", "Algebra"),
            ("analysis", "math", "Analysis"),
            ("combinatorics", "math", "Combinatorics"),
            ("geometry", "math", "Geometry"),
            ("logic", "math", "Logic"),
            ("number-theory", "math", "Number theory"),
            ("probability", "math", "Probability"),
            ("topology", "math", "Topology"),
            ("astro", "physics", "Astrophysics"),
            ("cond-mat", "physics", "Condensed matter"),
            ("hep-th", "physics", "High energy theory"),
            ("quantum", "physics", "Quantum physics"),
            ("evolution", "bio", "Evolution"),
            ("genomics", "bio", "Genomics"),
            ("neuro", "bio", "Neuroscience"),
            ("algorithms", "cs", "Algorithms"),
            ("crypto", "cs", "Cryptography"),
            ("ml", "cs", "Machine learning"),
        ]
        .into_iter()
        .map(|(ab, subject, name)| Topic {
            abbreviation: ab.to_string(),
            subject: subject.to_string(),
            name: name.to_string(),
        })
        .collect();

        let languages = [
            ("en", "English"),
            ("de", "German"),
            ("es", "Spanish"),
            ("fr", "French"),
            ("it", "Italian"),
            ("ja", "Japanese"),
            ("pt", "Portuguese"),
            ("ru", "Russian"),
            ("zh", "Chinese"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            subjects,
            topics,
            languages,
        }
    }

    /// Whether the subject code is known.
    pub fn has_subject(&self, code: &str) -> bool {
        self.subjects.contains_key(code)
    }

    /// Display name for a subject code.
    pub fn subject_name(&self, code: &str) -> Option<&str> {
        self.subjects.get(code).map(String::as_str)
    }

    /// `(code, display name)` pairs for all subjects, sorted by code.
    pub fn subject_pairs(&self) -> Vec<(String, String)> {
        self.subjects
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// All topics.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Look up a topic by subject and abbreviation.
    pub fn topic(&self, subject: &str, abbreviation: &str) -> Option<&Topic> {
        self.topics
            .iter()
            .find(|t| t.subject == subject && t.abbreviation == abbreviation)
    }

    /// Display name for a language code.
    ///
    /// Unknown codes fall back to the code itself so the counters never
    /// drop a language that appears in the data.
    pub fn language_name(&self, code: &str) -> String {
        self.languages
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    /// Language code -> display name map.
    pub fn languages(&self) -> &BTreeMap<String, String> {
        &self.languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_code() {
        let vocab = Vocabulary::builtin();
        let topic = vocab.topic("math", "algebra").unwrap();
        assert_eq!(topic.code(), "math_algebra");
    }

    #[test]
    fn test_subject_lookup() {
        let vocab = Vocabulary::builtin();
        assert!(vocab.has_subject("math"));
        assert!(!vocab.has_subject("alchemy"));
        assert_eq!(vocab.subject_name("physics"), Some("Physics"));
    }

    #[test]
    fn test_language_fallback() {
        let vocab = Vocabulary::builtin();
        assert_eq!(vocab.language_name("fr"), "French");
        assert_eq!(vocab.language_name("xx"), "xx");
    }
}
