//! Query value types and matcher evaluation.
//!
//! A [`Query`] is an ordered field -> [`Matcher`] map plus a single
//! top-level OR-group. Matchers cover the predicates the directory's store
//! supports: equality, containment, set membership, ranges, disjunction,
//! case-insensitive substring, and existence checks. Evaluation happens
//! against typed records through the [`Record`] field projection.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

// ============================================================================
// Field Projection
// ============================================================================

/// A borrowed view of one record field, as seen by matcher evaluation.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Bool(bool),
    Int(i64),
    Time(DateTime<Utc>),
    Date(NaiveDate),
    StrSet(&'a BTreeSet<String>),
    StrList(&'a [String]),
    /// Field absent from the record (e.g. legacy rows without a flag).
    Missing,
}

/// Typed records the store can evaluate queries against.
pub trait Record {
    /// Project a named field; unknown names yield [`FieldValue::Missing`].
    fn field(&self, name: &str) -> FieldValue<'_>;
}

// ============================================================================
// Matchers
// ============================================================================

/// An owned scalar or list operand for equality matchers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }
}

/// A range bound over timestamps or calendar dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Time(DateTime<Utc>),
    Date(NaiveDate),
}

/// A single-field matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Exact equality; a `List` operand compares against the whole set.
    Eq(Value),
    /// Inequality, used for non-empty checks.
    Ne(Value),
    /// Set/list containment of a string element.
    Contains(String),
    /// Scalar membership in a set of strings.
    In(Vec<String>),
    /// Case-insensitive substring match.
    ILike(String),
    /// Inclusive range; either side optional.
    Range {
        gte: Option<Bound>,
        lte: Option<Bound>,
    },
    /// Strict upper bound, for past-listing cutoffs.
    Lt(Bound),
    /// Disjunction of matchers over the same field.
    Or(Vec<Matcher>),
    /// Field presence or absence.
    Exists(bool),
}

impl Matcher {
    /// Evaluate this matcher against a projected field value.
    pub fn matches(&self, value: FieldValue<'_>) -> bool {
        match self {
            Matcher::Eq(operand) => eval_eq(operand, value),
            Matcher::Ne(operand) => !matches!(value, FieldValue::Missing) && !eval_eq(operand, value),
            Matcher::Contains(element) => match value {
                FieldValue::StrSet(set) => set.contains(element),
                FieldValue::StrList(list) => list.iter().any(|s| s == element),
                _ => false,
            },
            Matcher::In(options) => match value {
                FieldValue::Str(s) => options.iter().any(|o| o == s),
                _ => false,
            },
            Matcher::ILike(needle) => match value {
                FieldValue::Str(s) => s.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Matcher::Range { gte, lte } => {
                let lower = gte.map_or(true, |b| cmp_bound(value, b).map_or(false, |o| o >= 0));
                let upper = lte.map_or(true, |b| cmp_bound(value, b).map_or(false, |o| o <= 0));
                lower && upper
            }
            Matcher::Lt(bound) => cmp_bound(value, *bound).map_or(false, |o| o < 0),
            Matcher::Or(alternatives) => alternatives.iter().any(|m| m.matches(value)),
            Matcher::Exists(expected) => {
                let present = !matches!(value, FieldValue::Missing);
                present == *expected
            }
        }
    }
}

fn eval_eq(operand: &Value, value: FieldValue<'_>) -> bool {
    match (operand, value) {
        (Value::Str(a), FieldValue::Str(b)) => a == b,
        (Value::Bool(a), FieldValue::Bool(b)) => *a == b,
        (Value::Int(a), FieldValue::Int(b)) => *a == b,
        (Value::List(a), FieldValue::StrSet(b)) => {
            a.len() == b.len() && a.iter().all(|s| b.contains(s))
        }
        (Value::List(a), FieldValue::StrList(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
        }
        _ => false,
    }
}

/// Compare a field value against a bound: negative, zero, positive, or
/// `None` when the types are incomparable.
fn cmp_bound(value: FieldValue<'_>, bound: Bound) -> Option<i8> {
    let ord = match (value, bound) {
        (FieldValue::Time(t), Bound::Time(b)) => t.cmp(&b),
        (FieldValue::Date(d), Bound::Date(b)) => d.cmp(&b),
        _ => return None,
    };
    Some(match ord {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    })
}

// ============================================================================
// Query
// ============================================================================

/// A matcher attached to a named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: String,
    pub matcher: Matcher,
}

impl FieldMatch {
    pub fn new(field: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            field: field.into(),
            matcher,
        }
    }
}

/// An assembled store query.
///
/// Field clauses are conjunctive. Once a field has a clause it is never
/// overwritten: a second `require` on the same field composes the two via
/// disjunction. The one sanctioned exception is [`Query::force`], used by
/// the single-subject deployment override, which replaces outright. The
/// `any_of` group is owned by the assembler and kept flat: members from
/// every substring predicate land in the same group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    fields: Vec<FieldMatch>,
    any_of: Vec<FieldMatch>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause for a field, composing with any existing clause via OR.
    pub fn require(&mut self, field: impl Into<String>, matcher: Matcher) {
        let field = field.into();
        if let Some(existing) = self.fields.iter_mut().find(|fm| fm.field == field) {
            let prior = existing.matcher.clone();
            existing.matcher = match prior {
                Matcher::Or(mut alternatives) => {
                    alternatives.push(matcher);
                    Matcher::Or(alternatives)
                }
                other => Matcher::Or(vec![other, matcher]),
            };
        } else {
            self.fields.push(FieldMatch::new(field, matcher));
        }
    }

    /// Replace a field's clause unconditionally. Deployment override only.
    pub fn force(&mut self, field: impl Into<String>, matcher: Matcher) {
        let field = field.into();
        self.fields.retain(|fm| fm.field != field);
        self.fields.push(FieldMatch::new(field, matcher));
    }

    /// Extend the top-level OR-group, flattening rather than nesting.
    pub fn extend_any_of(&mut self, members: impl IntoIterator<Item = FieldMatch>) {
        self.any_of.extend(members);
    }

    /// The clause attached to a field, if any.
    pub fn clause(&self, field: &str) -> Option<&Matcher> {
        self.fields
            .iter()
            .find(|fm| fm.field == field)
            .map(|fm| &fm.matcher)
    }

    /// Members of the top-level OR-group.
    pub fn any_of(&self) -> &[FieldMatch] {
        &self.any_of
    }

    /// Number of field clauses.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.any_of.is_empty()
    }

    /// Whether a record satisfies every field clause and, when the OR-group
    /// is non-empty, at least one of its members.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        if !self
            .fields
            .iter()
            .all(|fm| fm.matcher.matches(record.field(&fm.field)))
        {
            return false;
        }
        self.any_of.is_empty()
            || self
                .any_of
                .iter()
                .any(|fm| fm.matcher.matches(record.field(&fm.field)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Row {
        topics: BTreeSet<String>,
        speaker: String,
        hidden: Option<bool>,
        start: DateTime<Utc>,
    }

    impl Record for Row {
        fn field(&self, name: &str) -> FieldValue<'_> {
            match name {
                "topics" => FieldValue::StrSet(&self.topics),
                "speaker" => FieldValue::Str(&self.speaker),
                "hidden" => match self.hidden {
                    Some(b) => FieldValue::Bool(b),
                    None => FieldValue::Missing,
                },
                "start_time" => FieldValue::Time(self.start),
                _ => FieldValue::Missing,
            }
        }
    }

    fn row() -> Row {
        Row {
            topics: ["math_algebra".to_string()].into_iter().collect(),
            speaker: "Leonhard Euler".to_string(),
            hidden: None,
            start: Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_contains_on_set() {
        let m = Matcher::Contains("math_algebra".to_string());
        assert!(m.matches(row().field("topics")));
        let m = Matcher::Contains("math_topology".to_string());
        assert!(!m.matches(row().field("topics")));
    }

    #[test]
    fn test_ilike_case_insensitive() {
        let m = Matcher::ILike("euler".to_string());
        assert!(m.matches(row().field("speaker")));
        let m = Matcher::ILike("gauss".to_string());
        assert!(!m.matches(row().field("speaker")));
    }

    #[test]
    fn test_hidden_false_or_missing() {
        let m = Matcher::Or(vec![
            Matcher::Eq(Value::Bool(false)),
            Matcher::Exists(false),
        ]);
        assert!(m.matches(row().field("hidden")));
        let mut hidden = row();
        hidden.hidden = Some(true);
        assert!(!m.matches(hidden.field("hidden")));
        let mut shown = row();
        shown.hidden = Some(false);
        assert!(m.matches(shown.field("hidden")));
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let m = Matcher::Range {
            gte: Some(Bound::Time(
                Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap(),
            )),
            lte: None,
        };
        assert!(m.matches(row().field("start_time")));
        let m = Matcher::Range {
            gte: Some(Bound::Time(
                Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 1).unwrap(),
            )),
            lte: None,
        };
        assert!(!m.matches(row().field("start_time")));
    }

    #[test]
    fn test_require_composes_never_overwrites() {
        let mut q = Query::new();
        q.require("speaker", Matcher::ILike("euler".to_string()));
        q.require("speaker", Matcher::ILike("gauss".to_string()));
        match q.clause("speaker") {
            Some(Matcher::Or(alts)) => assert_eq!(alts.len(), 2),
            other => panic!("expected composed disjunction, got {other:?}"),
        }
        assert!(q.matches(&row()));
    }

    #[test]
    fn test_force_replaces() {
        let mut q = Query::new();
        q.require("speaker", Matcher::ILike("gauss".to_string()));
        q.force("speaker", Matcher::ILike("euler".to_string()));
        assert_eq!(
            q.clause("speaker"),
            Some(&Matcher::ILike("euler".to_string()))
        );
    }

    #[test]
    fn test_any_of_group_is_disjunctive() {
        let mut q = Query::new();
        q.extend_any_of([
            FieldMatch::new("speaker", Matcher::ILike("gauss".to_string())),
            FieldMatch::new("speaker", Matcher::ILike("euler".to_string())),
        ]);
        assert!(q.matches(&row()));

        let mut q = Query::new();
        q.extend_any_of([FieldMatch::new(
            "speaker",
            Matcher::ILike("gauss".to_string()),
        )]);
        assert!(!q.matches(&row()));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let q = Query::new();
        assert!(q.matches(&row()));
    }
}
