//! Filter predicate functions, one per search form field.
//!
//! Each predicate is a pure function from raw criteria to an optional
//! partial clause; the assemblers fold the results into the final query.
//! A predicate whose criterion is absent or empty returns nothing.

use crate::error::Result;
use crate::search::SearchCriteria;
use crate::store::{FieldMatch, Matcher, Query, Store, Value};

/// Subject: exact containment in the `subjects` set.
pub fn subject(criteria: &SearchCriteria) -> Option<FieldMatch> {
    criteria
        .subject()
        .map(|code| FieldMatch::new("subjects", Matcher::Contains(code.to_string())))
}

/// Topic: containment of the qualified code or its legacy unprefixed form.
///
/// A code without a `_` separator predates the subject namespace and is
/// assumed to be a math topic. The fallback strips the first 5 characters,
/// the length of the former `math_` prefix; preserve that exact cutoff.
pub fn topic(criteria: &SearchCriteria) -> Option<FieldMatch> {
    let raw = criteria.topic()?;
    let qualified = if raw.contains('_') {
        raw.to_string()
    } else {
        format!("math_{raw}")
    };
    let legacy: String = qualified.chars().skip(5).collect();
    Some(FieldMatch::new(
        "topics",
        Matcher::Or(vec![Matcher::Contains(qualified), Matcher::Contains(legacy)]),
    ))
}

/// Institution, series side.
///
/// The sentinel `"None"` selects series with no institution at all; any
/// other value requires containment of the institution shortname.
pub fn institution_series(criteria: &SearchCriteria) -> Option<FieldMatch> {
    match criteria.institution()? {
        "None" => Some(FieldMatch::new(
            "institutions",
            Matcher::Eq(Value::List(Vec::new())),
        )),
        inst => Some(FieldMatch::new(
            "institutions",
            Matcher::Contains(inst.to_string()),
        )),
    }
}

/// Institution, talk side.
///
/// Talks do not store institutions, so the series-side predicate resolves
/// the matching shortnames first and talks are constrained to that set.
/// Join emulation; the store has none.
pub async fn institution_talks(
    criteria: &SearchCriteria,
    store: &dyn Store,
) -> Result<Option<FieldMatch>> {
    if criteria.institution().is_none() {
        return Ok(None);
    }
    let mut sub_query = Query::new();
    if let Some(clause) = institution_series(criteria) {
        sub_query.require(clause.field, clause.matcher);
    }
    let shortnames = store.seminar_shortnames(&sub_query).await?;
    Ok(Some(FieldMatch::new(
        "seminar_id",
        Matcher::In(shortnames),
    )))
}

/// Venue: online flag or a non-empty room.
///
/// Dormant: implemented for the form's venue select but not invoked by the
/// assemblers.
pub fn venue(criteria: &SearchCriteria) -> Option<FieldMatch> {
    match criteria.venue()? {
        "online" => Some(FieldMatch::new("online", Matcher::Eq(Value::Bool(true)))),
        "in-person" => Some(FieldMatch::new("room", Matcher::Ne(Value::str("")))),
        _ => None,
    }
}

/// Keyword/substring: one case-insensitive contains pattern per
/// (token x target field), all destined for the assembler's OR-group.
///
/// The input is comma-separated; tokens are trimmed and empties dropped.
pub fn substring(raw: Option<&str>, fields: &[&str]) -> Vec<FieldMatch> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let tokens: Vec<&str> = raw.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    let mut members = Vec::with_capacity(tokens.len() * fields.len());
    for token in tokens {
        for field in fields {
            members.push(FieldMatch::new(*field, Matcher::ILike(token.to_string())));
        }
    }
    members
}

/// Access level: `open` is an exact match, `users` admits either tier.
///
/// An absent value means no filter, not "deny all".
pub fn access(criteria: &SearchCriteria) -> Option<FieldMatch> {
    match criteria.access()? {
        "open" => Some(FieldMatch::new("access", Matcher::Eq(Value::str("open")))),
        "users" => Some(FieldMatch::new(
            "access",
            Matcher::In(vec!["open".to_string(), "users".to_string()]),
        )),
        _ => None,
    }
}

/// Video presence: `yes` requires a non-empty video link.
pub fn video(criteria: &SearchCriteria) -> Option<FieldMatch> {
    match criteria.video()? {
        "yes" => Some(FieldMatch::new("video_link", Matcher::Ne(Value::str("")))),
        _ => None,
    }
}

/// Language: plain equality on the language code.
pub fn language(criteria: &SearchCriteria) -> Option<FieldMatch> {
    criteria
        .language()
        .map(|code| FieldMatch::new("language", Matcher::Eq(Value::str(code))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(f: impl FnOnce(&mut SearchCriteria)) -> SearchCriteria {
        let mut c = SearchCriteria::default();
        f(&mut c);
        c
    }

    #[test]
    fn test_absent_fields_are_noops() {
        let c = SearchCriteria::default();
        assert!(subject(&c).is_none());
        assert!(topic(&c).is_none());
        assert!(institution_series(&c).is_none());
        assert!(venue(&c).is_none());
        assert!(access(&c).is_none());
        assert!(video(&c).is_none());
        assert!(language(&c).is_none());
        assert!(substring(None, &["title"]).is_empty());
    }

    #[test]
    fn test_empty_string_fields_are_noops() {
        let c = criteria(|c| {
            c.subject = Some(String::new());
            c.topic = Some(String::new());
        });
        assert!(subject(&c).is_none());
        assert!(topic(&c).is_none());
    }

    #[test]
    fn test_topic_without_prefix_assumes_math() {
        let c = criteria(|c| c.topic = Some("algebra".to_string()));
        let clause = topic(&c).unwrap();
        assert_eq!(clause.field, "topics");
        assert_eq!(
            clause.matcher,
            Matcher::Or(vec![
                Matcher::Contains("math_algebra".to_string()),
                Matcher::Contains("algebra".to_string()),
            ])
        );
    }

    #[test]
    fn test_topic_with_prefix_keeps_five_char_strip() {
        let c = criteria(|c| c.topic = Some("physics_quantum".to_string()));
        let clause = topic(&c).unwrap();
        assert_eq!(
            clause.matcher,
            Matcher::Or(vec![
                Matcher::Contains("physics_quantum".to_string()),
                Matcher::Contains("s_quantum".to_string()),
            ])
        );
    }

    #[test]
    fn test_institution_none_sentinel() {
        let c = criteria(|c| c.institution = Some("None".to_string()));
        let clause = institution_series(&c).unwrap();
        assert_eq!(clause.matcher, Matcher::Eq(Value::List(Vec::new())));
    }

    #[test]
    fn test_institution_shortname() {
        let c = criteria(|c| c.institution = Some("uexample".to_string()));
        let clause = institution_series(&c).unwrap();
        assert_eq!(clause.matcher, Matcher::Contains("uexample".to_string()));
    }

    #[test]
    fn test_substring_token_by_field_grid() {
        let members = substring(Some("  riemann , zeta "), &["title", "abstract"]);
        assert_eq!(members.len(), 4);
        let expect = [
            ("title", "riemann"),
            ("abstract", "riemann"),
            ("title", "zeta"),
            ("abstract", "zeta"),
        ];
        for (member, (field, token)) in members.iter().zip(expect) {
            assert_eq!(member.field, field);
            assert_eq!(member.matcher, Matcher::ILike(token.to_string()));
        }
    }

    #[test]
    fn test_access_tiers() {
        let c = criteria(|c| c.access = Some("open".to_string()));
        assert_eq!(
            access(&c).unwrap().matcher,
            Matcher::Eq(Value::str("open"))
        );
        let c = criteria(|c| c.access = Some("users".to_string()));
        assert_eq!(
            access(&c).unwrap().matcher,
            Matcher::In(vec!["open".to_string(), "users".to_string()])
        );
    }

    #[test]
    fn test_venue_variants() {
        let c = criteria(|c| c.venue = Some("online".to_string()));
        assert_eq!(venue(&c).unwrap().matcher, Matcher::Eq(Value::Bool(true)));
        let c = criteria(|c| c.venue = Some("in-person".to_string()));
        assert_eq!(venue(&c).unwrap().matcher, Matcher::Ne(Value::str("")));
        let c = criteria(|c| c.venue = Some("carrier-pigeon".to_string()));
        assert!(venue(&c).is_none());
    }

    #[test]
    fn test_video_yes_only() {
        let c = criteria(|c| c.video = Some("yes".to_string()));
        assert!(video(&c).is_some());
        let c = criteria(|c| c.video = Some("no".to_string()));
        assert!(video(&c).is_none());
    }
}
