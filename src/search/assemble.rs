//! Query assemblers for talks and seminar series.
//!
//! The assemblers run the predicates in a fixed order, own the single
//! top-level OR-group that all substring predicates feed, append the
//! mandatory visibility clauses, and apply the single-subject deployment
//! override last so it wins over any explicit subject criterion.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::DeploymentMode;
use crate::error::Result;
use crate::model::VISIBILITY_PUBLIC;
use crate::search::{daterange, predicates, DateGranularity, SearchCriteria};
use crate::store::{Bound, FieldMatch, Matcher, Query, Store, Value};
use crate::viewer::Viewer;

/// Keyword target fields for talk searches.
const TALK_KEYWORD_FIELDS: &[&str] = &[
    "title",
    "abstract",
    "speaker",
    "speaker_affiliation",
    "seminar_id",
    "comments",
    "speaker_homepage",
    "paper_link",
];

/// Keyword target fields for series searches.
const SERIES_KEYWORD_FIELDS: &[&str] = &[
    "name",
    "description",
    "homepage",
    "shortname",
    "comments",
];

/// An assembled talk query plus non-fatal warnings for the user.
#[derive(Debug, Clone)]
pub struct AssembledTalkQuery {
    pub query: Query,
    pub warnings: Vec<String>,
}

/// An assembled series query, its secondary organizer query, and warnings.
///
/// Organizer fields live on a separate collection the store cannot join;
/// the organizer query is resolved by the fetch stage into a per-series
/// organizer lookup used during rendering, not merged into the primary
/// query.
#[derive(Debug, Clone)]
pub struct AssembledSeriesQuery {
    pub query: Query,
    pub organizer_query: Query,
    pub warnings: Vec<String>,
}

/// Build the store query for a talk search.
///
/// Predicate order is fixed: subject, topic, institution, keywords, access,
/// speaker, affiliation, title, video, language, date range, then the
/// mandatory display/hidden clauses and the deployment override. The
/// institution predicate issues a store sub-query, hence async.
pub async fn build_talk_query(
    criteria: &SearchCriteria,
    viewer: &Viewer,
    mode: &DeploymentMode,
    store: &dyn Store,
) -> Result<AssembledTalkQuery> {
    let mut query = Query::new();
    let mut or_group: Vec<FieldMatch> = Vec::new();

    if let Some(clause) = predicates::subject(criteria) {
        query.require(clause.field, clause.matcher);
    }
    if let Some(clause) = predicates::topic(criteria) {
        query.require(clause.field, clause.matcher);
    }
    if let Some(clause) = predicates::institution_talks(criteria, store).await? {
        query.require(clause.field, clause.matcher);
    }
    or_group.extend(predicates::substring(criteria.keywords(), TALK_KEYWORD_FIELDS));
    if let Some(clause) = predicates::access(criteria) {
        query.require(clause.field, clause.matcher);
    }
    or_group.extend(predicates::substring(criteria.speaker(), &["speaker"]));
    or_group.extend(predicates::substring(
        criteria.affiliation(),
        &["speaker_affiliation"],
    ));
    or_group.extend(predicates::substring(criteria.title(), &["title"]));
    if let Some(clause) = predicates::video(criteria) {
        query.require(clause.field, clause.matcher);
    }
    if let Some(clause) = predicates::language(criteria) {
        query.require(clause.field, clause.matcher);
    }

    let mut warnings = Vec::new();
    if let Some(raw) = criteria.daterange() {
        let parsed = daterange::parse_range(raw, viewer.timezone, DateGranularity::Timestamps);
        warnings.extend(parsed.warnings);
        if let Some(clause) = parsed.clause {
            query.require(clause.field, clause.matcher);
        }
    }

    // Necessary but not sufficient to display the talk; the fetch stage
    // still has to check that the owning series is visible.
    append_talk_visibility(&mut query);

    query.extend_any_of(or_group);
    apply_deployment_override(&mut query, mode);

    Ok(AssembledTalkQuery { query, warnings })
}

/// Build the store query for a seminar/conference search.
pub fn build_series_query(
    criteria: &SearchCriteria,
    viewer: &Viewer,
    mode: &DeploymentMode,
    conference: bool,
) -> AssembledSeriesQuery {
    let mut query = Query::new();
    let mut or_group: Vec<FieldMatch> = Vec::new();
    let mut organizer_query = Query::new();

    query.require("is_conference", Matcher::Eq(Value::Bool(conference)));

    if let Some(clause) = predicates::subject(criteria) {
        query.require(clause.field, clause.matcher);
    }
    if let Some(clause) = predicates::topic(criteria) {
        query.require(clause.field, clause.matcher);
    }
    if let Some(clause) = predicates::institution_series(criteria) {
        query.require(clause.field, clause.matcher);
    }
    or_group.extend(predicates::substring(
        criteria.keywords(),
        SERIES_KEYWORD_FIELDS,
    ));

    // Organizer email addresses are only searchable by subject admins.
    let organizer_fields: &[&str] = if viewer.is_subject_admin(None) {
        &["name", "full_name", "homepage", "email"]
    } else {
        &["name", "full_name", "homepage"]
    };
    organizer_query.extend_any_of(predicates::substring(
        criteria.organizer(),
        organizer_fields,
    ));

    if let Some(clause) = predicates::access(criteria) {
        query.require(clause.field, clause.matcher);
    }
    if let Some(clause) = predicates::language(criteria) {
        query.require(clause.field, clause.matcher);
    }

    let mut warnings = Vec::new();
    if conference {
        if let Some(raw) = criteria.daterange() {
            let parsed = daterange::parse_range(raw, viewer.timezone, DateGranularity::Dates);
            warnings.extend(parsed.warnings);
            if let Some(clause) = parsed.clause {
                query.require(clause.field, clause.matcher);
            }
        }
    }

    or_group.extend(predicates::substring(criteria.name(), &["name"]));

    query.require("display", Matcher::Eq(Value::Bool(true)));
    query.require("visibility", Matcher::Eq(Value::Int(VISIBILITY_PUBLIC)));

    query.extend_any_of(or_group);
    apply_deployment_override(&mut query, mode);

    AssembledSeriesQuery {
        query,
        organizer_query,
        warnings,
    }
}

/// Mandatory talk visibility clauses, always appended.
pub fn append_talk_visibility(query: &mut Query) {
    query.require("display", Matcher::Eq(Value::Bool(true)));
    // Legacy rows may lack the hidden flag entirely.
    query.require(
        "hidden",
        Matcher::Or(vec![
            Matcher::Eq(Value::Bool(false)),
            Matcher::Exists(false),
        ]),
    );
}

/// Apply the single-subject deployment restriction, overriding any explicit
/// subject criterion.
pub fn apply_deployment_override(query: &mut Query, mode: &DeploymentMode) {
    if let DeploymentMode::SingleSubject(subject) = mode {
        query.force("subjects", Matcher::Eq(Value::List(vec![subject.clone()])));
    }
}

/// Browse cutoff on talk end time: upcoming keeps talks still running.
pub fn talk_time_window(past: bool, now: DateTime<Utc>) -> FieldMatch {
    if past {
        FieldMatch::new("end_time", Matcher::Lt(Bound::Time(now)))
    } else {
        FieldMatch::new(
            "end_time",
            Matcher::Range {
                gte: Some(Bound::Time(now)),
                lte: None,
            },
        )
    }
}

/// Browse cutoff on conference end date.
///
/// One day permissive so ongoing conferences in other timezones are not
/// dropped from the upcoming listing.
pub fn conference_date_window(past: bool, today: NaiveDate) -> FieldMatch {
    let recent = today - Duration::days(1);
    if past {
        FieldMatch::new("end_date", Matcher::Lt(Bound::Date(recent)))
    } else {
        FieldMatch::new(
            "end_date",
            Matcher::Range {
                gte: Some(Bound::Date(recent)),
                lte: None,
            },
        )
    }
}
