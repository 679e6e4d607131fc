//! Request handlers producing JSON page models.
//!
//! Handlers stop at the page-model seam: the external template layer
//! renders these structures, so every endpoint answers JSON except the
//! calendar and embed endpoints, which carry their own content types.

use std::collections::HashMap;

use axum::extract::{Path, Query as UrlQuery, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::render_ics;
use crate::error::{ColloquiaError, SearchError, StoreError};
use crate::model::{Institution, Organizer, SeminarSeries, Talk, VISIBILITY_PUBLIC};
use crate::search::{
    annotate_rows, build_series_query, build_talk_query, conference_date_window, count_facets,
    fetch_series, fetch_talks, parse_range, sort_talks, talk_time_window, CounterSet,
    DateGranularity, PageWindow, RowAttributes, SearchCriteria, SeriesSort, TalkSort,
};
use crate::store::{Matcher, Query, Value};

use super::{request_context, ApiError, ApiState};

// ============================================================================
// Page models
// ============================================================================

/// Page model for talk listings and talk searches.
#[derive(Debug, Serialize)]
pub struct TalkListPage {
    pub section: String,
    pub talks: Vec<Talk>,
    pub rows: Vec<RowAttributes>,
    pub counters: CounterSet,
    pub warnings: Vec<String>,
    /// Filter dimensions the page fixes and the sidebar should not offer.
    pub hide_filters: Vec<String>,
    /// Result count before pagination.
    pub total: usize,
}

/// Page model for series listings and searches.
#[derive(Debug, Serialize)]
pub struct SeriesListPage {
    pub section: String,
    pub series: Vec<SeminarSeries>,
    pub rows: Vec<RowAttributes>,
    pub counters: CounterSet,
    pub warnings: Vec<String>,
    pub hide_filters: Vec<String>,
    pub total: usize,
}

/// Page model for the series detail view.
#[derive(Debug, Serialize)]
pub struct SeminarPage {
    pub series: SeminarSeries,
    pub organizers: Vec<Organizer>,
    pub future_talks: Vec<Talk>,
    pub past_talks: Vec<Talk>,
}

/// Page model for the talk detail view.
#[derive(Debug, Serialize)]
pub struct TalkPage {
    pub talk: Talk,
    pub series: SeminarSeries,
}

#[derive(Debug, Serialize)]
pub struct InstitutionsPage {
    pub institutions: Vec<Institution>,
}

#[derive(Debug, Serialize)]
pub struct InstitutionPage {
    pub institution: Institution,
    pub seminars: Vec<SeminarSeries>,
    pub conferences: Vec<SeminarSeries>,
}

/// Options for the search form selects.
#[derive(Debug, Serialize)]
pub struct SearchFormPage {
    pub subjects: Vec<(String, String)>,
    pub topics: Vec<crate::vocab::Topic>,
    /// Languages actually present in the data, as `(code, display name)`.
    pub languages: Vec<(String, String)>,
}

// ============================================================================
// Browse
// ============================================================================

pub async fn browse_future_talks(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<TalkListPage>, ApiError> {
    let page = talk_listing(
        &state,
        &headers,
        &SearchCriteria::default(),
        false,
        "upcoming",
        Vec::new(),
    )
    .await?;
    Ok(Json(page))
}

pub async fn browse_past_talks(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<TalkListPage>, ApiError> {
    let page = talk_listing(
        &state,
        &headers,
        &SearchCriteria::default(),
        true,
        "past",
        Vec::new(),
    )
    .await?;
    Ok(Json(page))
}

pub async fn browse_subject(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(subject): Path<String>,
) -> Result<Json<TalkListPage>, ApiError> {
    if !state.vocab.has_subject(&subject) {
        return Err(SearchError::UnknownSubject(subject).into());
    }
    let criteria = SearchCriteria {
        subject: Some(subject),
        ..Default::default()
    };
    let page = talk_listing(
        &state,
        &headers,
        &criteria,
        false,
        "upcoming",
        vec!["subject".to_string()],
    )
    .await?;
    Ok(Json(page))
}

pub async fn browse_subject_topic(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path((subject, topic)): Path<(String, String)>,
) -> Result<Json<TalkListPage>, ApiError> {
    if !state.vocab.has_subject(&subject) {
        return Err(SearchError::UnknownSubject(subject).into());
    }
    // Path topics are unqualified within their subject segment.
    let topic = if topic.contains('_') {
        topic
    } else {
        format!("{subject}_{topic}")
    };
    if !state.vocab.topics().iter().any(|t| t.code() == topic) {
        return Err(SearchError::UnknownTopic(topic).into());
    }
    let criteria = SearchCriteria {
        subject: Some(subject),
        topic: Some(topic),
        ..Default::default()
    };
    let page = talk_listing(
        &state,
        &headers,
        &criteria,
        false,
        "upcoming",
        vec!["subject".to_string(), "topic".to_string()],
    )
    .await?;
    Ok(Json(page))
}

pub async fn browse_conferences(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<SeriesListPage>, ApiError> {
    let page = series_listing(
        &state,
        &headers,
        &SearchCriteria::default(),
        Listing::Conferences { past: false },
        "conferences",
    )
    .await?;
    Ok(Json(page))
}

pub async fn browse_past_conferences(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<SeriesListPage>, ApiError> {
    let page = series_listing(
        &state,
        &headers,
        &SearchCriteria::default(),
        Listing::Conferences { past: true },
        "past_conferences",
    )
    .await?;
    Ok(Json(page))
}

pub async fn browse_seminar_series(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<SeriesListPage>, ApiError> {
    let page = series_listing(
        &state,
        &headers,
        &SearchCriteria::default(),
        Listing::Seminars,
        "seminar_series",
    )
    .await?;
    Ok(Json(page))
}

// ============================================================================
// Search
// ============================================================================

pub async fn search_form(
    State(state): State<ApiState>,
) -> Result<Json<SearchFormPage>, ApiError> {
    let languages = state
        .store
        .distinct_talk_languages()
        .await?
        .into_iter()
        .map(|code| {
            let name = state.vocab.language_name(&code);
            (code, name)
        })
        .collect();
    Ok(Json(SearchFormPage {
        subjects: state.vocab.subject_pairs(),
        topics: state.vocab.topics().to_vec(),
        languages,
    }))
}

pub async fn search_talks(
    State(state): State<ApiState>,
    headers: HeaderMap,
    UrlQuery(criteria): UrlQuery<SearchCriteria>,
) -> Result<Json<TalkListPage>, ApiError> {
    let (viewer, prefs) = request_context(&headers);
    let assembled =
        build_talk_query(&criteria, &viewer, &state.mode, state.store.as_ref()).await?;
    let talks = fetch_talks(
        state.store.as_ref(),
        &assembled.query,
        TalkSort::StartThenSpeaker,
        &viewer,
    )
    .await?;
    let counters = count_facets(&talks, &state.vocab);
    let total = talks.len();
    let talks = page_slice(talks, criteria.talk_window());
    let rows = annotate_rows(&talks, &prefs, |_| false);
    Ok(Json(TalkListPage {
        section: "search".to_string(),
        talks,
        rows,
        counters,
        warnings: assembled.warnings,
        hide_filters: Vec::new(),
        total,
    }))
}

pub async fn search_seminars(
    State(state): State<ApiState>,
    headers: HeaderMap,
    UrlQuery(criteria): UrlQuery<SearchCriteria>,
) -> Result<Json<SeriesListPage>, ApiError> {
    let page = series_search(&state, &headers, criteria, false).await?;
    Ok(Json(page))
}

pub async fn search_conferences(
    State(state): State<ApiState>,
    headers: HeaderMap,
    UrlQuery(criteria): UrlQuery<SearchCriteria>,
) -> Result<Json<SeriesListPage>, ApiError> {
    let page = series_search(&state, &headers, criteria, true).await?;
    Ok(Json(page))
}

// ============================================================================
// Institutions
// ============================================================================

pub async fn list_institutions(
    State(state): State<ApiState>,
) -> Result<Json<InstitutionsPage>, ApiError> {
    let institutions = state.store.list_institutions().await?;
    Ok(Json(InstitutionsPage { institutions }))
}

pub async fn institution_detail(
    State(state): State<ApiState>,
    Path(shortname): Path<String>,
) -> Result<Json<InstitutionPage>, ApiError> {
    let institution = state
        .store
        .get_institution(&shortname)
        .await?
        .ok_or_else(|| StoreError::InstitutionNotFound(shortname.clone()))?;

    let mut base = Query::new();
    base.require("institutions", Matcher::Contains(shortname));
    base.require("display", Matcher::Eq(Value::Bool(true)));
    base.require("visibility", Matcher::Eq(Value::Int(VISIBILITY_PUBLIC)));

    let mut seminar_query = base.clone();
    seminar_query.require("is_conference", Matcher::Eq(Value::Bool(false)));
    let mut conference_query = base;
    conference_query.require("is_conference", Matcher::Eq(Value::Bool(true)));

    let now = Utc::now();
    let seminars = fetch_series(
        state.store.as_ref(),
        &seminar_query,
        SeriesSort::Schedule,
        now,
    )
    .await?;
    let conferences = fetch_series(
        state.store.as_ref(),
        &conference_query,
        SeriesSort::ConferenceUpcoming,
        now,
    )
    .await?;

    Ok(Json(InstitutionPage {
        institution,
        seminars,
        conferences,
    }))
}

// ============================================================================
// Series detail and feeds
// ============================================================================

pub async fn seminar_detail(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(shortname): Path<String>,
) -> Result<Response, ApiError> {
    let (viewer, _) = request_context(&headers);
    let Some(series) = state.store.get_seminar(&shortname).await? else {
        return Err(StoreError::SeminarNotFound(shortname).into());
    };
    if !series.visible_to(&viewer) {
        // The detail page bounces invisible series to the search page
        // rather than revealing that the shortname exists.
        return Ok(Redirect::to("/search/seminars").into_response());
    }
    let page = seminar_page(&state, series).await?;
    Ok(Json(page).into_response())
}

pub async fn seminar_raw(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(shortname): Path<String>,
) -> Result<Json<SeminarPage>, ApiError> {
    let series = visible_series(&state, &headers, &shortname).await?;
    Ok(Json(seminar_page(&state, series).await?))
}

pub async fn seminar_bare(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(shortname): Path<String>,
) -> Result<Json<SeminarPage>, ApiError> {
    let series = visible_series(&state, &headers, &shortname).await?;
    Ok(Json(seminar_page(&state, series).await?))
}

/// Query parameters for the JSON/JSONP feed.
///
/// `past` and `future` are presence flags: any value, including the empty
/// string, turns them on. `daterange` takes precedence over both.
#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    #[serde(default)]
    pub daterange: Option<String>,
    #[serde(default)]
    pub past: Option<String>,
    #[serde(default)]
    pub future: Option<String>,
    /// JSONP callback name; plain JSON when absent.
    #[serde(default)]
    pub callback: Option<String>,
}

pub async fn seminar_json_feed(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(shortname): Path<String>,
    UrlQuery(params): UrlQuery<FeedParams>,
) -> Result<Response, ApiError> {
    let (viewer, _) = request_context(&headers);
    let series = visible_series(&state, &headers, &shortname).await?;
    let mut talks = listed_talks(&state, &series.shortname).await?;
    filter_feed_talks(&mut talks, &params, &viewer, Utc::now());

    let columns: Vec<serde_json::Value> = talks.iter().map(feed_columns).collect();
    let body = serde_json::to_string(&columns).map_err(crate::error::ColloquiaError::from)?;

    match params.callback.as_deref().filter(|c| valid_callback(c)) {
        Some(callback) => Ok((
            [(header::CONTENT_TYPE, "application/javascript".to_string())],
            format!("{callback}({body});"),
        )
            .into_response()),
        None => Ok((
            [(header::CONTENT_TYPE, "application/json".to_string())],
            body,
        )
            .into_response()),
    }
}

pub async fn seminar_ics(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(shortname): Path<String>,
) -> Result<Response, ApiError> {
    let series = visible_series(&state, &headers, &shortname).await?;
    let talks = listed_talks(&state, &series.shortname).await?;
    Ok(ics_response(&series.shortname, &talks))
}

// ============================================================================
// Talk detail and feed
// ============================================================================

pub async fn talk_detail(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path((seminar_id, talkid)): Path<(String, u32)>,
) -> Result<Json<TalkPage>, ApiError> {
    let (talk, series) = visible_talk(&state, &headers, &seminar_id, talkid).await?;
    Ok(Json(TalkPage { talk, series }))
}

pub async fn talk_ics(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path((seminar_id, talkid)): Path<(String, u32)>,
) -> Result<Response, ApiError> {
    let (talk, series) = visible_talk(&state, &headers, &seminar_id, talkid).await?;
    let name = format!("{}-{}", series.shortname, talk.seminar_ctr);
    Ok(ics_response(&name, &[talk]))
}

// ============================================================================
// Listing internals
// ============================================================================

async fn talk_listing(
    state: &ApiState,
    headers: &HeaderMap,
    criteria: &SearchCriteria,
    past: bool,
    section: &str,
    hide_filters: Vec<String>,
) -> Result<TalkListPage, ApiError> {
    let (viewer, prefs) = request_context(headers);
    let assembled =
        build_talk_query(criteria, &viewer, &state.mode, state.store.as_ref()).await?;
    let mut query = assembled.query;
    let window = talk_time_window(past, Utc::now());
    query.require(window.field, window.matcher);

    let sort = if past {
        TalkSort::StartDescThenSeries
    } else {
        TalkSort::StartThenSeries
    };
    let talks = fetch_talks(state.store.as_ref(), &query, sort, &viewer).await?;
    let counters = count_facets(&talks, &state.vocab);
    let total = talks.len();
    let rows = annotate_rows(&talks, &prefs, |_| false);
    Ok(TalkListPage {
        section: section.to_string(),
        talks,
        rows,
        counters,
        warnings: assembled.warnings,
        hide_filters,
        total,
    })
}

enum Listing {
    Seminars,
    Conferences { past: bool },
}

async fn series_listing(
    state: &ApiState,
    headers: &HeaderMap,
    criteria: &SearchCriteria,
    listing: Listing,
    section: &str,
) -> Result<SeriesListPage, ApiError> {
    let (viewer, prefs) = request_context(headers);
    let conference = matches!(listing, Listing::Conferences { .. });
    let assembled = build_series_query(criteria, &viewer, &state.mode, conference);
    let mut query = assembled.query;

    let sort = match listing {
        Listing::Seminars => SeriesSort::NextTalk,
        Listing::Conferences { past } => {
            let today = Utc::now()
                .with_timezone(&viewer.timezone)
                .date_naive();
            let window = conference_date_window(past, today);
            query.require(window.field, window.matcher);
            if past {
                SeriesSort::ConferencePast
            } else {
                SeriesSort::ConferenceUpcoming
            }
        }
    };

    let series = fetch_series(state.store.as_ref(), &query, sort, Utc::now()).await?;
    let counters = count_facets(&series, &state.vocab);
    let total = series.len();
    let rows = annotate_rows(&series, &prefs, |_| false);
    Ok(SeriesListPage {
        section: section.to_string(),
        series,
        rows,
        counters,
        warnings: assembled.warnings,
        hide_filters: Vec::new(),
        total,
    })
}

async fn series_search(
    state: &ApiState,
    headers: &HeaderMap,
    criteria: SearchCriteria,
    conference: bool,
) -> Result<SeriesListPage, ApiError> {
    let (viewer, prefs) = request_context(headers);
    let assembled = build_series_query(&criteria, &viewer, &state.mode, conference);

    let sort = if conference {
        SeriesSort::ConferenceUpcoming
    } else {
        SeriesSort::NextTalk
    };
    let mut series =
        fetch_series(state.store.as_ref(), &assembled.query, sort, Utc::now()).await?;

    // Organizer criteria live on a separate collection; resolve them into a
    // shortname set and keep only matching series.
    if criteria.organizer().is_some() {
        let lookup: HashMap<String, Vec<Organizer>> = state
            .store
            .organizer_lookup(&assembled.organizer_query)
            .await?;
        series.retain(|s| lookup.contains_key(&s.shortname));
    }

    let counters = count_facets(&series, &state.vocab);
    let total = series.len();
    let series = page_slice(series, criteria.seminar_window());
    let rows = annotate_rows(&series, &prefs, |_| false);
    Ok(SeriesListPage {
        section: if conference { "search_conferences" } else { "search_seminars" }.to_string(),
        series,
        rows,
        counters,
        warnings: assembled.warnings,
        hide_filters: Vec::new(),
        total,
    })
}

fn page_slice<T>(items: Vec<T>, window: PageWindow) -> Vec<T> {
    items
        .into_iter()
        .skip(window.start)
        .take(window.count)
        .collect()
}

// ============================================================================
// Detail internals
// ============================================================================

async fn visible_series(
    state: &ApiState,
    headers: &HeaderMap,
    shortname: &str,
) -> Result<SeminarSeries, ApiError> {
    let (viewer, _) = request_context(headers);
    let series = state
        .store
        .get_seminar(shortname)
        .await?
        .ok_or_else(|| StoreError::SeminarNotFound(shortname.to_string()))?;
    // An invisible series answers exactly like a missing one.
    if !series.visible_to(&viewer) {
        return Err(StoreError::SeminarNotFound(shortname.to_string()).into());
    }
    Ok(series)
}

async fn seminar_page(state: &ApiState, series: SeminarSeries) -> Result<SeminarPage, ApiError> {
    let mut organizer_query = Query::new();
    organizer_query.require(
        "seminar_id",
        Matcher::Eq(Value::str(series.shortname.clone())),
    );
    let organizers = state
        .store
        .organizer_lookup(&organizer_query)
        .await?
        .remove(&series.shortname)
        .unwrap_or_default();

    let talks = listed_talks(state, &series.shortname).await?;
    let now = Utc::now();
    let (mut future_talks, mut past_talks): (Vec<Talk>, Vec<Talk>) =
        talks.into_iter().partition(|t| t.end_time >= now);
    sort_talks(&mut future_talks, TalkSort::StartThenSeries);
    sort_talks(&mut past_talks, TalkSort::StartDescThenSeries);

    Ok(SeminarPage {
        series,
        organizers,
        future_talks,
        past_talks,
    })
}

async fn visible_talk(
    state: &ApiState,
    headers: &HeaderMap,
    seminar_id: &str,
    talkid: u32,
) -> Result<(Talk, SeminarSeries), ApiError> {
    let series = visible_series(state, headers, seminar_id).await?;
    let talk = state
        .store
        .get_talk(seminar_id, talkid)
        .await?
        .ok_or_else(|| StoreError::TalkNotFound(seminar_id.to_string(), talkid))?;
    if !talk_listed(&talk) {
        return Err(StoreError::TalkNotFound(seminar_id.to_string(), talkid).into());
    }
    Ok((talk, series))
}

/// Whether a talk appears on public listings and feeds.
fn talk_listed(talk: &Talk) -> bool {
    talk.display && !talk.hidden.unwrap_or(false)
}

async fn listed_talks(state: &ApiState, shortname: &str) -> Result<Vec<Talk>, ApiError> {
    let mut talks = state.store.talks_for_seminar(shortname).await?;
    talks.retain(talk_listed);
    sort_talks(&mut talks, TalkSort::StartThenSeries);
    Ok(talks)
}

// ============================================================================
// Feed internals
// ============================================================================

/// Apply the feed's date parameters.
///
/// A `daterange` value of `past` or `future` is a keyword cutoff on the
/// talk's start time; anything else goes through the range parser. With no
/// `daterange`, the bare `past`/`future` presence flags apply the same
/// cutoffs, except that both together mean no restriction; only the bare
/// `past` flag lists most recent first.
fn filter_feed_talks(
    talks: &mut Vec<Talk>,
    params: &FeedParams,
    viewer: &crate::viewer::Viewer,
    now: DateTime<Utc>,
) {
    let mut reverse = false;
    match params.daterange.as_deref().map(str::trim) {
        Some("past") => {
            talks.retain(|t| t.start_time <= now);
        }
        Some("future") => {
            talks.retain(|t| t.start_time >= now);
        }
        Some(range) if !range.is_empty() => {
            let parsed = parse_range(range, viewer.timezone, DateGranularity::Timestamps);
            if let Some(clause) = parsed.clause {
                let mut query = Query::new();
                query.require(clause.field, clause.matcher);
                talks.retain(|t| query.matches(t));
            }
        }
        Some(_) => {}
        None => match (params.past.is_some(), params.future.is_some()) {
            // Both flags cancel out.
            (true, true) | (false, false) => {}
            (true, false) => {
                talks.retain(|t| t.start_time <= now);
                reverse = true;
            }
            (false, true) => {
                talks.retain(|t| t.start_time >= now);
            }
        },
    }
    sort_talks(
        talks,
        if reverse {
            TalkSort::StartDescThenSeries
        } else {
            TalkSort::StartThenSeries
        },
    );
}

/// The feed's column set; the key order is the wire contract with the
/// embeddable widgets.
fn feed_columns(talk: &Talk) -> serde_json::Value {
    serde_json::json!({
        "speaker": talk.speaker,
        "video_link": talk.video_link,
        "slides_link": talk.slides_link,
        "title": talk.title,
        "room": talk.room,
        "comments": talk.comments,
        "abstract": talk.abstract_text,
        "start_time": talk.start_time,
        "end_time": talk.end_time,
        "speaker_affiliation": talk.speaker_affiliation,
        "speaker_homepage": talk.speaker_homepage,
        "language": talk.language,
        "deleted": talk.deleted,
        "paper_link": talk.paper_link,
        "stream_link": talk.stream_link,
    })
}

fn valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
}

fn ics_response(name: &str, talks: &[Talk]) -> Response {
    let body = render_ics(talks, Utc::now());
    (
        [
            (
                header::CONTENT_TYPE,
                "text/calendar; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}.ics\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_validation() {
        assert!(valid_callback("jQuery123_cb"));
        assert!(valid_callback("window.render"));
        assert!(!valid_callback(""));
        assert!(!valid_callback("alert(1)//"));
    }

    #[test]
    fn test_page_slice() {
        let items: Vec<u32> = (0..10).collect();
        let window = PageWindow { count: 3, start: 8 };
        assert_eq!(page_slice(items, window), vec![8, 9]);
    }
}
