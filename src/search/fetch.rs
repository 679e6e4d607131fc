//! Result fetch, visibility post-filter, and deterministic sorting.
//!
//! The store query restricts on the talk's own display/hidden flags, but a
//! talk in a private series must still not appear; that check needs series
//! data the talk row lacks, so it runs here as a second in-memory pass.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{SeminarSeries, Talk};
use crate::store::{Bound, Matcher, Query, Store};
use crate::viewer::Viewer;

use super::assemble::append_talk_visibility;

/// Talk sort orders. All are total: the secondary key breaks ties stably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkSort {
    /// Start time, then owning series id (browse upcoming).
    StartThenSeries,
    /// Start time descending, then owning series id (browse past).
    StartDescThenSeries,
    /// Start time, then speaker (search results).
    StartThenSpeaker,
}

/// Series sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSort {
    /// Start date, end date, name (upcoming conferences).
    ConferenceUpcoming,
    /// End date descending, start date descending, name (past conferences).
    ConferencePast,
    /// Time of each series' next upcoming talk; series with none sort
    /// last, by name (default for non-conference series).
    NextTalk,
    /// Recurring weekday, time of day, name (institution pages).
    Schedule,
}

/// Run a talk query, drop talks whose series the viewer may not see, and
/// sort.
pub async fn fetch_talks(
    store: &dyn Store,
    query: &Query,
    sort: TalkSort,
    viewer: &Viewer,
) -> Result<Vec<Talk>> {
    let mut talks = store.search_talks(query).await?;
    let seminars = store.all_seminars().await?;
    talks.retain(|talk| {
        seminars
            .get(&talk.seminar_id)
            .map_or(false, |series| series.visible_to(viewer))
    });
    sort_talks(&mut talks, sort);
    Ok(talks)
}

/// Sort talks in place.
pub fn sort_talks(talks: &mut [Talk], sort: TalkSort) {
    match sort {
        TalkSort::StartThenSeries => {
            talks.sort_by(|a, b| {
                (a.start_time, &a.seminar_id).cmp(&(b.start_time, &b.seminar_id))
            });
        }
        TalkSort::StartDescThenSeries => {
            talks.sort_by(|a, b| {
                (Reverse(a.start_time), &a.seminar_id).cmp(&(Reverse(b.start_time), &b.seminar_id))
            });
        }
        TalkSort::StartThenSpeaker => {
            talks.sort_by(|a, b| (a.start_time, &a.speaker).cmp(&(b.start_time, &b.speaker)));
        }
    }
}

/// Run a series query and sort.
pub async fn fetch_series(
    store: &dyn Store,
    query: &Query,
    sort: SeriesSort,
    now: DateTime<Utc>,
) -> Result<Vec<SeminarSeries>> {
    let mut series = store.search_seminars(query).await?;
    match sort {
        SeriesSort::ConferenceUpcoming => {
            series.sort_by(|a, b| {
                (a.start_date, a.end_date, &a.name).cmp(&(b.start_date, b.end_date, &b.name))
            });
        }
        SeriesSort::ConferencePast => {
            series.sort_by(|a, b| {
                (Reverse(a.end_date), Reverse(a.start_date), &a.name)
                    .cmp(&(Reverse(b.end_date), Reverse(b.start_date), &b.name))
            });
        }
        SeriesSort::NextTalk => {
            let next = next_talk_times(store, now).await?;
            series.sort_by(|a, b| {
                let ka = next.get(&a.shortname).copied();
                let kb = next.get(&b.shortname).copied();
                (ka.is_none(), ka, &a.name).cmp(&(kb.is_none(), kb, &b.name))
            });
        }
        SeriesSort::Schedule => {
            series.sort_by(|a, b| {
                (
                    a.weekday.is_none(),
                    a.weekday,
                    a.time_of_day,
                    &a.name,
                )
                    .cmp(&(b.weekday.is_none(), b.weekday, b.time_of_day, &b.name))
            });
        }
    }
    Ok(series)
}

/// Earliest upcoming talk start per series.
///
/// One query over the talks collection stands in for the per-series join
/// the store cannot do.
async fn next_talk_times(
    store: &dyn Store,
    now: DateTime<Utc>,
) -> Result<HashMap<String, DateTime<Utc>>> {
    let mut query = Query::new();
    append_talk_visibility(&mut query);
    query.require(
        "start_time",
        Matcher::Range {
            gte: Some(Bound::Time(now)),
            lte: None,
        },
    );
    let talks = store.search_talks(&query).await?;
    let mut next: HashMap<String, DateTime<Utc>> = HashMap::new();
    for talk in talks {
        next.entry(talk.seminar_id)
            .and_modify(|t| {
                if talk.start_time < *t {
                    *t = talk.start_time;
                }
            })
            .or_insert(talk.start_time);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VISIBILITY_PUBLIC;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn series(shortname: &str, name: &str) -> SeminarSeries {
        SeminarSeries {
            shortname: shortname.to_string(),
            name: name.to_string(),
            description: String::new(),
            homepage: String::new(),
            comments: String::new(),
            is_conference: false,
            start_date: None,
            end_date: None,
            weekday: None,
            time_of_day: None,
            topics: BTreeSet::new(),
            subjects: BTreeSet::new(),
            language: "en".to_string(),
            access: "open".to_string(),
            online: true,
            room: String::new(),
            institutions: Vec::new(),
            editors: Vec::new(),
            display: true,
            visibility: VISIBILITY_PUBLIC,
        }
    }

    fn talk(seminar_id: &str, ctr: u32, hour: u32) -> Talk {
        let start = Utc.with_ymd_and_hms(2030, 6, 1, hour, 0, 0).unwrap();
        Talk {
            seminar_id: seminar_id.to_string(),
            seminar_ctr: ctr,
            title: format!("Talk {ctr}"),
            abstract_text: String::new(),
            speaker: "Speaker".to_string(),
            speaker_email: String::new(),
            speaker_affiliation: String::new(),
            speaker_homepage: String::new(),
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
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

    #[tokio::test]
    async fn test_private_series_talks_are_dropped() {
        let store = MemoryStore::new();
        store.insert_seminar(series("open", "Open Seminar")).await;
        let mut hidden = series("secret", "Secret Seminar");
        hidden.visibility = 0;
        store.insert_seminar(hidden).await;
        store.insert_talk(talk("open", 1, 10)).await;
        store.insert_talk(talk("secret", 1, 11)).await;

        let talks = fetch_talks(
            &store,
            &Query::new(),
            TalkSort::StartThenSeries,
            &Viewer::anonymous(),
        )
        .await
        .unwrap();
        assert_eq!(talks.len(), 1);
        assert_eq!(talks[0].seminar_id, "open");
    }

    #[tokio::test]
    async fn test_orphan_talks_are_dropped() {
        let store = MemoryStore::new();
        store.insert_talk(talk("ghost", 1, 10)).await;
        let talks = fetch_talks(
            &store,
            &Query::new(),
            TalkSort::StartThenSeries,
            &Viewer::anonymous(),
        )
        .await
        .unwrap();
        assert!(talks.is_empty());
    }

    #[test]
    fn test_sort_start_then_speaker() {
        let mut a = talk("s", 1, 10);
        a.speaker = "Zeta".to_string();
        let mut b = talk("s", 2, 10);
        b.speaker = "Abel".to_string();
        let c = talk("s", 3, 9);
        let mut talks = vec![a, b, c];
        sort_talks(&mut talks, TalkSort::StartThenSpeaker);
        let order: Vec<u32> = talks.iter().map(|t| t.seminar_ctr).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_next_talk_ordering() {
        let store = MemoryStore::new();
        store.insert_seminar(series("a", "Alpha")).await;
        store.insert_seminar(series("b", "Beta")).await;
        store.insert_seminar(series("c", "Gamma")).await;
        // Beta's next talk is earliest; Gamma has no upcoming talk.
        store.insert_talk(talk("a", 1, 12)).await;
        store.insert_talk(talk("b", 1, 9)).await;

        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let ordered = fetch_series(&store, &Query::new(), SeriesSort::NextTalk, now)
            .await
            .unwrap();
        let names: Vec<&str> = ordered.iter().map(|s| s.shortname.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_conference_sorts() {
        let store = MemoryStore::new();
        let mut early = series("early", "Early Conf");
        early.is_conference = true;
        early.start_date = chrono::NaiveDate::from_ymd_opt(2030, 1, 1);
        early.end_date = chrono::NaiveDate::from_ymd_opt(2030, 1, 5);
        let mut late = series("late", "Late Conf");
        late.is_conference = true;
        late.start_date = chrono::NaiveDate::from_ymd_opt(2030, 3, 1);
        late.end_date = chrono::NaiveDate::from_ymd_opt(2030, 3, 5);
        store.insert_seminar(early).await;
        store.insert_seminar(late).await;

        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let upcoming = fetch_series(&store, &Query::new(), SeriesSort::ConferenceUpcoming, now)
            .await
            .unwrap();
        assert_eq!(upcoming[0].shortname, "early");

        let past = fetch_series(&store, &Query::new(), SeriesSort::ConferencePast, now)
            .await
            .unwrap();
        assert_eq!(past[0].shortname, "late");
    }
}
