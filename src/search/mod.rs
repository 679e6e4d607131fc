//! Search query construction, fetch, and result annotation.

pub mod annotate;
pub mod assemble;
pub mod counters;
pub mod criteria;
pub mod daterange;
pub mod fetch;
pub mod predicates;

pub use annotate::{annotate_rows, FilterPrefs, RowAttributes};
pub use assemble::{
    build_series_query, build_talk_query, conference_date_window, talk_time_window,
    AssembledSeriesQuery, AssembledTalkQuery,
};
pub use counters::{count_facets, CounterSet};
pub use criteria::{PageWindow, SearchCriteria};
pub use daterange::{parse_range, DateGranularity, ParsedRange};
pub use fetch::{fetch_series, fetch_talks, sort_talks, SeriesSort, TalkSort};
