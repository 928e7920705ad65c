//! Intent executors
//!
//! One executor per intent type. Each runs its aggregation over the dataset
//! views and owns its fallback policy: when the requested scope has no rows
//! it retries once on a relaxed scope and says so in the narrative. Missing
//! data never becomes an error; only faults in the data layer propagate.

pub mod district_extremes;
pub mod national_trend;
pub mod rainfall;
pub mod top_crops;

use crate::answer::{AnswerPayload, Citation};
use crate::citations::cite;
use crate::datasets::DatasetCatalog;
use crate::error::Result;
use crate::intent::QuestionIntent;
use crate::manifest::Manifest;

/// Everything an executor reads
pub struct QueryContext<'a> {
    pub catalog: &'a DatasetCatalog,
    pub manifest: &'a Manifest,
}

impl<'a> QueryContext<'a> {
    pub fn new(catalog: &'a DatasetCatalog, manifest: &'a Manifest) -> Self {
        Self { catalog, manifest }
    }

    pub fn citations(&self) -> Vec<Citation> {
        cite(self.manifest)
    }
}

/// Result of an exact attempt and at most one relaxed retry
#[derive(Debug, Clone, PartialEq)]
pub struct YearScoped<T> {
    pub value: T,
    /// Year the value was found in
    pub year: i64,
    /// True when `year` came from the relaxed lookup
    pub relaxed: bool,
}

/// Try `attempt` at the requested year; if that yields nothing, look up a
/// relaxed year once and try again there. The relaxed year is skipped when
/// it equals the year already tried.
pub fn with_year_fallback<T>(
    requested: Option<i64>,
    attempt: impl Fn(i64) -> Result<Option<T>>,
    relaxed_year: impl FnOnce() -> Result<Option<i64>>,
) -> Result<Option<YearScoped<T>>> {
    if let Some(year) = requested {
        if let Some(value) = attempt(year)? {
            return Ok(Some(YearScoped {
                value,
                year,
                relaxed: false,
            }));
        }
    }

    match relaxed_year()? {
        Some(year) if Some(year) != requested => Ok(attempt(year)?.map(|value| YearScoped {
            value,
            year,
            relaxed: true,
        })),
        _ => Ok(None),
    }
}

/// Narrative note for a substituted year; empty when nothing was substituted
pub fn substitution_note(requested: Option<i64>, used: i64, relaxed: bool) -> String {
    match (relaxed, requested) {
        (true, Some(requested)) => format!(" (requested {} not available; using {})", requested, used),
        (true, None) => format!(" (using latest available year {})", used),
        (false, _) => String::new(),
    }
}

/// Route an intent to its executor
pub fn dispatch(intent: &QuestionIntent, ctx: &QueryContext<'_>) -> Result<AnswerPayload> {
    match intent {
        QuestionIntent::DistrictExtremeOne { crop, state, year, mode } => {
            district_extremes::district_extreme_one(ctx, crop, state, *year, *mode)
        }
        QuestionIntent::DistrictExtremeTwo { crop, state1, state2, year } => {
            district_extremes::district_extreme_two(ctx, crop, state1, state2, *year)
        }
        QuestionIntent::RainfallCompareTopCrops { state1, state2, years, top } => {
            rainfall::rainfall_compare_top_crops(ctx, state1, state2, *years, *top)
        }
        QuestionIntent::IndiaTrendCorrelation { crop, years } => {
            national_trend::india_trend_correlation(ctx, crop, *years)
        }
        QuestionIntent::TopCropsStateLatest { state, top } => {
            top_crops::top_crops_state_latest(ctx, state, *top)
        }
        QuestionIntent::Unknown { hint } => Ok(AnswerPayload::text_only(hint.clone(), ctx.citations())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_exact_hit_skips_relaxed_lookup() {
        let scoped = with_year_fallback(
            Some(2014),
            |y| Ok(Some(y * 10)),
            || panic!("relaxed lookup should not run"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(scoped, YearScoped { value: 20140, year: 2014, relaxed: false });
    }

    #[test]
    fn test_relaxed_retry_runs_once() {
        let calls = Cell::new(0);
        let scoped = with_year_fallback(
            Some(2014),
            |y| {
                calls.set(calls.get() + 1);
                Ok(if y == 2011 { Some("found") } else { None })
            },
            || Ok(Some(2011)),
        )
        .unwrap()
        .unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(scoped.year, 2011);
        assert!(scoped.relaxed);
    }

    #[test]
    fn test_same_relaxed_year_not_retried() {
        let calls = Cell::new(0);
        let scoped: Option<YearScoped<()>> = with_year_fallback(
            Some(2014),
            |_| {
                calls.set(calls.get() + 1);
                Ok(None)
            },
            || Ok(Some(2014)),
        )
        .unwrap();
        assert!(scoped.is_none());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_no_requested_year_uses_relaxed() {
        let scoped = with_year_fallback(None, |y| Ok(Some(y)), || Ok(Some(2019))).unwrap().unwrap();
        assert!(scoped.relaxed);
        assert_eq!(scoped.value, 2019);
    }

    #[test]
    fn test_substitution_note() {
        assert_eq!(substitution_note(Some(2014), 2014, false), "");
        assert_eq!(
            substitution_note(Some(2014), 2011, true),
            " (requested 2014 not available; using 2011)"
        );
    }
}
