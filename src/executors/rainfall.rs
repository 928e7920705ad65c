//! Rainfall comparison between two states plus their top crops over the
//! same window.
//!
//! Rainfall comes from the state-level table when it is present and
//! non-empty, otherwise from the subdivision table read directly (a
//! subdivision named like the state stands in for it). A state still missing
//! after that is synthesized as the plain mean of the subdivisions that make
//! it up, when it has such a grouping.

use super::QueryContext;
use crate::answer::{number, round2, row, AnswerPayload, AnswerTable, Row};
use crate::error::Result;
use crate::frame::{
    float_values, max_year, one_of, row_limit, str_values, sum_or_null, window_start, year_between, year_bounds,
};
use polars::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainfallSource {
    /// `rain_state_year`
    State,
    /// `rain_subdivision_year` read directly
    Subdivision,
    /// Mean over a state's mapped subdivisions
    SubdivisionMean,
}

impl RainfallSource {
    pub fn label(&self) -> &'static str {
        match self {
            RainfallSource::State => "state",
            RainfallSource::Subdivision => "subdivision",
            RainfallSource::SubdivisionMean => "subdivision_mean",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateRainfall {
    pub state: String,
    pub avg_annual_mm: Option<f64>,
    pub source: RainfallSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCrop {
    pub state: String,
    pub crop: String,
    pub total_tonnes: Option<f64>,
    pub rank: usize,
}

/// IMD subdivisions composing states that span more than one. The state
/// figure is an unweighted mean of these, an approximation kept as is.
pub fn subdivisions_of(state: &str) -> Option<&'static [&'static str]> {
    match state {
        "Karnataka" => Some(&[
            "Coastal Karnataka",
            "North Interior Karnataka",
            "South Interior Karnataka",
        ]),
        "Andhra Pradesh" => Some(&["Coastal Andhra Pradesh", "Rayalaseema"]),
        "Gujarat" => Some(&["Gujarat Region", "Saurashtra & Kutch"]),
        "Uttar Pradesh" => Some(&["East Uttar Pradesh", "West Uttar Pradesh"]),
        _ => None,
    }
}

fn average_by(frame: LazyFrame, key: &str, states: &[String], lower: i64, upper: i64) -> Result<Vec<(String, Option<f64>)>> {
    let df = frame
        .filter(one_of(key, states).and(year_between(lower, upper)))
        .group_by([col(key)])
        .agg([col("annual_mm").mean().alias("avg_annual_mm")])
        .collect()?;
    let names = str_values(&df, key)?;
    let averages = float_values(&df, "avg_annual_mm")?;
    Ok(names
        .into_iter()
        .zip(averages)
        .filter_map(|(name, avg)| name.map(|n| (n, avg)))
        .collect())
}

fn subdivision_mean(frame: LazyFrame, subdivisions: &[&str], lower: i64, upper: i64) -> Result<Option<f64>> {
    let names: Vec<String> = subdivisions.iter().map(|s| s.to_string()).collect();
    let df = frame
        .filter(one_of("subdivision", &names).and(year_between(lower, upper)))
        .select([col("annual_mm").mean()])
        .collect()?;
    Ok(float_values(&df, "annual_mm")?.into_iter().next().flatten())
}

/// Top `top` crops per state by summed production in `[lower, upper]`.
/// States come back in alphabetical order, crops by descending production.
pub fn top_crops_in_window(frame: &LazyFrame, states: &[String], lower: i64, upper: i64, top: usize) -> Result<Vec<RankedCrop>> {
    let mut sorted_states = states.to_vec();
    sorted_states.sort();
    sorted_states.dedup();

    let mut ranked = Vec::new();
    for state in sorted_states {
        let df = frame
            .clone()
            .filter(col("state").eq(lit(state.clone())).and(year_between(lower, upper)))
            .group_by([col("crop")])
            .agg([sum_or_null("production_tonnes").alias("total_tonnes")])
            .sort(
                ["total_tonnes", "crop"],
                SortMultipleOptions::default()
                    .with_order_descendings([true, false])
                    .with_nulls_last(true),
            )
            .limit(row_limit(top))
            .collect()?;
        let crops = str_values(&df, "crop")?;
        let totals = float_values(&df, "total_tonnes")?;
        for (idx, (crop, total_tonnes)) in crops.into_iter().zip(totals).enumerate() {
            ranked.push(RankedCrop {
                state: state.clone(),
                crop: crop.unwrap_or_default(),
                total_tonnes,
                rank: idx + 1,
            });
        }
    }
    Ok(ranked)
}

/// Widest window common to both states' crop years, capped at `years`
fn common_crop_window(frame: &LazyFrame, states: &[String], years: usize) -> Result<Option<(i64, i64)>> {
    let mut earliest_common: Option<i64> = None;
    let mut latest_common: Option<i64> = None;
    for state in states {
        let (min, max) = year_bounds(frame.clone(), Some(col("state").eq(lit(state.clone()))))?;
        if let (Some(min), Some(max)) = (min, max) {
            earliest_common = Some(earliest_common.map_or(min, |e| e.max(min)));
            latest_common = Some(latest_common.map_or(max, |l| l.min(max)));
        }
    }
    Ok(match (earliest_common, latest_common) {
        (Some(earliest), Some(latest)) => Some((earliest.max(window_start(latest, years)), latest)),
        _ => None,
    })
}

pub fn rainfall_compare_top_crops(
    ctx: &QueryContext<'_>,
    state1: &str,
    state2: &str,
    years: usize,
    top: usize,
) -> Result<AnswerPayload> {
    let years = years.max(1);
    let top = top.max(1);
    let caps = ctx.catalog.capabilities();
    let requested = vec![state1.to_string(), state2.to_string()];

    // 1) Pick the rainfall source and the window ending at its latest year
    let state_level = match ctx.catalog.rain_state_year() {
        Some(frame) => max_year(frame.clone(), None)?.map(|y| (frame, y)),
        None => None,
    };
    let (source, frame, upper) = match state_level {
        Some((frame, upper)) => (RainfallSource::State, frame, upper),
        None => {
            let Some(frame) = ctx.catalog.rain_subdivision_year() else {
                return Ok(AnswerPayload::text_only(
                    "Rainfall file is India-level only. Load subdivision/state-wise IMD and re-run ETL.",
                    ctx.citations(),
                ));
            };
            let Some(upper) = max_year(frame.clone(), None)? else {
                return Ok(AnswerPayload::text_only("No rainfall years available.", ctx.citations()));
            };
            (RainfallSource::Subdivision, frame, upper)
        }
    };
    let lower = window_start(upper, years);
    info!("Rainfall source {} for {}-{}", source.label(), lower, upper);

    let key = match source {
        RainfallSource::State => "state",
        _ => "subdivision",
    };
    let mut found: BTreeMap<String, StateRainfall> = average_by(frame, key, &requested, lower, upper)?
        .into_iter()
        .map(|(state, avg)| {
            (
                state.clone(),
                StateRainfall {
                    state,
                    avg_annual_mm: avg,
                    source,
                },
            )
        })
        .collect();

    // 1b) Synthesize states still missing from their subdivisions
    if caps.have_subdivision {
        if let Some(subdivision_frame) = ctx.catalog.rain_subdivision_year() {
            for state in &requested {
                if found.contains_key(state) {
                    continue;
                }
                let Some(subdivisions) = subdivisions_of(state) else { continue };
                if let Some(avg) = subdivision_mean(subdivision_frame.clone(), subdivisions, lower, upper)? {
                    debug!("Synthesized {} rainfall from {:?}", state, subdivisions);
                    found.insert(
                        state.clone(),
                        StateRainfall {
                            state: state.clone(),
                            avg_annual_mm: Some(avg),
                            source: RainfallSource::SubdivisionMean,
                        },
                    );
                }
            }
        }
    }

    let mut rainfall: Vec<StateRainfall> = Vec::new();
    let mut missing_rain: Vec<&str> = Vec::new();
    for state in [state1, state2] {
        if rainfall.iter().any(|r| r.state == state) || missing_rain.contains(&state) {
            continue;
        }
        match found.remove(state) {
            Some(r) => rainfall.push(r),
            None => missing_rain.push(state),
        }
    }

    // 2) Top crops in the same window, else the widest common crop window
    let crop_frame = ctx.catalog.crop_state_year();
    let mut crop_window = (lower, upper);
    let mut ranked = top_crops_in_window(&crop_frame, &requested, lower, upper, top)?;
    if ranked.is_empty() {
        if let Some((crop_lower, crop_upper)) = common_crop_window(&crop_frame, &requested, years)? {
            info!("No crop rows in {}-{}, using {}-{}", lower, upper, crop_lower, crop_upper);
            crop_window = (crop_lower, crop_upper);
            ranked = top_crops_in_window(&crop_frame, &requested, crop_lower, crop_upper, top)?;
        }
    }

    if rainfall.is_empty() && ranked.is_empty() {
        return Ok(AnswerPayload::text_only(
            format!(
                "No rainfall or crop rows found for {} and {} over {}-{}.",
                state1, state2, lower, upper
            ),
            ctx.citations(),
        ));
    }

    // 3) Build the answer
    let mut text = format!("Comparison for {} vs {} over {}-{}.", state1, state2, lower, upper);
    for state in &missing_rain {
        text.push_str(&format!(" No rainfall data for {}.", state));
    }
    if !ranked.is_empty() && crop_window != (lower, upper) {
        text.push_str(&format!(
            " Crop production for {}-{} unavailable; using {}-{}.",
            lower, upper, crop_window.0, crop_window.1
        ));
    }

    let mut tables = Vec::new();
    if !rainfall.is_empty() {
        let rows: Vec<Row> = rainfall
            .iter()
            .map(|r| {
                row([
                    ("state", Value::String(r.state.clone())),
                    ("avg_annual_mm", number(r.avg_annual_mm.map(round2))),
                    ("source", Value::String(r.source.label().to_string())),
                ])
            })
            .collect();
        tables.push(AnswerTable::new(format!("Avg annual rainfall {}-{}", lower, upper), rows));
    }
    if !ranked.is_empty() {
        let rows: Vec<Row> = ranked
            .iter()
            .map(|c| {
                row([
                    ("state", Value::String(c.state.clone())),
                    ("crop", Value::String(c.crop.clone())),
                    ("total_tonnes", number(c.total_tonnes)),
                    ("rnk", Value::from(c.rank)),
                ])
            })
            .collect();
        tables.push(AnswerTable::new(
            format!(
                "Top {} crops by total production {}-{}",
                top, crop_window.0, crop_window.1
            ),
            rows,
        ));
    }

    Ok(AnswerPayload::new(text, tables, ctx.citations()))
}
