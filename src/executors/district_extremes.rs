//! District extremes: the top or bottom producing district for a crop.

use super::{substitution_note, with_year_fallback, QueryContext, YearScoped};
use crate::answer::{number, row, AnswerPayload, AnswerTable};
use crate::crops;
use crate::error::Result;
use crate::frame::{float_values, max_year, one_of, str_values, sum_or_null};
use crate::intent::ExtremeMode;
use polars::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct DistrictProduction {
    pub district: String,
    pub production_tonnes: Option<f64>,
}

impl DistrictProduction {
    fn table(&self, title: String) -> AnswerTable {
        AnswerTable::new(
            title,
            vec![row([
                ("district", Value::String(self.district.clone())),
                ("production_tonnes", number(self.production_tonnes)),
            ])],
        )
    }
}

fn state_crop_filter(state: &str, variants: &[String]) -> Expr {
    col("state").eq(lit(state.to_string())).and(one_of("crop", variants))
}

/// Rank districts of `state` in `year` by summed production and take the
/// first. Highest sorts descending with nulls last, lowest ascending with
/// nulls first; ties go to the alphabetically first district.
pub fn extreme_district(
    frame: &LazyFrame,
    state: &str,
    variants: &[String],
    year: i64,
    mode: ExtremeMode,
) -> Result<Option<DistrictProduction>> {
    let descending = mode == ExtremeMode::Highest;
    let df = frame
        .clone()
        .filter(state_crop_filter(state, variants).and(col("year").eq(lit(year))))
        .group_by([col("district")])
        .agg([sum_or_null("production_tonnes")])
        .sort(
            ["production_tonnes", "district"],
            SortMultipleOptions::default()
                .with_order_descendings([descending, false])
                .with_nulls_last(descending),
        )
        .limit(1)
        .collect()?;

    let districts = str_values(&df, "district")?;
    let production = float_values(&df, "production_tonnes")?;
    Ok(districts
        .into_iter()
        .zip(production)
        .next()
        .map(|(district, production_tonnes)| DistrictProduction {
            district: district.unwrap_or_default(),
            production_tonnes,
        }))
}

/// Latest year with any rows for this state and crop
fn latest_year_for(frame: &LazyFrame, state: &str, variants: &[String]) -> Result<Option<i64>> {
    max_year(frame.clone(), Some(state_crop_filter(state, variants)))
}

/// Extreme district for one side, falling back to the state's latest year
/// for the crop when the requested year has no rows.
fn extreme_with_fallback(
    frame: &LazyFrame,
    state: &str,
    variants: &[String],
    year: Option<i64>,
    mode: ExtremeMode,
) -> Result<Option<YearScoped<DistrictProduction>>> {
    with_year_fallback(
        year,
        |y| extreme_district(frame, state, variants, y, mode),
        || latest_year_for(frame, state, variants),
    )
}

pub fn district_extreme_one(
    ctx: &QueryContext<'_>,
    crop: &str,
    state: &str,
    year: i64,
    mode: ExtremeMode,
) -> Result<AnswerPayload> {
    let variants = crops::resolve(crop);
    debug!("Crop {} resolved to {:?}", crop, variants);
    let frame = ctx.catalog.crop_district_year();

    let Some(found) = extreme_with_fallback(&frame, state, &variants, Some(year), mode)? else {
        info!("No district rows for {} in {}", crop, state);
        return Ok(AnswerPayload::text_only(
            format!("No rows found for {} in {}. Try another crop or state.", crop, state),
            ctx.citations(),
        ));
    };

    if found.relaxed {
        info!("Year {} empty for {} in {}, used {}", year, crop, state, found.year);
    }
    let title = format!("{} production district", mode.label());
    let note = substitution_note(Some(year), found.year, found.relaxed);
    Ok(AnswerPayload::new(
        format!("{} for {} in {}{}", title, crop, state, note),
        vec![found.value.table(format!("{} ({})", title, found.year))],
        ctx.citations(),
    ))
}

pub fn district_extreme_two(
    ctx: &QueryContext<'_>,
    crop: &str,
    state1: &str,
    state2: &str,
    year: Option<i64>,
) -> Result<AnswerPayload> {
    let variants = crops::resolve(crop);
    let frame = ctx.catalog.crop_district_year();

    // Without a year each state resolves its own latest year, so the two
    // sides may come from different years.
    let highest = extreme_with_fallback(&frame, state1, &variants, year, ExtremeMode::Highest)?;
    let lowest = extreme_with_fallback(&frame, state2, &variants, year, ExtremeMode::Lowest)?;

    if highest.is_none() && lowest.is_none() {
        return Ok(AnswerPayload::text_only(
            format!("No rows found for {} in {} or {}.", crop, state1, state2),
            ctx.citations(),
        ));
    }

    let mut text = format!(
        "Comparison for {}: highest in {} vs lowest in {}.",
        crop, state1, state2
    );
    let mut tables = Vec::new();
    for (state, side, label) in [(state1, &highest, "Highest"), (state2, &lowest, "Lowest")] {
        match side {
            Some(found) => {
                if year.is_some() && found.relaxed {
                    text.push_str(&format!(
                        " {}{}.",
                        state,
                        substitution_note(year, found.year, true)
                    ));
                }
                tables.push(
                    found
                        .value
                        .table(format!("{} production in {} ({})", label, state, found.year)),
                );
            }
            None => text.push_str(&format!(" No rows found for {} in {}.", crop, state)),
        }
    }

    Ok(AnswerPayload::new(text, tables, ctx.citations()))
}
