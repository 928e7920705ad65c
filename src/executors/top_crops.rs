//! Top crops of a state in the most recent year.

use super::{with_year_fallback, QueryContext};
use crate::answer::{number, row, AnswerPayload, AnswerTable, Row};
use crate::error::Result;
use crate::frame::{float_values, max_year, row_limit, str_values};
use polars::prelude::*;
use serde_json::Value;
use tracing::info;

fn ranked_crops(frame: &LazyFrame, state: &str, year: i64, top: usize) -> Result<Option<Vec<Row>>> {
    let df = frame
        .clone()
        .filter(col("state").eq(lit(state.to_string())).and(col("year").eq(lit(year))))
        .select([col("crop"), col("production_tonnes")])
        .sort(
            ["production_tonnes", "crop"],
            SortMultipleOptions::default()
                .with_order_descendings([true, false])
                .with_nulls_last(true),
        )
        .limit(row_limit(top))
        .collect()?;
    if df.height() == 0 {
        return Ok(None);
    }

    let crops = str_values(&df, "crop")?;
    let production = float_values(&df, "production_tonnes")?;
    Ok(Some(
        crops
            .into_iter()
            .zip(production)
            .map(|(crop, tonnes)| {
                row([
                    ("crop", crop.map(Value::String).unwrap_or(Value::Null)),
                    ("production_tonnes", number(tonnes)),
                ])
            })
            .collect(),
    ))
}

/// Ranks at the latest year across all states; if the state has nothing
/// there, uses the state's own latest year and labels the table with it.
pub fn top_crops_state_latest(ctx: &QueryContext<'_>, state: &str, top: usize) -> Result<AnswerPayload> {
    let top = top.max(1);
    let frame = ctx.catalog.crop_state_year();
    let global_latest = max_year(frame.clone(), Some(col("state").is_not_null()))?;

    let found = with_year_fallback(
        global_latest,
        |y| ranked_crops(&frame, state, y, top),
        || max_year(frame.clone(), Some(col("state").eq(lit(state.to_string())))),
    )?;

    let Some(found) = found else {
        return Ok(AnswerPayload::text_only(format!("No data found for {}.", state), ctx.citations()));
    };

    let header = if found.relaxed {
        info!("{} has no rows in {:?}, using {}", state, global_latest, found.year);
        format!(
            "Top {} crops in {} (latest available year for state: {})",
            top, state, found.year
        )
    } else {
        format!("Top {} crops in {} (year {})", top, state, found.year)
    };

    Ok(AnswerPayload::new(
        header.clone(),
        vec![AnswerTable::new(header, found.value)],
        ctx.citations(),
    ))
}
