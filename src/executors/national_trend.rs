//! National production trend for a crop and its correlation with
//! India-wide annual rainfall.

use super::QueryContext;
use crate::answer::{number, row, AnswerPayload, AnswerTable, Row};
use crate::crops;
use crate::error::Result;
use crate::frame::{float_values, int_values, max_year, one_of, sum_or_null, window_start, year_between};
use polars::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// Minimum overlapping years before a correlation is reported
pub const MIN_CORRELATION_POINTS: usize = 3;

/// Pearson correlation over paired samples. `None` below
/// [`MIN_CORRELATION_POINTS`] pairs or when either series is constant.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < MIN_CORRELATION_POINTS {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Inner join of two per-year series, keeping years where both values exist
pub fn overlapping(left: &[(i64, Option<f64>)], right: &[(i64, Option<f64>)]) -> Vec<(f64, f64)> {
    let right: BTreeMap<i64, f64> = right
        .iter()
        .filter_map(|(year, v)| v.map(|v| (*year, v)))
        .collect();
    left.iter()
        .filter_map(|(year, v)| Some((v.as_ref().copied()?, *right.get(year)?)))
        .collect()
}

fn yearly(df: &DataFrame, value: &str) -> Result<Vec<(i64, Option<f64>)>> {
    let years = int_values(df, "year")?;
    let values = float_values(df, value)?;
    Ok(years
        .into_iter()
        .zip(values)
        .filter_map(|(year, v)| year.map(|y| (y, v)))
        .collect())
}

fn yearly_rows(series: &[(i64, Option<f64>)], value: &str) -> Vec<Row> {
    series
        .iter()
        .map(|(year, v)| row([("year", Value::from(*year)), (value, number(*v))]))
        .collect()
}

pub fn india_trend_correlation(ctx: &QueryContext<'_>, crop: &str, years: usize) -> Result<AnswerPayload> {
    let years = years.max(1);
    let crop_frame = ctx.catalog.crop_state_year();
    let Some(upper) = max_year(crop_frame.clone(), None)? else {
        return Ok(AnswerPayload::text_only("No crop years available.", ctx.citations()));
    };
    let lower = window_start(upper, years);
    let variants = crops::resolve(crop);

    let production_df = crop_frame
        .filter(one_of("crop", &variants).and(year_between(lower, upper)))
        .group_by([col("year")])
        .agg([sum_or_null("production_tonnes")])
        .sort(["year"], SortMultipleOptions::default())
        .collect()?;
    let production = yearly(&production_df, "production_tonnes")?;

    let rainfall = match ctx.catalog.rain_india_year() {
        Some(frame) => {
            let df = frame
                .filter(year_between(lower, upper))
                .select([col("year"), col("annual_mm")])
                .sort(["year"], SortMultipleOptions::default())
                .collect()?;
            yearly(&df, "annual_mm")?
        }
        None => Vec::new(),
    };

    let mut tables = Vec::new();
    if !production.is_empty() {
        tables.push(AnswerTable::new(
            format!("Production of {} in India ({}-{})", crop, lower, upper),
            yearly_rows(&production, "production_tonnes"),
        ));
    }
    if !rainfall.is_empty() {
        tables.push(AnswerTable::new(
            format!("Annual rainfall (India) ({}-{})", lower, upper),
            yearly_rows(&rainfall, "annual_mm"),
        ));
    }

    let pairs = overlapping(&production, &rainfall);
    info!("{} trend over {}-{}: {} overlapping years", crop, lower, upper, pairs.len());
    let correlation = match pearson(&pairs) {
        Some(r) => format!(
            "Pearson correlation (production vs rainfall) over {}-{}: r = {:.2}",
            lower, upper, r
        ),
        None => "Correlation not computed (insufficient overlap).".to_string(),
    };

    Ok(AnswerPayload::new(
        format!("India trend for {}. {}", crop, correlation),
        tables,
        ctx.citations(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_and_inverse() {
        let up = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert!((pearson(&up).unwrap() - 1.0).abs() < 1e-12);
        let down = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!((pearson(&down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_needs_three_varying_points() {
        assert_eq!(pearson(&[(1.0, 2.0), (2.0, 3.0)]), None);
        assert_eq!(pearson(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]), None);
    }

    #[test]
    fn test_overlapping_drops_missing() {
        let production = vec![(2010, Some(1.0)), (2011, None), (2012, Some(3.0)), (2013, Some(4.0))];
        let rainfall = vec![(2011, Some(900.0)), (2012, Some(1000.0)), (2013, None), (2014, Some(5.0))];
        assert_eq!(overlapping(&production, &rainfall), vec![(3.0, 1000.0)]);
    }
}
