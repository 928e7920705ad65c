//! Small helpers over Polars frames used by the executors.

use crate::error::Result;
use polars::prelude::*;

/// `column IN (values)` as an OR chain; matches nothing for an empty list.
pub fn one_of(column: &str, values: &[String]) -> Expr {
    values
        .iter()
        .map(|v| col(column).eq(lit(v.clone())))
        .reduce(|acc, e| acc.or(e))
        .unwrap_or_else(|| lit(false))
}

/// `lower <= year <= upper`
pub fn year_between(lower: i64, upper: i64) -> Expr {
    col("year").gt_eq(lit(lower)).and(col("year").lt_eq(lit(upper)))
}

/// Sum of a column that stays null when every input value is null
pub fn sum_or_null(column: &str) -> Expr {
    when(col(column).count().gt(lit(0)))
        .then(col(column).sum())
        .otherwise(lit(NULL))
        .cast(DataType::Float64)
        .alias(column)
}

/// First year of a window of `years` years ending at `upper`
pub fn window_start(upper: i64, years: usize) -> i64 {
    let span = i64::try_from(years).unwrap_or(i64::MAX).saturating_sub(1);
    upper.saturating_sub(span)
}

/// Row limit for `LazyFrame::limit`; counts past `IdxSize` mean no limit
pub fn row_limit(n: usize) -> IdxSize {
    IdxSize::try_from(n).unwrap_or(IdxSize::MAX)
}

fn filtered(frame: LazyFrame, predicate: Option<Expr>) -> LazyFrame {
    match predicate {
        Some(expr) => frame.filter(expr),
        None => frame,
    }
}

/// Latest year present, optionally restricted by a predicate
pub fn max_year(frame: LazyFrame, predicate: Option<Expr>) -> Result<Option<i64>> {
    let df = filtered(frame, predicate)
        .select([col("year").max()])
        .collect()?;
    Ok(int_values(&df, "year")?.into_iter().next().flatten())
}

/// Earliest and latest year present
pub fn year_bounds(frame: LazyFrame, predicate: Option<Expr>) -> Result<(Option<i64>, Option<i64>)> {
    let df = filtered(frame, predicate)
        .select([
            col("year").min().alias("min_year"),
            col("year").max().alias("max_year"),
        ])
        .collect()?;
    let min = int_values(&df, "min_year")?.into_iter().next().flatten();
    let max = int_values(&df, "max_year")?.into_iter().next().flatten();
    Ok((min, max))
}

pub fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = df.column(name)?.cast(&DataType::Int64)?;
    let values = series.i64()?.into_iter().collect();
    Ok(values)
}
