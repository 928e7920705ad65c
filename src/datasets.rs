//! Dataset Access Layer
//!
//! Opens the cleaned analytical tables as lazy, read-only Polars views.
//! Each view is backed by `<clean_dir>/<view>.parquet`, or `<view>.csv` when
//! no parquet file exists. Opening is idempotent: every call re-scans the
//! files currently on disk and nothing is written back.
//!
//! Columns the executors compute on are cast on open (`year` to Int64,
//! production and rainfall measures to Float64) so parquet written by
//! different tools agrees on types.

use crate::error::{PlannerError, Result};
use crate::frame::int_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CROP_DISTRICT_YEAR: &str = "crop_district_year";
pub const CROP_STATE_YEAR: &str = "crop_state_year";
pub const CROP_STATE_TOTALS: &str = "crop_state_totals";
pub const RAIN_INDIA_YEAR: &str = "rain_india_year";
pub const RAIN_SUBDIVISION_YEAR: &str = "rain_subdivision_year";
pub const RAIN_STATE_YEAR: &str = "rain_state_year";

const CROP_MEASURES: &[&str] = &["production_tonnes"];
const RAIN_MEASURES: &[&str] = &["annual_mm"];

/// Which optional rainfall granularities are available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainfallCapabilities {
    pub have_subdivision: bool,
    pub have_state: bool,
}

/// Row count and year span of one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSummary {
    pub view: String,
    pub path: PathBuf,
    pub rows: usize,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
}

struct View {
    path: PathBuf,
    frame: LazyFrame,
}

pub struct DatasetCatalog {
    crop_district_year: View,
    crop_state_year: View,
    crop_state_totals: View,
    rain_india_year: Option<View>,
    rain_subdivision_year: Option<View>,
    rain_state_year: Option<View>,
}

impl DatasetCatalog {
    /// Open every view under `base`. Missing crop tables are an error;
    /// missing rainfall tables are reported through [`Self::capabilities`].
    pub fn open(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        if !base.is_dir() {
            return Err(PlannerError::Dataset(format!(
                "Clean data directory not found: {}",
                base.display()
            )));
        }

        let catalog = Self {
            crop_district_year: Self::open_required(base, CROP_DISTRICT_YEAR, CROP_MEASURES)?,
            crop_state_year: Self::open_required(base, CROP_STATE_YEAR, CROP_MEASURES)?,
            crop_state_totals: Self::open_required(base, CROP_STATE_TOTALS, CROP_MEASURES)?,
            rain_india_year: Self::open_optional(base, RAIN_INDIA_YEAR, RAIN_MEASURES)?,
            rain_subdivision_year: Self::open_optional(base, RAIN_SUBDIVISION_YEAR, RAIN_MEASURES)?,
            rain_state_year: Self::open_optional(base, RAIN_STATE_YEAR, RAIN_MEASURES)?,
        };

        let caps = catalog.capabilities();
        info!(
            "Opened datasets in {} (subdivision rainfall: {}, state rainfall: {})",
            base.display(),
            caps.have_subdivision,
            caps.have_state
        );
        Ok(catalog)
    }

    pub fn capabilities(&self) -> RainfallCapabilities {
        RainfallCapabilities {
            have_subdivision: self.rain_subdivision_year.is_some(),
            have_state: self.rain_state_year.is_some(),
        }
    }

    pub fn crop_district_year(&self) -> LazyFrame {
        self.crop_district_year.frame.clone()
    }

    pub fn crop_state_year(&self) -> LazyFrame {
        self.crop_state_year.frame.clone()
    }

    pub fn crop_state_totals(&self) -> LazyFrame {
        self.crop_state_totals.frame.clone()
    }

    pub fn rain_india_year(&self) -> Option<LazyFrame> {
        self.rain_india_year.as_ref().map(|v| v.frame.clone())
    }

    pub fn rain_subdivision_year(&self) -> Option<LazyFrame> {
        self.rain_subdivision_year.as_ref().map(|v| v.frame.clone())
    }

    pub fn rain_state_year(&self) -> Option<LazyFrame> {
        self.rain_state_year.as_ref().map(|v| v.frame.clone())
    }

    /// Row counts and year spans for every open view
    pub fn summary(&self) -> Result<Vec<ViewSummary>> {
        let views: [(&str, Option<&View>); 6] = [
            (CROP_DISTRICT_YEAR, Some(&self.crop_district_year)),
            (CROP_STATE_YEAR, Some(&self.crop_state_year)),
            (CROP_STATE_TOTALS, Some(&self.crop_state_totals)),
            (RAIN_INDIA_YEAR, self.rain_india_year.as_ref()),
            (RAIN_SUBDIVISION_YEAR, self.rain_subdivision_year.as_ref()),
            (RAIN_STATE_YEAR, self.rain_state_year.as_ref()),
        ];

        let mut summaries = Vec::new();
        for (name, view) in views {
            let Some(view) = view else { continue };
            let df = view.frame.clone().select([col("year")]).collect()?;
            let years: Vec<i64> = int_values(&df, "year")?.into_iter().flatten().collect();
            summaries.push(ViewSummary {
                view: name.to_string(),
                path: view.path.clone(),
                rows: df.height(),
                min_year: years.iter().min().copied(),
                max_year: years.iter().max().copied(),
            });
        }
        Ok(summaries)
    }

    fn locate(base: &Path, view: &str) -> Option<PathBuf> {
        ["parquet", "csv"]
            .iter()
            .map(|ext| base.join(format!("{}.{}", view, ext)))
            .find(|path| path.is_file())
    }

    fn open_required(base: &Path, view: &str, measures: &[&str]) -> Result<View> {
        Self::open_optional(base, view, measures)?.ok_or_else(|| {
            PlannerError::Dataset(format!(
                "Required table {} not found in {} (expected {}.parquet or {}.csv)",
                view,
                base.display(),
                view,
                view
            ))
        })
    }

    fn open_optional(base: &Path, view: &str, measures: &[&str]) -> Result<Option<View>> {
        let Some(path) = Self::locate(base, view) else {
            debug!("Optional table {} not present", view);
            return Ok(None);
        };
        let frame = Self::scan(&path)?;
        let mut casts = vec![col("year").cast(DataType::Int64)];
        casts.extend(measures.iter().map(|m| col(m).cast(DataType::Float64)));
        debug!("Registered view {} -> {}", view, path.display());
        Ok(Some(View {
            path,
            frame: frame.with_columns(casts),
        }))
    }

    fn scan(path: &Path) -> Result<LazyFrame> {
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            LazyCsvReader::new(path)
                .with_infer_schema_length(Some(1000))
                .finish()
                .map_err(|e| PlannerError::Dataset(format!("Failed to read CSV {}: {}", path.display(), e)))
        } else {
            LazyFrame::scan_parquet(path, ScanArgsParquet::default())
                .map_err(|e| PlannerError::Dataset(format!("Failed to scan parquet {}: {}", path.display(), e)))
        }
    }
}
