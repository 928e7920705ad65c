use polars::prelude::*;
use samarth::datasets::{
    CROP_DISTRICT_YEAR, CROP_STATE_TOTALS, CROP_STATE_YEAR, RAIN_INDIA_YEAR, RAIN_STATE_YEAR,
    RAIN_SUBDIVISION_YEAR,
};
use samarth::{Planner, PlannerConfig};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MANIFEST: &str = r#"[
    {
        "id": "crop_district",
        "title": "District-wise Crop Production",
        "catalog_url": "https://data.gov.in/catalog/district-wise-crop-production",
        "resource_id": "res-crop-district",
        "license": "GODL"
    },
    {
        "id": "imd_rainfall",
        "title": "Sub-divisional Rainfall",
        "url": "https://data.gov.in/catalog/rainfall",
        "resource_id": "res-imd"
    },
    "stray text",
    {"id": "unused", "title": "Not cited"}
]"#;

/// Cleaned tables written as parquet into a temporary directory
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Crop tables, India rainfall and subdivision rainfall. No state
    /// rainfall table.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let base = dir.path();

        write_parquet(base, CROP_DISTRICT_YEAR, crop_district_year()?)?;
        write_parquet(base, CROP_STATE_YEAR, crop_state_year()?)?;
        write_parquet(base, CROP_STATE_TOTALS, crop_state_totals()?)?;
        write_parquet(base, RAIN_INDIA_YEAR, rain_india_year()?)?;
        write_parquet(base, RAIN_SUBDIVISION_YEAR, rain_subdivision_year()?)?;
        std::fs::write(base.join("manifest.json"), MANIFEST)?;

        Ok(Self { dir })
    }

    pub fn clean_dir(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join("manifest.json")
    }

    pub fn planner(&self) -> Planner {
        Planner::new(PlannerConfig::new(self.clean_dir(), self.manifest_path()))
    }

    /// Tamil Nadu only, so Karnataka still has to be synthesized
    pub fn add_state_rainfall(&self) -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "state" => &["Tamil Nadu", "Tamil Nadu"],
            "year" => &[2018i64, 2019],
            "annual_mm" => &[1200.0, 1000.0]
        )?;
        write_parquet(self.dir.path(), RAIN_STATE_YEAR, df)
    }

    pub fn remove_view(&self, view: &str) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::remove_file(self.dir.path().join(format!("{}.parquet", view)))?;
        Ok(())
    }
}

fn write_parquet(base: &Path, view: &str, mut df: DataFrame) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(base.join(format!("{}.parquet", view)))?;
    ParquetWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

fn crop_district_year() -> PolarsResult<DataFrame> {
    // Maharashtra 2014 sugarcane: Solapur has two rows summing to 600.
    // Karnataka sugarcane only exists in 2011.
    // Karnataka 2015 rice is split between "Rice" and "Paddy" labels.
    // Tamil Nadu rice only exists in 2013.
    df!(
        "state" => &[
            "Maharashtra", "Maharashtra", "Maharashtra", "Maharashtra",
            "Karnataka", "Karnataka",
            "Karnataka", "Karnataka", "Karnataka",
            "Tamil Nadu", "Tamil Nadu",
        ],
        "district" => &[
            "Solapur", "Solapur", "Kolhapur", "Pune",
            "Belagavi", "Mandya",
            "Raichur", "Raichur", "Shimoga",
            "Thanjavur", "Nilgiris",
        ],
        "year" => &[2014i64, 2014, 2014, 2014, 2011, 2011, 2015, 2015, 2015, 2013, 2013],
        "crop" => &[
            "Sugarcane", "Sugarcane", "Sugarcane", "Sugarcane",
            "Sugarcane", "Sugarcane",
            "Rice", "Paddy", "Paddy",
            "Rice", "Rice",
        ],
        "area_ha" => &[10.0, 8.0, 12.0, 9.0, 20.0, 15.0, 40.0, 5.0, 10.0, 60.0, 1.0],
        "production_tonnes" => &[350.0, 250.0, 500.0, 300.0, 900.0, 700.0, 400.0, 50.0, 100.0, 800.0, 5.0]
    )
}

fn crop_state_year() -> PolarsResult<DataFrame> {
    // Latest year overall is 2019 (Maharashtra); Kerala stops at 2017.
    // Maharashtra jute has no recorded production in 2018.
    df!(
        "state" => &[
            "Maharashtra", "Maharashtra", "Maharashtra", "Maharashtra",
            "Kerala", "Kerala", "Kerala", "Kerala", "Kerala", "Kerala", "Kerala",
            "Karnataka", "Karnataka", "Karnataka", "Karnataka",
            "Tamil Nadu", "Tamil Nadu", "Tamil Nadu",
        ],
        "year" => &[
            2019i64, 2016, 2017, 2018,
            2017, 2017, 2017, 2017, 2017, 2017, 2016,
            2016, 2016, 2017, 2017,
            2017, 2018, 2018,
        ],
        "crop" => &[
            "Sugarcane", "Jute", "Jute", "Jute",
            "Coconut", "Tapioca", "Banana", "Rubber", "Rice", "Pepper", "Coconut",
            "Rice", "Ragi", "Rice", "Maize",
            "Sugarcane", "Rice", "Sugarcane",
        ],
        "production_tonnes" => &[
            Some(1000.0), Some(100.0), Some(300.0), None,
            Some(5000.0), Some(2000.0), Some(800.0), Some(700.0), Some(500.0), Some(50.0), Some(4000.0),
            Some(300.0), Some(200.0), Some(300.0), Some(50.0),
            Some(900.0), Some(700.0), Some(100.0),
        ]
    )
}

fn crop_state_totals() -> PolarsResult<DataFrame> {
    df!(
        "state" => &["Kerala", "Karnataka"],
        "year" => &[2017i64, 2017],
        "production_tonnes" => &[9050.0, 350.0]
    )
}

fn rain_india_year() -> PolarsResult<DataFrame> {
    df!(
        "year" => &[2016i64, 2017, 2018],
        "annual_mm" => &[1000.0, 1200.0, 900.0]
    )
}

fn rain_subdivision_year() -> PolarsResult<DataFrame> {
    let mut subdivisions = Vec::new();
    let mut years = Vec::new();
    let mut rain = Vec::new();
    for year in 2015i64..=2019 {
        for (subdivision, mm) in [
            ("Coastal Karnataka", 3000.0),
            ("North Interior Karnataka", 700.0),
            ("South Interior Karnataka", 1100.0),
            ("Tamil Nadu", 900.0 + 50.0 * (year - 2015) as f64),
        ] {
            subdivisions.push(subdivision);
            years.push(year);
            rain.push(mm);
        }
    }
    // Outside every five-year window ending in 2019
    subdivisions.push("Coastal Karnataka");
    years.push(2014);
    rain.push(9999.0);

    df!(
        "subdivision" => subdivisions,
        "year" => years,
        "annual_mm" => rain
    )
}
