//! Citation assembly from the provenance manifest.

use crate::answer::Citation;
use crate::manifest::Manifest;

/// District-wise crop production source
pub const CROP_DISTRICT_DATASET: &str = "crop_district";
/// IMD rainfall source
pub const RAINFALL_DATASET: &str = "imd_rainfall";

/// Datasets every answer draws on, in citation order
pub const CITED_DATASETS: [&str; 2] = [CROP_DISTRICT_DATASET, RAINFALL_DATASET];

/// Citations for the datasets present in the manifest. Absent fields render
/// as empty strings; absent datasets are left out.
pub fn cite(manifest: &Manifest) -> Vec<Citation> {
    CITED_DATASETS
        .iter()
        .filter_map(|id| {
            let entry = manifest.get(id)?;
            Some(Citation {
                dataset_id: id.to_string(),
                title: entry.title.clone().unwrap_or_default(),
                catalog_url: entry.catalog_link().unwrap_or_default().to_string(),
                resource_id: entry.resource_id.clone().unwrap_or_default(),
            })
        })
        .collect()
}
