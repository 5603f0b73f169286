use crate::models::{Category, ListingRecord};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Export one category's accumulated table to `<dir>/<table>.csv`,
/// overwriting any previous export.
pub fn export_category_csv(
    dir: &Path,
    category: Category,
    records: &[ListingRecord],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let path = dir.join(format!("{}.csv", category.table()));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    println!("exported {} records to {}", records.len(), path.display());
    Ok(path)
}
