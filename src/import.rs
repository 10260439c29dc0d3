use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::db::Store;

#[derive(Debug, Default)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// One-shot bulk loader: reads a UTF-8 CSV with a `name` header column and
/// inserts one ingredient per row. Rows whose name is already taken are
/// logged and skipped; the import continues past them.
pub async fn import_ingredients_csv(store: &Store, path: &Path) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let name_index = headers
        .iter()
        .position(|h| h == "name")
        .context("CSV file has no 'name' column")?;

    let mut report = ImportReport::default();

    for record in reader.records() {
        let record = record?;
        let Some(name) = record.get(name_index) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        match store.create_ingredient(name, 0).await? {
            Some(_) => report.inserted += 1,
            None => {
                warn!("Ingredient '{}' already exists, skipping", name);
                report.skipped += 1;
            }
        }
    }

    info!(
        "Ingredient import finished: {} inserted, {} skipped",
        report.inserted, report.skipped
    );
    Ok(report)
}
