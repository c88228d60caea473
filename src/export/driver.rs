use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info};

use crate::api::FitnessApi;
use crate::config::export::{ExportConfig, TimeWindow};
use crate::export::listing::{data_source_entries, data_source_id, describe};
use crate::sinks::json_file::JsonFileSink;

const LISTING_FILE: &str = "datasources";

/// What a run produced. Failed sources are identified by name only,
/// their errors have already been logged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub listing: Option<PathBuf>,
    pub datasets: Vec<PathBuf>,
    pub failed: Vec<String>,
}

/// Lists the data sources once, then fetches and saves one dataset per source.
pub struct Exporter<'a, A> {
    api: &'a A,
    sink: JsonFileSink,
    data_type: String,
    window: TimeWindow,
}

impl<'a, A: FitnessApi> Exporter<'a, A> {
    pub fn new(config: &ExportConfig, api: &'a A) -> Self {
        Self {
            api,
            sink: JsonFileSink::new(&config.paths.exports_dir),
            data_type: config.data_type.clone(),
            window: config.window,
        }
    }

    /// Listing failures abort the run; per-source failures are logged and skipped.
    pub async fn run(&self) -> Result<ExportReport> {
        info!(data_type = %self.data_type, "listing data sources");
        let listing = self
            .api
            .list_data_sources(&self.data_type)
            .await
            .context("listing data sources failed")?;

        let mut report = ExportReport {
            listing: Some(self.sink.save(LISTING_FILE, &listing).await?),
            ..ExportReport::default()
        };

        for (index, entry) in data_source_entries(&listing).iter().enumerate() {
            match self.export_dataset(index, entry).await {
                Ok(path) => report.datasets.push(path),
                Err(e) => {
                    let data_source = describe(entry);
                    error!(data_source = %data_source, error = %format!("{:#}", e), "Error at {}", data_source);
                    report.failed.push(data_source);
                }
            }
        }

        Ok(report)
    }

    async fn export_dataset(&self, index: usize, entry: &Value) -> Result<PathBuf> {
        let id = data_source_id(entry)?;
        info!(data_source = %id, index, "fetching dataset {}", self.window.dataset_id());
        let dataset = self.api.get_dataset(id, &self.window).await?;
        self.sink.save(&format!("dataset{}", index), &dataset).await
    }
}
