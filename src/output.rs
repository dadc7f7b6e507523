// src/output.rs

use crate::error::ReportError;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Filename suggested to the browser for every download.
pub const DOWNLOAD_FILENAME: &str = "plastic_bale_report.pdf";

/// A fresh `report_<hex>.pdf` name.
pub fn report_filename() -> String {
    format!("report_{}.pdf", Uuid::new_v4().simple())
}

/// Write a rendered report into `dir` under a unique name. Old reports are
/// never removed.
pub async fn write_report(dir: &Path, bytes: &[u8]) -> Result<PathBuf, ReportError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(report_filename());
    tokio::fs::write(&path, bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "Report written");
    Ok(path)
}
