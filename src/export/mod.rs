pub mod pdf;
pub mod csv;

use crate::error::{PneumoScanError, Result};
use pneumoscan_common::data_uri;
use pneumoscan_common::report::ReportData;
use pneumoscan_common::HistoryRecord;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// 履歴レコードからレポートを作り直す（サムネイルを画像として使う）
pub fn report_from_record(record: &HistoryRecord, now: DateTime<Local>) -> ReportData {
    ReportData {
        prediction: record.result.prediction.clone(),
        confidence: record.result.confidence,
        image_data: record.thumbnail.clone(),
        date: now,
    }
}

/// ヒートマップ（Base64 JPEG）をファイルに書き出す
pub fn write_heatmap(heatmap: &str, output: &Path) -> Result<PathBuf> {
    let bytes = data_uri::decode_base64(heatmap)
        .ok_or_else(|| PneumoScanError::InvalidImage("heatmap is not valid base64".into()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, bytes)?;
    Ok(output.to_path_buf())
}
