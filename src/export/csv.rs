//! 履歴のCSV出力
//!
//! 列: Date, Prediction, Confidence（小数2桁の%表記）

use crate::error::Result;
use pneumoscan_common::report::{csv_file_name, format_confidence, format_record_date};
use pneumoscan_common::HistoryRecord;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: [&str; 3] = ["Date", "Prediction", "Confidence"];

/// 任意の出力先にCSVを書く
pub fn write_history_csv<W: Write>(records: &[HistoryRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for record in records {
        csv_writer.write_record([
            format_record_date(&record.date),
            record.result.prediction.clone(),
            format_confidence(record.result.confidence),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// 出力先ディレクトリに `pneumoscan-data-<ms>.csv` を作る
pub fn export_history_csv(
    records: &[HistoryRecord],
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(csv_file_name(&now));
    let file = std::fs::File::create(&path)?;
    write_history_csv(records, std::io::BufWriter::new(file))?;
    Ok(path)
}
