//! 履歴からの集計（ダッシュボード用）
//!
//! 読み取り専用の射影。毎回履歴から計算し直し、キャッシュしない。

use crate::diagnosis::DiagnosisBucket;
use crate::types::HistoryRecord;

/// 直近スキャン表の件数
pub const RECENT_LIMIT: usize = 10;

/// 信頼度の帯（パーセント、上限を含む）
pub const CONFIDENCE_BANDS: [ConfidenceBand; 5] = [
    ConfidenceBand { label: "0-20%", upper: 20.0 },
    ConfidenceBand { label: "21-40%", upper: 40.0 },
    ConfidenceBand { label: "41-60%", upper: 60.0 },
    ConfidenceBand { label: "61-80%", upper: 80.0 },
    ConfidenceBand { label: "81-100%", upper: 100.0 },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBand {
    pub label: &'static str,
    pub upper: f64,
}

/// 信頼度(0.0〜1.0)を帯のインデックスに変換
///
/// 0%未満は先頭、100%超は末尾に入る。NaNは0%扱い。
pub fn band_index(confidence: f64) -> usize {
    let percent = if confidence.is_nan() { 0.0 } else { confidence * 100.0 };
    CONFIDENCE_BANDS
        .iter()
        .position(|band| percent <= band.upper)
        .unwrap_or(CONFIDENCE_BANDS.len() - 1)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosisCounts {
    pub normal: usize,
    pub viral: usize,
    pub bacterial: usize,
    /// Uncertain / Unknown
    pub unclassified: usize,
}

impl DiagnosisCounts {
    pub fn get(&self, bucket: DiagnosisBucket) -> usize {
        match bucket {
            DiagnosisBucket::Normal => self.normal,
            DiagnosisBucket::Viral => self.viral,
            DiagnosisBucket::Bacterial => self.bacterial,
        }
    }

    pub fn pneumonia(&self) -> usize {
        self.viral + self.bacterial
    }

    pub fn classified(&self) -> usize {
        self.normal + self.viral + self.bacterial
    }

    /// 3分類内での割合（%）
    pub fn share_percent(&self, bucket: DiagnosisBucket) -> f64 {
        let classified = self.classified();
        if classified == 0 {
            return 0.0;
        }
        self.get(bucket) as f64 * 100.0 / classified as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analytics {
    pub total: usize,
    pub diagnosis: DiagnosisCounts,
    pub band_counts: [usize; 5],
    pub average_confidence: Option<f64>,
    pub recent: Vec<HistoryRecord>,
}

impl Analytics {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut diagnosis = DiagnosisCounts::default();
        let mut band_counts = [0usize; 5];
        let mut confidence_sum = 0.0;

        for record in records {
            match record.result.diagnosis().bucket() {
                Some(DiagnosisBucket::Normal) => diagnosis.normal += 1,
                Some(DiagnosisBucket::Viral) => diagnosis.viral += 1,
                Some(DiagnosisBucket::Bacterial) => diagnosis.bacterial += 1,
                None => diagnosis.unclassified += 1,
            }
            band_counts[band_index(record.result.confidence)] += 1;
            confidence_sum += record.result.confidence;
        }

        let average_confidence = if records.is_empty() {
            None
        } else {
            Some(confidence_sum / records.len() as f64)
        };

        Self {
            total: records.len(),
            diagnosis,
            band_counts,
            average_confidence,
            recent: records.iter().take(RECENT_LIMIT).cloned().collect(),
        }
    }

    /// (帯ラベル, 件数) の一覧
    pub fn bands(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        CONFIDENCE_BANDS
            .iter()
            .zip(self.band_counts.iter())
            .map(|(band, count)| (band.label, *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PredictionResult;

    fn record(prediction: &str, confidence: f64) -> HistoryRecord {
        HistoryRecord::new(
            PredictionResult {
                prediction: prediction.into(),
                confidence,
                ..Default::default()
            },
            "2026-01-01T00:00:00.000Z".into(),
            String::new(),
        )
    }

    #[test]
    fn test_band_boundaries_are_upper_inclusive() {
        assert_eq!(band_index(0.0), 0);
        assert_eq!(band_index(0.20), 0);
        assert_eq!(band_index(0.2001), 1);
        assert_eq!(band_index(0.40), 1);
        assert_eq!(band_index(0.41), 2);
        assert_eq!(band_index(0.60), 2);
        assert_eq!(band_index(0.80), 3);
        assert_eq!(band_index(0.81), 4);
        assert_eq!(band_index(1.0), 4);
    }

    #[test]
    fn test_bands_are_exhaustive() {
        for step in 0..=1000 {
            let confidence = step as f64 / 1000.0;
            assert!(band_index(confidence) < CONFIDENCE_BANDS.len());
        }
        assert_eq!(band_index(-0.5), 0);
        assert_eq!(band_index(1.5), 4);
        assert_eq!(band_index(f64::NAN), 0);
    }

    #[test]
    fn test_empty_history() {
        let analytics = Analytics::from_records(&[]);
        assert_eq!(analytics.total, 0);
        assert_eq!(analytics.average_confidence, None);
        assert_eq!(analytics.band_counts, [0; 5]);
        assert_eq!(analytics.diagnosis.share_percent(DiagnosisBucket::Normal), 0.0);
    }

    #[test]
    fn test_counts_and_bands() {
        let records = vec![
            record("Normal", 0.95),
            record("Viral Pneumonia", 0.55),
            record("Bacterial Pneumonia", 0.87),
            record("BACTERIAL", 0.10),
            record("Uncertain", 0.30),
        ];
        let analytics = Analytics::from_records(&records);

        assert_eq!(analytics.total, 5);
        assert_eq!(analytics.diagnosis.normal, 1);
        assert_eq!(analytics.diagnosis.viral, 1);
        assert_eq!(analytics.diagnosis.bacterial, 2);
        assert_eq!(analytics.diagnosis.unclassified, 1);
        assert_eq!(analytics.diagnosis.pneumonia(), 3);
        assert_eq!(analytics.band_counts, [1, 1, 1, 0, 2]);
        assert_eq!(analytics.band_counts.iter().sum::<usize>(), analytics.total);
        assert_eq!(analytics.diagnosis.share_percent(DiagnosisBucket::Bacterial), 50.0);
    }

    #[test]
    fn test_recent_is_capped() {
        let records: Vec<_> = (0..15).map(|i| record(&format!("Normal {}", i), 0.5)).collect();
        let analytics = Analytics::from_records(&records);
        assert_eq!(analytics.recent.len(), RECENT_LIMIT);
        assert_eq!(analytics.recent[0].result.prediction, "Normal 0");
    }
}
