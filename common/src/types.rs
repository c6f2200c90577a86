//! スキャン結果の型定義
//!
//! CLIとコアで共有される型:
//! - ImageFile: 選択された画像（バイト列 + MIMEタイプ）
//! - PredictionResult: 推論サーバーの応答
//! - HistoryRecord: 履歴に保存される1件分の結果

use crate::data_uri;
use crate::diagnosis::Diagnosis;
use serde::{Deserialize, Deserializer, Serialize};

/// 選択された画像ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Data URIに再エンコード（プレビュー・サムネイル用）
    pub fn to_data_uri(&self) -> String {
        data_uri::encode(&self.mime_type, &self.bytes)
    }
}

/// 推論サーバーの応答
///
/// `prediction` は自由文字列として扱い、分類は `Diagnosis::classify` で行う。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: String,

    /// 0.0〜1.0（範囲チェックはしない）
    #[serde(default, deserialize_with = "nullable_confidence")]
    pub confidence: f64,

    /// Base64エンコードされたJPEGヒートマップ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<String>,

    /// X線画像でないと判定された場合などのサーバーからの補足
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictionResult {
    pub fn diagnosis(&self) -> Diagnosis {
        Diagnosis::classify(&self.prediction)
    }
}

/// 履歴レコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub result: PredictionResult,

    /// 記録日時（ISO-8601）
    pub date: String,

    /// 元画像のData URI
    #[serde(default)]
    pub thumbnail: String,
}

impl HistoryRecord {
    pub fn new(result: PredictionResult, date: String, thumbnail: String) -> Self {
        Self {
            result,
            date,
            thumbnail,
        }
    }
}

/// `confidence: null` を 0.0 として読む
fn nullable_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_parses_full_payload() {
        let json = r#"{"prediction":"Bacterial Pneumonia","confidence":0.87,"heatmap":"abc","probabilities":[0.1,0.87,0.03]}"#;
        let result: PredictionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.prediction, "Bacterial Pneumonia");
        assert_eq!(result.confidence, 0.87);
        assert_eq!(result.heatmap.as_deref(), Some("abc"));
        assert_eq!(result.diagnosis(), Diagnosis::BacterialPneumonia);
    }

    #[test]
    fn test_prediction_null_confidence_reads_as_zero() {
        let json = r#"{"message":"The uploaded image does not look like a chest X-ray.","prediction":"Unknown","confidence":null}"#;
        let result: PredictionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.confidence, 0.0);
        assert!(result.heatmap.is_none());
        assert!(result.message.is_some());
    }

    #[test]
    fn test_prediction_missing_label_is_rejected() {
        let json = r#"{"confidence":0.5}"#;
        assert!(serde_json::from_str::<PredictionResult>(json).is_err());
    }

    #[test]
    fn test_history_record_flattens_prediction_fields() {
        let record = HistoryRecord::new(
            PredictionResult {
                prediction: "Normal".into(),
                confidence: 0.5,
                ..Default::default()
            },
            "2026-01-01T00:00:00Z".into(),
            "data:image/png;base64,AA==".into(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["prediction"], "Normal");
        assert_eq!(value["confidence"], 0.5);
        assert_eq!(value["date"], "2026-01-01T00:00:00Z");
        assert!(value.get("heatmap").is_none());
    }

    #[test]
    fn test_image_file_data_uri() {
        let file = ImageFile::new("a.png", "image/png", vec![0, 1, 2]);
        assert_eq!(file.to_data_uri(), "data:image/png;base64,AAEC");
    }
}
