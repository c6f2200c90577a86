//! 診断ラベルの分類
//!
//! サーバーは自由文字列を返すため、キーワードの部分一致（大文字小文字無視）で分類する。
//! どれにも当たらなければ `Unknown` に落とす。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 分類キーワード（上から順に判定）
const KEYWORDS: &[(&str, Diagnosis)] = &[
    ("uncertain", Diagnosis::Uncertain),
    ("unknown", Diagnosis::Unknown),
    ("normal", Diagnosis::Normal),
    ("viral", Diagnosis::ViralPneumonia),
    ("bacterial", Diagnosis::BacterialPneumonia),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    Normal,
    ViralPneumonia,
    BacterialPneumonia,
    Uncertain,
    Unknown,
}

impl Diagnosis {
    pub fn classify(prediction: &str) -> Self {
        let lower = prediction.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, diagnosis)| *diagnosis)
            .unwrap_or(Diagnosis::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Diagnosis::Normal => "Normal",
            Diagnosis::ViralPneumonia => "Viral Pneumonia",
            Diagnosis::BacterialPneumonia => "Bacterial Pneumonia",
            Diagnosis::Uncertain => "Uncertain",
            Diagnosis::Unknown => "Unknown",
        }
    }

    /// ダッシュボードの3分類。不確実・不明はどこにも入れない。
    pub fn bucket(&self) -> Option<DiagnosisBucket> {
        match self {
            Diagnosis::Normal => Some(DiagnosisBucket::Normal),
            Diagnosis::ViralPneumonia => Some(DiagnosisBucket::Viral),
            Diagnosis::BacterialPneumonia => Some(DiagnosisBucket::Bacterial),
            Diagnosis::Uncertain | Diagnosis::Unknown => None,
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosisBucket {
    Normal,
    Viral,
    Bacterial,
}

impl DiagnosisBucket {
    pub const ALL: [DiagnosisBucket; 3] = [
        DiagnosisBucket::Normal,
        DiagnosisBucket::Viral,
        DiagnosisBucket::Bacterial,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DiagnosisBucket::Normal => "Normal",
            DiagnosisBucket::Viral => "Viral",
            DiagnosisBucket::Bacterial => "Bacterial",
        }
    }
}

/// 信頼度アラート
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    /// 60%未満
    Low,
    Moderate,
    /// 90%超
    High,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        let percent = confidence * 100.0;
        if percent < 60.0 {
            ConfidenceLevel::Low
        } else if percent > 90.0 {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Moderate
        }
    }

    /// アラート文言（タイトル, 説明）。Moderateは表示しない。
    pub fn alert(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ConfidenceLevel::Low => Some((
                "Low Confidence",
                "Please upload a clearer X-ray for more accurate results.",
            )),
            ConfidenceLevel::High => Some((
                "High Confidence",
                "The model is highly confident in this prediction!",
            )),
            ConfidenceLevel::Moderate => None,
        }
    }
}
