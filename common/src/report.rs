//! レポートのデータとレイアウト（描画系に依存しない部分）
//!
//! 座標はすべてmm、原点はページ左上。PDF描画側で左下原点に変換する。

use chrono::{DateTime, Local};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const SIDE_MARGIN_MM: f32 = 20.0;

pub const HEADER_HEIGHT_MM: f32 = 40.0;
/// ヘッダー帯の色 (66, 133, 244)
pub const HEADER_RGB: (u8, u8, u8) = (66, 133, 244);

pub const TITLE: &str = "PneumoScan Report";
pub const SUBTITLE: &str = "AI-Powered Pneumonia Detection";
pub const FOOTER: &str = "PneumoScan - AI Medical Imaging Analysis";

pub const IMAGE_SIZE_MM: f32 = 100.0;
pub const IMAGE_TOP_MM: f32 = 110.0;

pub const DISCLAIMER: &str = "DISCLAIMER: This report is for educational and research purposes only. It is NOT intended for clinical use or as a substitute for professional medical advice, diagnosis, or treatment. Always consult qualified healthcare professionals for medical decisions.";

/// 組み込みフォントの平均文字幅（em比）
const AVG_CHAR_WIDTH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 25.4 / 72.0;

/// レポート1件分の入力
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub prediction: String,
    pub confidence: f64,
    /// 元画像のData URI
    pub image_data: String,
    pub date: DateTime<Local>,
}

impl ReportData {
    /// 生成時刻（ミリ秒）から決まるファイル名
    pub fn file_name(&self) -> String {
        report_file_name(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// 配置済みの1行
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size_pt: f32,
    pub x_mm: f32,
    /// ベースラインの上端からの距離
    pub y_mm: f32,
    pub style: FontStyle,
    /// ヘッダー帯の上に白文字で描く
    pub inverted: bool,
}

/// 画像の配置（左上原点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSlot {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// 固定レイアウトの組版結果
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub lines: Vec<TextLine>,
    pub image: ImageSlot,
}

impl ReportLayout {
    pub fn build(data: &ReportData) -> Self {
        let mut lines = vec![
            centered(TITLE, 24.0, 20.0, FontStyle::Regular, true),
            centered(SUBTITLE, 12.0, 30.0, FontStyle::Regular, true),
            left(
                format!("Generated: {}", format_timestamp(&data.date)),
                10.0,
                55.0,
                FontStyle::Regular,
            ),
            left("Analysis Results".to_string(), 16.0, 70.0, FontStyle::Bold),
            left(
                format!("Prediction: {}", data.prediction),
                12.0,
                85.0,
                FontStyle::Regular,
            ),
            left(
                format!("Confidence: {}", format_confidence(data.confidence)),
                12.0,
                95.0,
                FontStyle::Regular,
            ),
        ];

        let disclaimer_width = PAGE_WIDTH_MM - SIDE_MARGIN_MM * 2.0;
        let line_height = 10.0 * PT_TO_MM * 1.15;
        for (i, text) in wrap_text(DISCLAIMER, 10.0, disclaimer_width).into_iter().enumerate() {
            lines.push(left(text, 10.0, 225.0 + i as f32 * line_height, FontStyle::Italic));
        }

        lines.push(centered(FOOTER, 8.0, 280.0, FontStyle::Regular, false));

        Self {
            lines,
            image: ImageSlot {
                x_mm: (PAGE_WIDTH_MM - IMAGE_SIZE_MM) / 2.0,
                y_mm: IMAGE_TOP_MM,
                width_mm: IMAGE_SIZE_MM,
                height_mm: IMAGE_SIZE_MM,
            },
        }
    }
}

fn left(text: String, size_pt: f32, y_mm: f32, style: FontStyle) -> TextLine {
    TextLine {
        text,
        size_pt,
        x_mm: SIDE_MARGIN_MM,
        y_mm,
        style,
        inverted: false,
    }
}

fn centered(text: &str, size_pt: f32, y_mm: f32, style: FontStyle, inverted: bool) -> TextLine {
    let width = approx_text_width_mm(text, size_pt);
    TextLine {
        text: text.to_string(),
        size_pt,
        x_mm: ((PAGE_WIDTH_MM - width) / 2.0).max(0.0),
        y_mm,
        style,
        inverted,
    }
}

/// 組み込みフォントの概算幅（mm）
pub fn approx_text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * AVG_CHAR_WIDTH_EM * PT_TO_MM
}

/// 単語単位で折り返す
pub fn wrap_text(text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if approx_text_width_mm(&candidate, size_pt) > max_width_mm && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 0.8734 → "87.34%"
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// 0.8734 → "87%"（履歴一覧用）
pub fn format_confidence_rounded(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

pub fn format_timestamp(date: &DateTime<Local>) -> String {
    date.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// ISO-8601の記録日時を表示用に変換。解釈できなければそのまま返す。
pub fn format_record_date(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(date) => format_timestamp(&date.with_timezone(&Local)),
        Err(_) => iso.to_string(),
    }
}

pub fn report_file_name(date: &DateTime<Local>) -> String {
    format!("pneumoscan-report-{}.pdf", date.timestamp_millis())
}

pub fn csv_file_name(date: &DateTime<Local>) -> String {
    format!("pneumoscan-data-{}.csv", date.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ReportData {
        ReportData {
            prediction: "Bacterial Pneumonia".into(),
            confidence: 0.87,
            image_data: "data:image/png;base64,AAAA".into(),
            date: Local.timestamp_millis_opt(1_700_000_000_123).unwrap(),
        }
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.87), "87.00%");
        assert_eq!(format_confidence(0.12345), "12.35%");
        assert_eq!(format_confidence(1.0), "100.00%");
        assert_eq!(format_confidence_rounded(0.876), "88%");
    }

    #[test]
    fn test_file_name_is_derived_from_instant() {
        assert_eq!(sample().file_name(), "pneumoscan-report-1700000000123.pdf");
        assert_eq!(
            csv_file_name(&sample().date),
            "pneumoscan-data-1700000000123.csv"
        );
    }

    #[test]
    fn test_layout_contains_fixed_sections() {
        let layout = ReportLayout::build(&sample());
        let texts: Vec<&str> = layout.lines.iter().map(|l| l.text.as_str()).collect();

        assert_eq!(texts[0], TITLE);
        assert!(texts.iter().any(|t| t.starts_with("Generated: ")));
        assert!(texts.contains(&"Prediction: Bacterial Pneumonia"));
        assert!(texts.contains(&"Confidence: 87.00%"));
        assert!(texts.iter().any(|t| t.starts_with("DISCLAIMER:")));
        assert_eq!(*texts.last().unwrap(), FOOTER);
        assert_eq!(layout.image.width_mm, IMAGE_SIZE_MM);
        assert_eq!(layout.image.x_mm, 55.0);
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text(DISCLAIMER, 10.0, 170.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(approx_text_width_mm(line, 10.0) <= 170.0);
        }
        assert_eq!(lines.join(" "), DISCLAIMER);
    }

    #[test]
    fn test_format_record_date_passthrough_on_garbage() {
        assert_eq!(format_record_date("yesterday"), "yesterday");
        assert!(format_record_date("2026-01-01T00:00:00.000Z").starts_with("20"));
    }
}
