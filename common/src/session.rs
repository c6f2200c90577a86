//! スキャンセッションの状態機械
//!
//! 1画像ずつの直線的なワークフロー:
//! ファイル選択(1) → 解析中(2) → 結果表示(3) → レポート生成(4)
//!
//! 状態ごとに持てるデータを列挙型で固定し、「結果があるのにステップ1」のような
//! 不正状態を作れないようにしている。非同期処理（プレビュー生成・推論）は
//! チケットに世代番号を持たせ、完了時に現在の世代と一致しなければ破棄する。

use crate::error::AnalysisFailed;
use crate::history::ScanHistory;
use crate::report::ReportData;
use crate::types::{HistoryRecord, ImageFile, PredictionResult};
use chrono::{DateTime, Local, SecondsFormat, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    SelectFile = 1,
    Analyzing = 2,
    ResultShown = 3,
    ReportGenerated = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::SelectFile => "Upload",
            Step::Analyzing => "Analyze",
            Step::ResultShown => "Results",
            Step::ReportGenerated => "Report",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    FileSelected {
        file: ImageFile,
        preview: Option<String>,
    },
    Analyzing {
        file: ImageFile,
        preview: Option<String>,
    },
    ResultShown {
        file: ImageFile,
        preview: Option<String>,
        result: PredictionResult,
    },
    ReportGenerated {
        file: ImageFile,
        preview: Option<String>,
        result: PredictionResult,
        reports: u32,
    },
}

/// プレビュー生成の完了を受け取るためのチケット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket {
    generation: u64,
}

/// 推論呼び出しの完了を受け取るためのチケット
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    generation: u64,
    file: ImageFile,
}

impl AnalysisTicket {
    pub fn file(&self) -> &ImageFile {
        &self.file
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// 結果を保存してステップ3へ
    Completed(PredictionResult),
    /// ステップ1へ戻った
    Failed,
    /// リセット・再選択後に届いた古い応答
    Discarded,
}

#[derive(Debug, Default)]
pub struct ScanSession {
    state: SessionState,
    generation: u64,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn step(&self) -> Step {
        match self.state {
            SessionState::Idle | SessionState::FileSelected { .. } => Step::SelectFile,
            SessionState::Analyzing { .. } => Step::Analyzing,
            SessionState::ResultShown { .. } => Step::ResultShown,
            SessionState::ReportGenerated { .. } => Step::ReportGenerated,
        }
    }

    pub fn selected_file(&self) -> Option<&ImageFile> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::FileSelected { file, .. }
            | SessionState::Analyzing { file, .. }
            | SessionState::ResultShown { file, .. }
            | SessionState::ReportGenerated { file, .. } => Some(file),
        }
    }

    pub fn preview(&self) -> Option<&str> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::FileSelected { preview, .. }
            | SessionState::Analyzing { preview, .. }
            | SessionState::ResultShown { preview, .. }
            | SessionState::ReportGenerated { preview, .. } => preview.as_deref(),
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state {
            SessionState::ResultShown { result, .. }
            | SessionState::ReportGenerated { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn report_count(&self) -> u32 {
        match self.state {
            SessionState::ReportGenerated { reports, .. } => reports,
            _ => 0,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SessionState::Analyzing { .. })
    }

    /// ファイルを選択（どの状態からでも可）。以前の結果は捨てる。
    pub fn select_file(&mut self, file: ImageFile) -> PreviewTicket {
        self.generation += 1;
        self.state = SessionState::FileSelected {
            file,
            preview: None,
        };
        PreviewTicket {
            generation: self.generation,
        }
    }

    /// プレビューを反映。古い選択に対するものなら false。
    pub fn attach_preview(&mut self, ticket: PreviewTicket, data_uri: String) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("discarding preview for a stale selection");
            return false;
        }
        match &mut self.state {
            SessionState::Idle => false,
            SessionState::FileSelected { preview, .. }
            | SessionState::Analyzing { preview, .. }
            | SessionState::ResultShown { preview, .. }
            | SessionState::ReportGenerated { preview, .. } => {
                *preview = Some(data_uri);
                true
            }
        }
    }

    /// 解析開始。ファイル選択済みのステップ1以外では何もしない（二重送信もここで止まる）。
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        match std::mem::take(&mut self.state) {
            SessionState::FileSelected { file, preview } => {
                let ticket = AnalysisTicket {
                    generation: self.generation,
                    file: file.clone(),
                };
                self.state = SessionState::Analyzing { file, preview };
                Some(ticket)
            }
            other => {
                if matches!(other, SessionState::Analyzing { .. }) {
                    tracing::debug!("analysis already in flight, ignoring");
                }
                self.state = other;
                None
            }
        }
    }

    /// 推論結果を反映する。成功時は履歴追加を済ませてからステップ3へ進む。
    pub fn finish_analysis<H: ScanHistory + ?Sized>(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<PredictionResult, AnalysisFailed>,
        history: &mut H,
        recorded_at: DateTime<Utc>,
    ) -> AnalysisOutcome {
        if ticket.generation != self.generation || !self.is_analyzing() {
            tracing::warn!("inference response arrived after the session moved on, discarding");
            return AnalysisOutcome::Discarded;
        }

        let (file, preview) = match std::mem::take(&mut self.state) {
            SessionState::Analyzing { file, preview } => (file, preview),
            other => {
                self.state = other;
                return AnalysisOutcome::Discarded;
            }
        };

        match outcome {
            Ok(result) => {
                let thumbnail = preview.clone().unwrap_or_else(|| file.to_data_uri());
                history.append(HistoryRecord::new(
                    result.clone(),
                    recorded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                    thumbnail,
                ));
                self.state = SessionState::ResultShown {
                    file,
                    preview,
                    result: result.clone(),
                };
                AnalysisOutcome::Completed(result)
            }
            Err(AnalysisFailed) => {
                self.state = SessionState::FileSelected { file, preview };
                AnalysisOutcome::Failed
            }
        }
    }

    /// レポート用データを作る（状態は変えない）。ステップ3・4でのみ有効。
    pub fn report_data(&self, now: DateTime<Local>) -> Option<ReportData> {
        let (file, preview, result) = match &self.state {
            SessionState::ResultShown {
                file,
                preview,
                result,
            }
            | SessionState::ReportGenerated {
                file,
                preview,
                result,
                ..
            } => (file, preview, result),
            _ => return None,
        };

        let image_data = preview.clone().unwrap_or_else(|| file.to_data_uri());
        Some(ReportData {
            prediction: result.prediction.clone(),
            confidence: result.confidence,
            image_data,
            date: now,
        })
    }

    /// レポートの出力が済んだことを記録してステップ4へ
    pub fn mark_report_generated(&mut self) -> bool {
        let (file, preview, result, reports) = match std::mem::take(&mut self.state) {
            SessionState::ResultShown {
                file,
                preview,
                result,
            } => (file, preview, result, 0),
            SessionState::ReportGenerated {
                file,
                preview,
                result,
                reports,
            } => (file, preview, result, reports),
            other => {
                self.state = other;
                return false;
            }
        };

        self.state = SessionState::ReportGenerated {
            file,
            preview,
            result,
            reports: reports + 1,
        };
        true
    }

    /// 全クリアしてステップ1へ。解析中なら応答は後で破棄される。
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::storage::MemoryStorage;

    fn xray(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", vec![1, 2, 3])
    }

    fn bacterial() -> PredictionResult {
        PredictionResult {
            prediction: "Bacterial Pneumonia".into(),
            confidence: 0.87,
            ..Default::default()
        }
    }

    #[test]
    fn test_step_numbers_follow_workflow_order() {
        let steps = [Step::SelectFile, Step::Analyzing, Step::ResultShown, Step::ReportGenerated];
        let numbers: Vec<u8> = steps.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(Step::ResultShown.label(), "Results");
    }

    #[test]
    fn test_new_session_is_step_one_without_file() {
        let session = ScanSession::new();
        assert_eq!(session.step(), Step::SelectFile);
        assert!(session.selected_file().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_analyze_requires_selected_file() {
        let mut session = ScanSession::new();
        assert!(session.begin_analysis().is_none());
        assert_eq!(session.step(), Step::SelectFile);
    }

    #[test]
    fn test_successful_analysis_appends_history_and_shows_result() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        session.select_file(xray("a.png"));
        let ticket = session.begin_analysis().unwrap();
        assert_eq!(session.step(), Step::Analyzing);

        let outcome = session.finish_analysis(ticket, Ok(bacterial()), &mut history, Utc::now());
        assert_eq!(outcome, AnalysisOutcome::Completed(bacterial()));
        assert_eq!(session.step(), Step::ResultShown);

        let records = history.read_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result.confidence, 0.87);
        assert_eq!(records[0].thumbnail, "data:image/png;base64,AQID");
    }

    #[test]
    fn test_failed_analysis_reverts_to_step_one() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        session.select_file(xray("a.png"));
        let ticket = session.begin_analysis().unwrap();
        let outcome = session.finish_analysis(ticket, Err(AnalysisFailed), &mut history, Utc::now());

        assert_eq!(outcome, AnalysisOutcome::Failed);
        assert_eq!(session.step(), Step::SelectFile);
        assert!(session.selected_file().is_some());
        assert!(session.result().is_none());
        assert!(history.read_all().is_empty());

        // 再試行は begin_analysis をもう一度呼ぶだけ
        assert!(session.begin_analysis().is_some());
    }

    #[test]
    fn test_second_begin_while_analyzing_is_ignored() {
        let mut session = ScanSession::new();
        session.select_file(xray("a.png"));
        assert!(session.begin_analysis().is_some());
        assert!(session.begin_analysis().is_none());
        assert_eq!(session.step(), Step::Analyzing);
    }

    #[test]
    fn test_reset_during_analysis_discards_late_response() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        session.select_file(xray("a.png"));
        let ticket = session.begin_analysis().unwrap();
        session.reset();

        let outcome = session.finish_analysis(ticket, Ok(bacterial()), &mut history, Utc::now());
        assert_eq!(outcome, AnalysisOutcome::Discarded);
        assert_eq!(session.step(), Step::SelectFile);
        assert!(session.selected_file().is_none());
        assert!(history.read_all().is_empty());
    }

    #[test]
    fn test_reselect_during_analysis_discards_late_response() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        session.select_file(xray("a.png"));
        let stale = session.begin_analysis().unwrap();
        session.select_file(xray("b.png"));
        let fresh = session.begin_analysis().unwrap();

        assert_eq!(
            session.finish_analysis(stale, Ok(bacterial()), &mut history, Utc::now()),
            AnalysisOutcome::Discarded
        );
        assert!(session.is_analyzing());
        assert!(matches!(
            session.finish_analysis(fresh, Ok(bacterial()), &mut history, Utc::now()),
            AnalysisOutcome::Completed(_)
        ));
        assert_eq!(history.read_all().len(), 1);
    }

    #[test]
    fn test_stale_preview_is_discarded() {
        let mut session = ScanSession::new();
        let first = session.select_file(xray("a.png"));
        let second = session.select_file(xray("b.png"));

        assert!(!session.attach_preview(first, "data:old".into()));
        assert!(session.preview().is_none());
        assert!(session.attach_preview(second, "data:new".into()));
        assert_eq!(session.preview(), Some("data:new"));
    }

    #[test]
    fn test_preview_is_used_as_thumbnail() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        let preview_ticket = session.select_file(xray("a.png"));
        session.attach_preview(preview_ticket, "data:image/png;base64,cHJldmlldw==".into());
        let ticket = session.begin_analysis().unwrap();
        session.finish_analysis(ticket, Ok(bacterial()), &mut history, Utc::now());

        assert_eq!(history.read_all()[0].thumbnail, "data:image/png;base64,cHJldmlldw==");
    }

    #[test]
    fn test_report_only_after_result() {
        let mut session = ScanSession::new();
        assert!(session.report_data(Local::now()).is_none());

        session.select_file(xray("a.png"));
        assert!(session.report_data(Local::now()).is_none());
        assert_eq!(session.step(), Step::SelectFile);
    }

    #[test]
    fn test_report_can_be_generated_repeatedly() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        session.select_file(xray("a.png"));
        let ticket = session.begin_analysis().unwrap();
        session.finish_analysis(ticket, Ok(bacterial()), &mut history, Utc::now());

        let first = session.report_data(Local::now()).unwrap();
        session.mark_report_generated();
        assert_eq!(session.step(), Step::ReportGenerated);
        let second = session.report_data(Local::now()).unwrap();
        session.mark_report_generated();

        assert_eq!(session.report_count(), 2);
        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.image_data, second.image_data);
        // 再解析はできない
        assert!(session.begin_analysis().is_none());
    }

    #[test]
    fn test_report_data_does_not_advance_step() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        session.select_file(xray("a.png"));
        let ticket = session.begin_analysis().unwrap();
        session.finish_analysis(ticket, Ok(bacterial()), &mut history, Utc::now());

        let data = session.report_data(Local::now()).unwrap();
        assert_eq!(data.prediction, "Bacterial Pneumonia");
        assert_eq!(session.step(), Step::ResultShown);
        assert_eq!(session.report_count(), 0);

        assert!(session.mark_report_generated());
        assert_eq!(session.step(), Step::ReportGenerated);
        assert_eq!(session.report_count(), 1);
    }

    #[test]
    fn test_mark_report_requires_result() {
        let mut session = ScanSession::new();
        session.select_file(xray("a.png"));
        assert!(!session.mark_report_generated());
        assert_eq!(session.step(), Step::SelectFile);
        assert!(session.selected_file().is_some());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = ScanSession::new();
        let mut history = HistoryStore::new(MemoryStorage::new());

        session.select_file(xray("a.png"));
        let ticket = session.begin_analysis().unwrap();
        session.finish_analysis(ticket, Ok(bacterial()), &mut history, Utc::now());
        session.reset();

        assert_eq!(session.step(), Step::SelectFile);
        assert!(session.selected_file().is_none());
        assert!(session.preview().is_none());
        assert!(session.result().is_none());
    }
}
