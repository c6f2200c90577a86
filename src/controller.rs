//! スキャンワークフローの制御
//!
//! `ScanSession`（状態機械）に推論クライアント・履歴・レポート出力先をつなぐ。
//! ユーザー向けの通知は `notices` に溜め、呼び出し側が取り出して表示する。

use crate::error::{PneumoScanError, Result};
use crate::export::pdf::{self, ReportArtifact};
use crate::inference::InferenceClient;
use crate::scanner;
use chrono::{Local, Utc};
use pneumoscan_common::{AnalysisOutcome, ImageFile, Notice, ScanHistory, ScanSession};
use std::path::{Path, PathBuf};

pub struct ScanController<C, H> {
    session: ScanSession,
    client: C,
    history: H,
    report_dir: PathBuf,
    notices: Vec<Notice>,
}

impl<C: InferenceClient, H: ScanHistory> ScanController<C, H> {
    pub fn new(client: C, history: H, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            session: ScanSession::new(),
            client,
            history,
            report_dir: report_dir.into(),
            notices: Vec::new(),
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// 溜まった通知を取り出す
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// ファイルを選択し、プレビュー（Data URI）を別スレッドで作る
    pub async fn select_file(&mut self, file: ImageFile) {
        let ticket = self.session.select_file(file.clone());

        match tokio::task::spawn_blocking(move || file.to_data_uri()).await {
            Ok(preview) => {
                self.session.attach_preview(ticket, preview);
            }
            Err(e) => tracing::warn!("preview encoding failed: {}", e),
        }
    }

    /// パスから画像を読み込んで選択する。画像でない・大きすぎる場合は通知を出してエラー。
    pub async fn select_path(&mut self, path: &Path) -> Result<()> {
        match scanner::load_image(path) {
            Ok(file) => {
                self.select_file(file).await;
                Ok(())
            }
            Err(e @ PneumoScanError::InvalidImage(_)) => {
                self.notices.push(Notice::invalid_file_type());
                Err(e)
            }
            Err(e @ PneumoScanError::FileTooLarge { .. }) => {
                self.notices.push(Notice::file_too_large());
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// 解析を実行。ステップ1で画像が選ばれていなければ何もせず None。
    pub async fn analyze(&mut self) -> Option<AnalysisOutcome> {
        let ticket = self.session.begin_analysis()?;

        let response = self.client.predict(ticket.file()).await;
        let outcome = self
            .session
            .finish_analysis(ticket, response, &mut self.history, Utc::now());

        match &outcome {
            AnalysisOutcome::Completed(_) => self.notices.push(Notice::analysis_complete()),
            AnalysisOutcome::Failed => self.notices.push(Notice::analysis_failed()),
            AnalysisOutcome::Discarded => {}
        }
        Some(outcome)
    }

    /// PDFレポートを生成（ステップ3・4のみ）。呼ぶたびに新しいファイルを作る。
    ///
    /// 書き出しに失敗した場合はステップを進めない。
    pub fn generate_report(&mut self) -> Result<Option<ReportArtifact>> {
        let Some(data) = self.session.report_data(Local::now()) else {
            return Ok(None);
        };

        match pdf::generate_report(&data, &self.report_dir) {
            Ok(artifact) => {
                self.session.mark_report_generated();
                self.notices.push(Notice::report_downloaded());
                Ok(Some(artifact))
            }
            Err(e) => {
                tracing::warn!("report generation failed: {}", e);
                self.notices.push(Notice::report_failed());
                Err(e)
            }
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}
