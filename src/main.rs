use chrono::Local;
use clap::Parser;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use pneumoscan::cli::{Cli, Commands};
use pneumoscan::config::Config;
use pneumoscan::error::{PneumoScanError, Result};
use pneumoscan::export;
use pneumoscan::inference::{self, HealthMonitor, HttpInferenceClient};
use pneumoscan::scanner;
use pneumoscan::store::FileStorage;
use pneumoscan::ScanController;
use pneumoscan_common::report::{format_confidence, format_confidence_rounded, format_record_date};
use pneumoscan_common::{
    AnalysisFailed, AnalysisOutcome, Analytics, ConfidenceLevel, DiagnosisBucket, HistoryStore,
    Notice, PredictionResult, Preferences, ScanHistory, Step,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;
    let mut storage = FileStorage::new(config.data_dir()?);

    // 表示言語は起動時に一度だけ読む
    let preferences = Preferences::load(&storage);
    tracing::debug!("display language: {}", preferences.language);

    match cli.command {
        Commands::Scan { path, report, heatmap, output } => {
            println!("🩻 pneumoscan - 胸部X線解析\n");

            let targets = if path.is_dir() {
                scanner::scan_folder(&path)?
            } else {
                vec![path.clone()]
            };
            if targets.is_empty() {
                return Err(PneumoScanError::NoImagesFound(path.display().to_string()));
            }

            let client = HttpInferenceClient::new(&config.api_base_url())?;
            let report_dir = output.unwrap_or_else(|| config.report_dir());
            let mut controller = ScanController::new(client, HistoryStore::new(storage), report_dir);
            let batch = targets.len() > 1;
            let mut failures = 0usize;

            for (i, target) in targets.iter().enumerate() {
                println!("[{}/{}] {}", i + 1, targets.len(), target.display());
                controller.reset();

                if let Err(e) = controller.select_path(target).await {
                    print_notices(controller.take_notices());
                    println!("  ✖ {}", e);
                    failures += 1;
                    continue;
                }

                let spinner = spinner("AI解析中...");
                let outcome = controller.analyze().await;
                spinner.finish_and_clear();
                print_notices(controller.take_notices());

                let Some(AnalysisOutcome::Completed(result)) = outcome else {
                    failures += 1;
                    continue;
                };
                print_step(controller.session().step());
                print_result(&result);

                if let (Some(dest), Some(map)) = (&heatmap, &result.heatmap) {
                    let dest = heatmap_path(dest, target, batch);
                    match export::write_heatmap(map, &dest) {
                        Ok(written) => println!("  ✔ ヒートマップ: {}", written.display()),
                        Err(e) => println!("  ✖ ヒートマップ保存失敗: {}", e),
                    }
                }

                if report {
                    // 出力失敗は画像ごとに報告して次へ進む
                    match controller.generate_report() {
                        Ok(Some(artifact)) => {
                            print_notices(controller.take_notices());
                            print_step(controller.session().step());
                            println!("  ✔ PDF出力: {}", artifact.path.display());
                            if !artifact.image_embedded {
                                println!("  ⚠ 画像を埋め込めませんでした");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            print_notices(controller.take_notices());
                            println!("  ✖ {}", e);
                        }
                    }
                }
                println!();
            }

            println!("✔ 履歴: {}件", controller.history().len());
            if failures == targets.len() {
                return Err(PneumoScanError::AnalysisFailed(AnalysisFailed));
            }
            if failures > 0 {
                println!("⚠ {}件の解析に失敗しました", failures);
            }
            println!("\n✅ 解析完了");
        }

        Commands::History { clear, yes, json } => {
            let mut history = HistoryStore::new(storage);

            if clear {
                let confirmed = yes
                    || Confirm::new()
                        .with_prompt("スキャン履歴をすべて削除しますか？")
                        .default(false)
                        .interact()
                        .unwrap_or(false);
                if confirmed {
                    history.clear();
                    print_notices(vec![Notice::history_cleared()]);
                } else {
                    println!("キャンセルしました");
                }
                return Ok(());
            }

            let records = history.read_all();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }

            if records.is_empty() {
                println!("履歴がありません。X線画像を解析するとここに表示されます");
                return Ok(());
            }

            println!("スキャン履歴: {}件\n", records.len());
            for (i, record) in records.iter().enumerate() {
                println!(
                    "{:>2}  {}  {:<24} {:>5}  [{}]",
                    i,
                    format_record_date(&record.date),
                    record.result.prediction,
                    format_confidence_rounded(record.result.confidence),
                    record.result.diagnosis(),
                );
            }
        }

        Commands::Dashboard => {
            let history = HistoryStore::new(storage);
            print_dashboard(&Analytics::from_records(&history.read_all()));
        }

        Commands::Report { index, output } => {
            let history = HistoryStore::new(storage);
            let records = history.read_all();
            let record = records.get(index).ok_or(PneumoScanError::RecordNotFound(index))?;

            let data = export::report_from_record(record, Local::now());
            let output_dir = output.unwrap_or_else(|| config.report_dir());
            println!("- PDFを生成中...");
            let artifact = export::pdf::generate_report(&data, &output_dir)?;
            print_notices(vec![Notice::report_downloaded()]);
            println!("✔ PDF出力: {}", artifact.path.display());
        }

        Commands::Export { output } => {
            let history = HistoryStore::new(storage);
            let records = history.read_all();
            if records.is_empty() {
                return Err(PneumoScanError::HistoryEmpty);
            }

            let output_dir = output.unwrap_or_else(|| config.report_dir());
            let path = export::csv::export_history_csv(&records, &output_dir, Local::now())?;
            println!("✔ CSV出力: {} ({}件)", path.display(), records.len());
        }

        Commands::Health { watch, count } => {
            let mut monitor = HealthMonitor::new(&config.api_base_url())?;
            println!("推論サーバー: {}", monitor.url());

            if watch {
                monitor
                    .watch(count, inference::health::POLL_INTERVAL, |status| {
                        println!("[{}] {}", Local::now().format("%H:%M:%S"), status.label());
                    })
                    .await;
            } else {
                let status = monitor.check().await;
                println!("状態: {}", status.label());
            }
        }

        Commands::Config { show, set_api_url, set_language, set_report_dir } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_base_url(url)?;
                println!("✔ 推論サーバーURLを設定しました");
            }

            if let Some(language) = set_language {
                if !Preferences::is_supported(&language) {
                    return Err(PneumoScanError::Config(format!(
                        "未対応の言語です: {} (en/es/hi)",
                        language
                    )));
                }
                Preferences { language }.save(&mut storage)?;
                println!("✔ 表示言語を設定しました");
            }

            if let Some(dir) = set_report_dir {
                config.set_report_dir(dir)?;
                println!("✔ レポート出力先を設定しました");
            }

            if show {
                println!("設定:");
                println!("  推論サーバー: {}", config.api_base_url());
                println!("  レポート出力先: {}", config.report_dir().display());
                println!("  データ保存先: {}", storage.dir().display());
                println!("  表示言語: {}", Preferences::load(&storage).language);
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PNEUMOSCAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_step(step: Step) {
    println!("  ステップ {}/4: {}", step.number(), step.label());
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        let mark = if notice.is_error() { "✖" } else { "✔" };
        println!("  {} {}: {}", mark, notice.title, notice.description);
    }
}

fn print_result(result: &PredictionResult) {
    println!("  判定: {} ({})", result.prediction, result.diagnosis());
    println!("  信頼度: {}", format_confidence(result.confidence));

    if let Some((title, description)) = ConfidenceLevel::from_confidence(result.confidence).alert() {
        println!("  ⚠ {}: {}", title, description);
    }
    if let Some(message) = &result.message {
        println!("  ℹ {}", message);
    }
}

/// 一括時は `<dest>/<画像名>-heatmap.jpg`
fn heatmap_path(dest: &Path, source: &Path, batch: bool) -> PathBuf {
    if !batch {
        return dest.to_path_buf();
    }
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "scan".to_string());
    dest.join(format!("{}-heatmap.jpg", stem))
}

fn print_dashboard(analytics: &Analytics) {
    println!("📊 ダッシュボード\n");
    println!("  総スキャン数: {}", analytics.total);
    println!("  正常: {}", analytics.diagnosis.normal);
    println!("  肺炎: {}", analytics.diagnosis.pneumonia());
    if analytics.diagnosis.unclassified > 0 {
        println!("  判定不能: {}", analytics.diagnosis.unclassified);
    }
    if let Some(average) = analytics.average_confidence {
        println!("  平均信頼度: {}", format_confidence(average));
    }

    println!("\n診断内訳:");
    for bucket in DiagnosisBucket::ALL {
        println!(
            "  {:<10} {:>3}  ({:.0}%)",
            bucket.label(),
            analytics.diagnosis.get(bucket),
            analytics.diagnosis.share_percent(bucket)
        );
    }

    println!("\n信頼度分布:");
    let max = analytics.band_counts.iter().copied().max().unwrap_or(0).max(1);
    for (label, count) in analytics.bands() {
        let bar = "█".repeat(count * 30 / max);
        println!("  {:>8} {:>3} {}", label, count, bar);
    }

    if !analytics.recent.is_empty() {
        println!("\n最近のスキャン:");
        for record in &analytics.recent {
            println!(
                "  {}  {:<24} {}",
                format_record_date(&record.date),
                record.result.prediction,
                format_confidence(record.result.confidence)
            );
        }
    }
}
