use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pneumoscan")]
#[command(about = "胸部X線画像の肺炎AI判定クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// X線画像を解析（フォルダ指定で一括）
    Scan {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        path: PathBuf,

        /// PDFレポートも生成
        #[arg(long)]
        report: bool,

        /// ヒートマップの保存先（フォルダ指定時はディレクトリとして扱い `<画像名>-heatmap.jpg` を書く）
        #[arg(long)]
        heatmap: Option<PathBuf>,

        /// レポート出力先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// スキャン履歴を表示/削除
    History {
        /// 履歴を全削除
        #[arg(long)]
        clear: bool,

        /// 確認なしで削除
        #[arg(short, long)]
        yes: bool,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 履歴の集計を表示
    Dashboard,

    /// 履歴レコードからPDFレポートを再生成
    Report {
        /// 履歴の番号（0が最新）
        #[arg(default_value = "0")]
        index: usize,

        /// 出力先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 履歴をCSVに出力
    Export {
        /// 出力先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 推論サーバーの死活確認
    Health {
        /// 5秒ごとに監視し続ける
        #[arg(short, long)]
        watch: bool,

        /// 監視回数（--watch時）
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 推論サーバーのURL
        #[arg(long)]
        set_api_url: Option<String>,

        /// 表示言語 (en/es/hi)
        #[arg(long)]
        set_language: Option<String>,

        /// レポート出力先
        #[arg(long)]
        set_report_dir: Option<PathBuf>,
    },
}
