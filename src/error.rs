use thiserror::Error;

#[derive(Error, Debug)]
pub enum PneumoScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像ファイルではありません: {0}")]
    InvalidImage(String),

    #[error("ファイルが大きすぎます: {path} ({size} bytes, 上限 10MB)")]
    FileTooLarge { path: String, size: u64 },

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("HTTPクライアントエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("解析に失敗しました。推論サーバーが起動しているか確認してください")]
    AnalysisFailed(#[from] pneumoscan_common::AnalysisFailed),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("CSV出力エラー: {0}")]
    CsvExport(#[from] csv::Error),

    #[error("履歴がありません")]
    HistoryEmpty,

    #[error("履歴レコードが見つかりません: {0}")]
    RecordNotFound(usize),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] pneumoscan_common::Error),
}

pub type Result<T> = std::result::Result<T, PneumoScanError>;
