//! PneumoScan Common Library
//!
//! CLIから使われるI/Oを持たないドメイン層:
//! スキャンセッションの状態機械、履歴ストア、集計、レポートのレイアウト

pub mod types;
pub mod data_uri;
pub mod diagnosis;
pub mod error;
pub mod storage;
pub mod history;
pub mod preferences;
pub mod notice;
pub mod session;
pub mod analytics;
pub mod report;

pub use types::{HistoryRecord, ImageFile, PredictionResult};
pub use diagnosis::{ConfidenceLevel, Diagnosis, DiagnosisBucket};
pub use error::{AnalysisFailed, Error, Result};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use history::{HistoryStore, ScanHistory, HISTORY_KEY, HISTORY_LIMIT};
pub use preferences::Preferences;
pub use notice::{Notice, NoticeKind};
pub use session::{AnalysisOutcome, AnalysisTicket, PreviewTicket, ScanSession, SessionState, Step};
pub use analytics::Analytics;
pub use report::{ReportData, ReportLayout};
