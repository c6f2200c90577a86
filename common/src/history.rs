//! スキャン履歴ストア
//!
//! 最新順に最大20件を1つのバケットにJSONで保存する。
//! - 書き込み失敗は握りつぶす（セッション側の状態は巻き戻さない）
//! - 読み込めない・壊れたデータは空履歴として扱う

use crate::storage::KeyValueStorage;
use crate::types::HistoryRecord;

/// 履歴バケット名
pub const HISTORY_KEY: &str = "scanHistory";

/// 保持する最大件数
pub const HISTORY_LIMIT: usize = 20;

pub trait ScanHistory {
    /// 先頭に追加して上限で切り詰める
    fn append(&mut self, record: HistoryRecord);

    /// 最新順の全件
    fn read_all(&self) -> Vec<HistoryRecord>;

    /// 全削除（冪等）
    fn clear(&mut self);
}

/// `KeyValueStorage` 上の履歴ストア
#[derive(Debug, Clone, Default)]
pub struct HistoryStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: KeyValueStorage> ScanHistory for HistoryStore<S> {
    fn append(&mut self, record: HistoryRecord) {
        let mut records = self.read_all();
        records.insert(0, record);
        records.truncate(HISTORY_LIMIT);

        let json = match serde_json::to_string(&records) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("history serialization failed: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
            tracing::warn!("history write failed, keeping previous contents: {}", e);
        }
    }

    fn read_all(&self) -> Vec<HistoryRecord> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("history read failed: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("history data is corrupt, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            tracing::warn!("history clear failed: {}", e);
        }
    }
}
