//! キー・バリュー形式の永続ストレージ抽象
//!
//! 履歴と表示言語はそれぞれ1つの名前付きバケットに文字列として保存する。

use crate::error::Result;
use std::collections::HashMap;

pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// インメモリ実装（テスト用フェイク）
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 書き込みが常に失敗するストレージ（容量超過の再現用）
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// 中身を直接差し込む（破損データの再現用）
    pub fn with_raw(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.read_only {
            return Err(crate::Error::Storage(format!("quota exceeded: {}", key)));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.read_only {
            return Err(crate::Error::Storage(format!("read-only: {}", key)));
        }
        self.entries.remove(key);
        Ok(())
    }
}
