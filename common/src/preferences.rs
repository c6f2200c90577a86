//! 表示言語の設定
//!
//! 起動時に一度だけ読み込む。未設定・読み込み失敗時は "en"。

use crate::error::Result;
use crate::storage::KeyValueStorage;

/// 言語設定のバケット名
pub const LANGUAGE_KEY: &str = "language";

pub const DEFAULT_LANGUAGE: &str = "en";

/// 対応言語
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "hi"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Preferences {
    pub fn load<S: KeyValueStorage>(storage: &S) -> Self {
        match storage.get(LANGUAGE_KEY) {
            Ok(Some(raw)) => {
                let language = serde_json::from_str::<String>(&raw).unwrap_or(raw);
                let language = language.trim().to_string();
                if language.is_empty() {
                    Self::default()
                } else {
                    Self { language }
                }
            }
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("language preference unreadable: {}", e);
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStorage>(&self, storage: &mut S) -> Result<()> {
        let json = serde_json::to_string(&self.language)?;
        storage.set(LANGUAGE_KEY, &json)
    }

    pub fn is_supported(language: &str) -> bool {
        SUPPORTED_LANGUAGES.contains(&language)
    }
}
