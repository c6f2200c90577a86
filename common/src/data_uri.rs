//! Data URIユーティリティ
//!
//! "data:image/jpeg;base64,/9j/4AAQ..." 形式の組み立てと分解

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// バイト列をData URIに変換
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Data URIからBase64データ部分を抽出
pub fn extract_base64(data_uri: &str) -> Option<&str> {
    if !data_uri.starts_with("data:") {
        return None;
    }
    data_uri.split_once(',').map(|(_, data)| data)
}

/// Data URIをデコードしてバイト列を返す
pub fn decode(data_uri: &str) -> Option<Vec<u8>> {
    extract_base64(data_uri).and_then(decode_base64)
}

/// 素のBase64文字列をデコード（ヒートマップ用）
pub fn decode_base64(data: &str) -> Option<Vec<u8>> {
    STANDARD.decode(data.trim()).ok()
}
