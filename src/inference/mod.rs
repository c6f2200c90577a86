//! 推論サーバー連携
//!
//! - `POST /scan/predict`: 画像1枚をmultipartで送り、判定結果を受け取る
//! - `GET /health`: 死活監視（スキャン処理とは独立）

mod http;
pub mod health;

pub use http::HttpInferenceClient;
pub use health::{HealthMonitor, HealthStatus};

use async_trait::async_trait;
use pneumoscan_common::{AnalysisFailed, ImageFile, PredictionResult};

/// 推論呼び出しの差し替え口
///
/// 失敗の種類は呼び出し側に見せない。
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn predict(&self, file: &ImageFile) -> Result<PredictionResult, AnalysisFailed>;
}
