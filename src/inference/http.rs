use super::InferenceClient;
use crate::error::Result;
use async_trait::async_trait;
use pneumoscan_common::{AnalysisFailed, ImageFile, PredictionResult};
use reqwest::multipart::{Form, Part};

const PREDICT_PATH: &str = "/scan/predict";
const FILE_FIELD: &str = "file";

/// reqwest による推論クライアント（タイムアウトなし）
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn predict_url(&self) -> String {
        format!("{}{}", self.base_url, PREDICT_PATH)
    }

    async fn send(&self, file: &ImageFile) -> std::result::Result<PredictionResult, String> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| format!("invalid mime type {}: {}", file.mime_type, e))?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(self.predict_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("server returned {}: {}", status, body.trim()));
        }

        response
            .json::<PredictionResult>()
            .await
            .map_err(|e| format!("malformed response body: {}", e))
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn predict(&self, file: &ImageFile) -> std::result::Result<PredictionResult, AnalysisFailed> {
        tracing::debug!(
            "POST {} ({}, {} bytes)",
            self.predict_url(),
            file.file_name,
            file.bytes.len()
        );

        self.send(file).await.map_err(|detail| {
            tracing::warn!("inference call failed: {}", detail);
            AnalysisFailed
        })
    }
}
