//! HTTP implementation of the [`RenderApi`] contract.
//!
//! Talks to the document-generation service over its REST surface: one
//! endpoint renders a model + template into stored output, the storage
//! endpoints back diagnostic uploads, downloads and version listings.
//!
//! Construct [`HttpRenderApi`] from the environment (`RENDER_API_BASE_URL`,
//! `RENDER_API_KEY`); transport failures and non-success statuses are mapped
//! to [`RenderError`] here so the pipeline stays free of HTTP details.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use crate::contract::{FileVersion, RenderApi};
use crate::error::RenderError;
use crate::report_model::ReportDocumentModel;

const API_KEY_HEADER: &str = "x-api-key";

pub struct HttpRenderApi {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct RenderDocumentBody<'a> {
    template: &'a str,
    destination_path: &'a str,
    model: &'a ReportDocumentModel,
}

impl HttpRenderApi {
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Builds a rendering client from the environment, loading `.env` first.
    pub fn new_from_env() -> Result<Self, RenderError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("RENDER_API_BASE_URL").map_err(|e| {
            error!(error = %e, "RENDER_API_BASE_URL missing in environment");
            RenderError::Transport("RENDER_API_BASE_URL missing in environment".to_string())
        })?;
        let api_key = std::env::var("RENDER_API_KEY").map_err(|e| {
            error!(error = %e, "RENDER_API_KEY missing in environment");
            RenderError::Transport("RENDER_API_KEY missing in environment".to_string())
        })?;
        info!(base_url = %base_url, "Initialized HttpRenderApi from environment");
        Ok(Self::new(&base_url, api_key))
    }

    fn check_status(status: reqwest::StatusCode, path: &str, message: String) -> RenderError {
        if status == reqwest::StatusCode::NOT_FOUND {
            RenderError::NotFound(path.to_string())
        } else {
            RenderError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl RenderApi for HttpRenderApi {
    async fn render_document(
        &self,
        model: &ReportDocumentModel,
        template: &str,
        destination_path: &str,
    ) -> Result<(), RenderError> {
        info!(
            destination = destination_path,
            "Submitting render request to rendering api"
        );
        let response = self
            .http
            .post(format!("{}/v1/documents/render", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&RenderDocumentBody {
                template,
                destination_path,
                model,
            })
            .send()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Render request failed");
            return Err(Self::check_status(status, destination_path, message));
        }
        Ok(())
    }

    async fn upload_file(&self, path: &str, content: Vec<u8>) -> Result<(), RenderError> {
        let response = self
            .http
            .put(format!("{}/v1/storage/file", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("path", path)])
            .body(content)
            .send()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::check_status(status, path, message));
        }
        Ok(())
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, RenderError> {
        let response = self
            .http
            .get(format!("{}/v1/storage/file", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::check_status(status, path, message));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn get_file_versions(&self, path: &str) -> Result<Vec<FileVersion>, RenderError> {
        let response = self
            .http
            .get(format!("{}/v1/storage/versions", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::check_status(status, path, message));
        }
        response
            .json::<Vec<FileVersion>>()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))
    }
}
