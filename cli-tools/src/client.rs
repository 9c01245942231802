//! Native HTTP client implementation using reqwest

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::api::{
    endpoints, AddContextRequest, AddContextResponse, ApiClientConfig, ApiError, ContentSource,
    DocQaApi, FilePayload, QueryRequest, QueryResponse, SearchWebRequest, SearchWebResponse,
    SessionId, SummaryResponse, UploadRequest, UploadResponse,
};

/// Native API client using reqwest
pub struct NativeApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl NativeApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            config: ApiClientConfig::new(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.config.url(endpoint);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn post_file<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        file: &FilePayload,
        session_id: Option<&SessionId>,
    ) -> Result<T, ApiError> {
        let url = self.config.url(endpoint);
        tracing::debug!("POST {} (multipart, {} bytes)", url, file.bytes.len());

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.mime())
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let mut form = Form::new().part("file", part);
        if let Some(id) = session_id {
            form = form.text("session_id", id.to_string());
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }
}

impl DocQaApi for NativeApiClient {
    async fn upload(&self, source: &ContentSource) -> Result<UploadResponse, ApiError> {
        match source {
            ContentSource::File(file) => self.post_file(endpoints::UPLOAD, file, None).await,
            other => {
                let content = other
                    .json_content()
                    .ok_or_else(|| ApiError::Parse("unsupported content".to_string()))?;
                self.post_json(endpoints::UPLOAD, &UploadRequest { content })
                    .await
            }
        }
    }

    async fn query(&self, req: &QueryRequest) -> Result<QueryResponse, ApiError> {
        self.post_json(endpoints::QUERY, req).await
    }

    async fn search_web(&self, req: &SearchWebRequest) -> Result<SearchWebResponse, ApiError> {
        self.post_json(endpoints::SEARCH_WEB, req).await
    }

    async fn add_context(
        &self,
        session_id: &SessionId,
        source: &ContentSource,
    ) -> Result<AddContextResponse, ApiError> {
        match source {
            ContentSource::File(file) => {
                self.post_file(endpoints::ADD_CONTEXT, file, Some(session_id))
                    .await
            }
            other => {
                let content = other
                    .json_content()
                    .ok_or_else(|| ApiError::Parse("unsupported content".to_string()))?;
                let body = AddContextRequest {
                    content,
                    session_id: session_id.clone(),
                };
                self.post_json(endpoints::ADD_CONTEXT, &body).await
            }
        }
    }

    async fn session_summary(&self, session_id: &SessionId) -> Result<SummaryResponse, ApiError> {
        let url = self
            .config
            .url(&endpoints::session_summary(session_id.as_str()));
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }
}
