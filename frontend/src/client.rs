//! Browser HTTP client implementation using gloo-net

use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::api::{
    endpoints, AddContextRequest, AddContextResponse, ApiClientConfig, ApiError, ContentSource,
    DocQaApi, FilePayload, QueryRequest, QueryResponse, SearchWebRequest, SearchWebResponse,
    SessionId, SummaryResponse, UploadRequest, UploadResponse,
};
use web_sys::{Blob, BlobPropertyBag, FormData};

use crate::utils;

/// API client for the page, talking to the same origin it was served from
#[derive(Clone, Debug, PartialEq)]
pub struct WebApiClient {
    config: ApiClientConfig,
}

impl WebApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            config: ApiClientConfig::new(base_url),
        }
    }

    pub fn same_origin() -> Self {
        Self::new(&utils::get_base_url())
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        if !response.ok() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| response.status_text());
            return Err(ApiError::Server { status, message });
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
        let response = Request::post(&url)
            .json(body)
            .map_err(|e| ApiError::Parse(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::handle_response(response).await
    }

    async fn post_file<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        file: &FilePayload,
        session_id: Option<&SessionId>,
    ) -> Result<T, ApiError> {
        let url = self.config.url(endpoint);
        let form = file_form(file, session_id)?;
        let response = Request::post(&url)
            .body(form)
            .map_err(|e| ApiError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::handle_response(response).await
    }
}

/// Multipart body with a `file` part and, for add-context, a `session_id` field
fn file_form(file: &FilePayload, session_id: Option<&SessionId>) -> Result<FormData, ApiError> {
    let js_err = |e: wasm_bindgen::JsValue| ApiError::Network(format!("{:?}", e));

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(file.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(file.mime());
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;

    let form = FormData::new().map_err(js_err)?;
    form.append_with_blob_and_filename("file", &blob, &file.name)
        .map_err(js_err)?;
    if let Some(id) = session_id {
        form.append_with_str("session_id", id.as_str())
            .map_err(js_err)?;
    }
    Ok(form)
}

impl DocQaApi for WebApiClient {
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
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::handle_response(response).await
    }
}
