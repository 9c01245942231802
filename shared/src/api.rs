//! API client types and trait definitions
//!
//! This module defines the document Q&A backend contract that can be
//! implemented by both native (reqwest) and WASM (gloo-net) HTTP clients.

use serde::{Deserialize, Serialize};

/// API error types
///
/// These cover transport-level failures only. A well-formed response with
/// `success: false` is not an `ApiError`; the state machine reads the
/// backend's own `error` field for those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum ApiError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),
    /// Server returned an error status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Opaque handle for a backend-side document session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which kind of input a piece of content came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Url,
    Text,
}

/// A file picked by the user, already read into memory
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    /// MIME type to send in the multipart part, defaulting to octet-stream
    pub fn mime(&self) -> &str {
        match self.content_type.as_deref() {
            Some(ct) if !ct.is_empty() => ct,
            _ => "application/octet-stream",
        }
    }
}

/// Content submitted to create a session or extend one
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource {
    File(FilePayload),
    Url(String),
    Text(String),
}

impl ContentSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ContentSource::File(_) => SourceKind::File,
            ContentSource::Url(_) => SourceKind::Url,
            ContentSource::Text(_) => SourceKind::Text,
        }
    }

    /// Trim text inputs and drop empty ones.
    ///
    /// Returns `None` when there is nothing to send: a blank URL or text,
    /// or a file without a name or without content.
    pub fn normalized(self) -> Option<Self> {
        match self {
            ContentSource::Url(url) => {
                let url = url.trim();
                (!url.is_empty()).then(|| ContentSource::Url(url.to_string()))
            }
            ContentSource::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| ContentSource::Text(text.to_string()))
            }
            // An empty file is still a chosen file; only a missing name means none was picked
            ContentSource::File(file) => {
                (!file.name.is_empty()).then_some(ContentSource::File(file))
            }
        }
    }

    /// JSON body content for URL and text sources; files go multipart.
    pub fn json_content(&self) -> Option<JsonContent> {
        match self {
            ContentSource::File(_) => None,
            ContentSource::Url(url) => Some(JsonContent::Url { url: url.clone() }),
            ContentSource::Text(text) => Some(JsonContent::Text { text: text.clone() }),
        }
    }
}

/// Non-file content as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonContent {
    Url { url: String },
    Text { text: String },
}

/// JSON body for `POST /api/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(flatten)]
    pub content: JsonContent,
}

/// JSON body for `POST /api/add-context`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddContextRequest {
    #[serde(flatten)]
    pub content: JsonContent,
    pub session_id: SessionId,
}

/// Request body for `POST /api/query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub session_id: SessionId,
    pub question: String,
}

/// Request body for `POST /api/search-web`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchWebRequest {
    pub question: String,
}

/// Common envelope of every backend response
pub trait BackendResponse {
    fn success(&self) -> bool;
    fn error(&self) -> Option<&str>;
}

macro_rules! backend_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BackendResponse for $ty {
                fn success(&self) -> bool {
                    self.success
                }

                fn error(&self) -> Option<&str> {
                    self.error.as_deref()
                }
            }
        )*
    };
}

/// Response from `POST /api/upload`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// pdf, image, url or text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Response from `POST /api/query`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The backend omits both flags when the answer was found
    #[serde(default)]
    pub not_found: bool,
    #[serde(default)]
    pub can_search_web: bool,
}

/// Response from `POST /api/search-web`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchWebResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Extra explanation, e.g. why the Gemini fallback was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response from `POST /api/add-context`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddContextResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_content: Option<AddedContent>,
}

/// Description of content merged into a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddedContent {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub name: String,
    #[serde(default)]
    pub preview: ContentPreview,
}

/// Truncated preview of newly added content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPreview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub document_count: u64,
    #[serde(default)]
    pub character_count: u64,
    #[serde(default)]
    pub text_preview: String,
}

/// Response from `GET /api/sessions/{id}/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

backend_response!(
    UploadResponse,
    QueryResponse,
    SearchWebResponse,
    AddContextResponse,
    SummaryResponse,
);

/// API endpoint definitions
pub mod endpoints {
    pub const UPLOAD: &str = "/api/upload";
    pub const QUERY: &str = "/api/query";
    pub const SEARCH_WEB: &str = "/api/search-web";
    pub const ADD_CONTEXT: &str = "/api/add-context";

    pub fn session_summary(id: &str) -> String {
        format!("/api/sessions/{}/summary", urlencoding::encode(id))
    }
}

/// Trait defining the document Q&A API
///
/// This trait can be implemented by both native and WASM HTTP clients.
/// All methods are async and return Result<T, ApiError>.
#[allow(async_fn_in_trait)]
pub trait DocQaApi {
    /// Create a session from a file, URL or text
    async fn upload(&self, source: &ContentSource) -> Result<UploadResponse, ApiError>;

    /// Ask a question against a session's documents
    async fn query(&self, req: &QueryRequest) -> Result<QueryResponse, ApiError>;

    /// Answer a question from the web instead of the documents
    async fn search_web(&self, req: &SearchWebRequest) -> Result<SearchWebResponse, ApiError>;

    /// Merge more content into an existing session
    async fn add_context(
        &self,
        session_id: &SessionId,
        source: &ContentSource,
    ) -> Result<AddContextResponse, ApiError>;

    /// Fetch the current summary of a session
    async fn session_summary(&self, session_id: &SessionId) -> Result<SummaryResponse, ApiError>;
}

/// Configuration for creating an API client
#[derive(Debug, Clone, PartialEq)]
pub struct ApiClientConfig {
    /// Base URL of the server (e.g., "http://localhost:8000")
    pub base_url: String,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

/// One outbound call, described independently of any HTTP client
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Upload(ContentSource),
    Query(QueryRequest),
    SearchWeb(SearchWebRequest),
    AddContext {
        session_id: SessionId,
        source: ContentSource,
    },
    Summary(SessionId),
}

/// The successful result of an [`ApiCall`]
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Upload(UploadResponse),
    Query(QueryResponse),
    SearchWeb(SearchWebResponse),
    AddContext(AddContextResponse),
    Summary(SummaryResponse),
}

/// Run `call` against any client implementation.
pub async fn execute<A: DocQaApi>(api: &A, call: &ApiCall) -> Result<Reply, ApiError> {
    match call {
        ApiCall::Upload(source) => api.upload(source).await.map(Reply::Upload),
        ApiCall::Query(req) => api.query(req).await.map(Reply::Query),
        ApiCall::SearchWeb(req) => api.search_web(req).await.map(Reply::SearchWeb),
        ApiCall::AddContext { session_id, source } => api
            .add_context(session_id, source)
            .await
            .map(Reply::AddContext),
        ApiCall::Summary(session_id) => api.session_summary(session_id).await.map(Reply::Summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_request_serializes_flat() {
        let url = UploadRequest {
            content: JsonContent::Url {
                url: "https://example.com".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&url).unwrap(),
            serde_json::json!({"url": "https://example.com"})
        );

        let text = AddContextRequest {
            content: JsonContent::Text {
                text: "more".into(),
            },
            session_id: SessionId::new("s1"),
        };
        assert_eq!(
            serde_json::to_value(&text).unwrap(),
            serde_json::json!({"text": "more", "session_id": "s1"})
        );
    }

    #[test]
    fn query_response_flags_default_to_false() {
        let json = r#"{"success": true, "answer": "42", "source": "document"}"#;
        let resp: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert!(!resp.not_found);
        assert!(!resp.can_search_web);
        assert_eq!(resp.answer.as_deref(), Some("42"));
    }

    #[test]
    fn failure_response_carries_error() {
        let json = r#"{"success": false, "error": "Invalid session_id"}"#;
        let resp: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success());
        assert_eq!(resp.error(), Some("Invalid session_id"));
    }

    #[test]
    fn add_context_response_parses_preview() {
        let json = r#"{
            "success": true,
            "summary": "Two sources",
            "added_content": {
                "type": "url",
                "name": "https://example.com",
                "preview": {
                    "source": "URL: https://example.com",
                    "text_preview": "Example Domain",
                    "character_count": 1234,
                    "document_count": 1
                }
            }
        }"#;
        let resp: AddContextResponse = serde_json::from_str(json).unwrap();
        let added = resp.added_content.unwrap();
        assert_eq!(added.content_type.as_deref(), Some("url"));
        assert_eq!(added.preview.character_count, 1234);
        assert_eq!(added.preview.document_count, 1);
    }

    #[test]
    fn normalized_trims_and_rejects_blank() {
        assert_eq!(
            ContentSource::Url("  https://a.b  ".into()).normalized(),
            Some(ContentSource::Url("https://a.b".into()))
        );
        assert_eq!(ContentSource::Text("   ".into()).normalized(), None);

        let unnamed = ContentSource::File(FilePayload {
            name: String::new(),
            content_type: None,
            bytes: b"%PDF".to_vec(),
        });
        assert_eq!(unnamed.normalized(), None);
    }

    #[test]
    fn zero_byte_file_is_still_a_file() {
        let empty = FilePayload {
            name: "a.pdf".into(),
            content_type: None,
            bytes: Vec::new(),
        };
        assert_eq!(
            ContentSource::File(empty.clone()).normalized(),
            Some(ContentSource::File(empty))
        );
    }

    #[test]
    fn summary_path_escapes_session_id() {
        assert_eq!(
            endpoints::session_summary("a/b?c#d e"),
            "/api/sessions/a%2Fb%3Fc%23d%20e/summary"
        );
        assert_eq!(
            endpoints::session_summary("3f2a-91_x.y~z"),
            "/api/sessions/3f2a-91_x.y~z/summary"
        );
    }

    #[test]
    fn config_strips_trailing_slash() {
        let config = ApiClientConfig::new("http://localhost:8000/");
        assert_eq!(config.url(endpoints::QUERY), "http://localhost:8000/api/query");
        assert_eq!(
            config.url(&endpoints::session_summary("abc")),
            "http://localhost:8000/api/sessions/abc/summary"
        );
    }

    #[test]
    fn api_error_display() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
        let err = ApiError::Server {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Server error (502): bad gateway");
    }
}
