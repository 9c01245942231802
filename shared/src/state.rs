//! Session view-state machine.
//!
//! [`ViewState`] holds everything the Q&A screen shows and is the only
//! place that state changes. It performs no I/O: [`ViewState::dispatch`]
//! turns a [`Command`] into at most one [`Request`], and the caller hands
//! the outcome of that request back through [`ViewState::complete`]. The
//! browser front end and the terminal client both drive it this way.

use crate::api::{
    ApiCall, ApiError, BackendResponse, ContentSource, QueryRequest, Reply, SearchWebRequest,
    SessionId, SourceKind,
};
use crate::chat::{AnswerSource, ChatLog, ContextNotice, ContextOrigin, EntryBody, EntryId, Role};
use crate::protocol::{SEARCHING_PLACEHOLDER, SYSTEM_SOURCE};

/// Top-level phase of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No session; the upload screen is showing
    #[default]
    Idle,
    /// A request is running that blocks the screen
    Processing(ProcessingKind),
    /// A session is active and the chat is usable
    Ready,
    /// The last answer wasn't in the document; a web search is on offer
    AwaitingWebSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingKind {
    /// Creating a session; the chat is hidden
    NewSession,
    /// Adding context to the active session; the chat stays visible
    Context,
}

/// Which parts of the page are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub upload_section: bool,
    pub processing: bool,
    pub content_info: bool,
    pub web_search_prompt: bool,
    pub context_modal: bool,
}

/// The single error banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub id: u64,
    pub message: String,
}

/// Text inputs bound to the page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputFields {
    pub url: String,
    pub text: String,
    pub question: String,
    pub context_url: String,
    pub context_text: String,
    pub upload_method: SourceKind,
    pub context_method: SourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Url,
    Text,
    Question,
    ContextUrl,
    ContextText,
}

/// Which method picker a selection applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodPicker {
    Upload,
    Context,
}

/// Everything a user can do to the screen
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SubmitContent(ContentSource),
    AskQuestion(String),
    ResolveWebSearch,
    DismissWebSearch,
    OpenContextModal,
    CloseContextModal,
    AddContext(ContentSource),
    RefreshSummary,
    Restart,
    SetInput(InputField, String),
    SelectMethod(MethodPicker, SourceKind),
    /// Timer expiry for the banner with this id
    DismissError(u64),
    /// Timer expiry for the summary highlight with this id
    ClearSummaryPulse(u64),
}

/// What a request was for, so its reply can be routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Upload(SourceKind),
    Query,
    SearchWeb,
    AddContext(ContextOrigin),
    Summary,
}

impl RequestKind {
    /// Banner text when the backend reports failure without a message
    pub fn fallback_error(&self) -> &'static str {
        match self {
            RequestKind::Upload(SourceKind::File) => "Failed to upload file",
            RequestKind::Upload(SourceKind::Url) => "Failed to process URL",
            RequestKind::Upload(SourceKind::Text) => "Failed to process text",
            RequestKind::Query => "Failed to get answer",
            RequestKind::SearchWeb => "Web search failed",
            RequestKind::AddContext(_) => "Failed to add context",
            RequestKind::Summary => "Failed to load summary",
        }
    }

    /// Banner prefix for transport failures
    pub fn transport_prefix(&self) -> &'static str {
        match self {
            RequestKind::Upload(SourceKind::File) => "Upload failed: ",
            RequestKind::Upload(SourceKind::Url) => "URL processing failed: ",
            RequestKind::Upload(SourceKind::Text) => "Text processing failed: ",
            RequestKind::Query => "Query failed: ",
            RequestKind::SearchWeb => "Web search failed: ",
            RequestKind::AddContext(_) => "Failed to add context: ",
            RequestKind::Summary => "Summary refresh failed: ",
        }
    }
}

/// Identifies an issued request.
///
/// `epoch` changes on every restart; replies carrying an older epoch are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub epoch: u64,
    pub kind: RequestKind,
}

/// A request the caller must execute and report back
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub ticket: Ticket,
    pub call: ApiCall,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    session_id: Option<SessionId>,
    pending_question: Option<String>,
    phase: Phase,
    chat: ChatLog,
    summary: Option<String>,
    summary_pulse: Option<u64>,
    banner: Option<ErrorBanner>,
    context_modal_open: bool,
    query_in_flight: bool,
    search_placeholder: Option<EntryId>,
    /// Web-search offer to restore once added context settles
    offer_held: bool,
    inputs: InputFields,
    epoch: u64,
    next_token: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn pending_question(&self) -> Option<&str> {
        self.pending_question.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Id of the running summary highlight, if any
    pub fn summary_pulse(&self) -> Option<u64> {
        self.summary_pulse
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    pub fn inputs(&self) -> &InputFields {
        &self.inputs
    }

    pub fn query_in_flight(&self) -> bool {
        self.query_in_flight
    }

    pub fn is_searching(&self) -> bool {
        self.search_placeholder.is_some()
    }

    /// True while any request is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Processing(_)) || self.query_in_flight || self.is_searching()
    }

    pub fn ask_enabled(&self) -> bool {
        self.session_id.is_some() && !self.is_busy()
    }

    pub fn ask_label(&self) -> &'static str {
        if self.query_in_flight {
            "Thinking..."
        } else {
            "Ask"
        }
    }

    pub fn visibility(&self) -> Visibility {
        let (upload_section, processing, content_info) = match self.phase {
            Phase::Idle => (true, false, false),
            Phase::Processing(ProcessingKind::NewSession) => (false, true, false),
            Phase::Processing(ProcessingKind::Context) => (false, true, true),
            Phase::Ready | Phase::AwaitingWebSearch => (false, false, true),
        };
        Visibility {
            upload_section,
            processing,
            content_info,
            web_search_prompt: self.phase == Phase::AwaitingWebSearch,
            context_modal: self.context_modal_open,
        }
    }

    /// Apply a user command. Returns the request to execute, if any.
    pub fn dispatch(&mut self, command: Command) -> Option<Request> {
        match command {
            Command::SubmitContent(source) => self.submit_content(source),
            Command::AskQuestion(text) => self.ask_question(&text),
            Command::ResolveWebSearch => self.resolve_web_search(),
            Command::DismissWebSearch => {
                if self.phase == Phase::AwaitingWebSearch {
                    self.phase = Phase::Ready;
                }
                None
            }
            Command::OpenContextModal => {
                self.context_modal_open = true;
                None
            }
            Command::CloseContextModal => {
                self.close_context_modal();
                None
            }
            Command::AddContext(source) => self.add_context(source),
            Command::RefreshSummary => self.refresh_summary(),
            Command::Restart => {
                self.restart();
                None
            }
            Command::SetInput(field, value) => {
                let slot = match field {
                    InputField::Url => &mut self.inputs.url,
                    InputField::Text => &mut self.inputs.text,
                    InputField::Question => &mut self.inputs.question,
                    InputField::ContextUrl => &mut self.inputs.context_url,
                    InputField::ContextText => &mut self.inputs.context_text,
                };
                *slot = value;
                None
            }
            Command::SelectMethod(picker, kind) => {
                match picker {
                    MethodPicker::Upload => self.inputs.upload_method = kind,
                    MethodPicker::Context => self.inputs.context_method = kind,
                }
                None
            }
            Command::DismissError(id) => {
                if self.banner.as_ref().is_some_and(|b| b.id == id) {
                    self.banner = None;
                }
                None
            }
            Command::ClearSummaryPulse(id) => {
                if self.summary_pulse == Some(id) {
                    self.summary_pulse = None;
                }
                None
            }
        }
    }

    fn submit_content(&mut self, source: ContentSource) -> Option<Request> {
        let kind = source.kind();
        let Some(source) = source.normalized() else {
            self.show_error(validation_message(kind));
            return None;
        };
        if self.is_busy() {
            log::debug!("Ignoring content submission while a request is in flight");
            return None;
        }

        self.phase = Phase::Processing(ProcessingKind::NewSession);
        Some(self.request(RequestKind::Upload(kind), ApiCall::Upload(source)))
    }

    fn ask_question(&mut self, text: &str) -> Option<Request> {
        let question = text.trim();
        if question.is_empty() {
            return None;
        }
        let Some(session_id) = self.session_id.clone() else {
            log::debug!("Ignoring question without an active session");
            return None;
        };
        if self.is_busy() {
            log::debug!("Rejecting question while another request is in flight");
            return None;
        }

        self.pending_question = Some(question.to_string());
        self.chat
            .push(Role::User, EntryBody::Plain(question.to_string()), None, None);
        self.inputs.question.clear();
        self.query_in_flight = true;
        // A new question retracts any earlier web-search offer
        self.phase = Phase::Ready;

        Some(self.request(
            RequestKind::Query,
            ApiCall::Query(QueryRequest {
                session_id,
                question: question.to_string(),
            }),
        ))
    }

    fn resolve_web_search(&mut self) -> Option<Request> {
        if self.phase != Phase::AwaitingWebSearch {
            return None;
        }
        let question = self.pending_question.clone()?;

        self.phase = Phase::Ready;
        let placeholder = self.chat.push(
            Role::Assistant,
            EntryBody::Plain(SEARCHING_PLACEHOLDER.to_string()),
            Some(AnswerSource::WebSearch),
            None,
        );
        self.search_placeholder = Some(placeholder);

        Some(self.request(
            RequestKind::SearchWeb,
            ApiCall::SearchWeb(SearchWebRequest { question }),
        ))
    }

    fn add_context(&mut self, source: ContentSource) -> Option<Request> {
        let kind = source.kind();
        let Some(source) = source.normalized() else {
            self.show_error(validation_message(kind));
            return None;
        };
        let Some(session_id) = self.session_id.clone() else {
            self.show_error("Please start a session first".to_string());
            return None;
        };
        if self.is_busy() {
            log::debug!("Ignoring added context while a request is in flight");
            return None;
        }

        let origin = ContextOrigin::from(&source);
        self.close_context_modal();
        self.offer_held = self.phase == Phase::AwaitingWebSearch;
        self.phase = Phase::Processing(ProcessingKind::Context);

        Some(self.request(
            RequestKind::AddContext(origin),
            ApiCall::AddContext { session_id, source },
        ))
    }

    fn refresh_summary(&mut self) -> Option<Request> {
        let session_id = self.session_id.clone()?;
        if self.is_busy() {
            return None;
        }
        Some(self.request(RequestKind::Summary, ApiCall::Summary(session_id)))
    }

    fn close_context_modal(&mut self) {
        self.context_modal_open = false;
        self.inputs.context_url.clear();
        self.inputs.context_text.clear();
    }

    /// Drop the session and return to the upload screen.
    ///
    /// Replies to requests issued before the restart are ignored.
    pub fn restart(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.session_id = None;
        self.pending_question = None;
        self.phase = Phase::Idle;
        self.chat.clear();
        self.summary = None;
        self.summary_pulse = None;
        self.banner = None;
        self.context_modal_open = false;
        self.query_in_flight = false;
        self.search_placeholder = None;
        self.offer_held = false;
        self.inputs = InputFields::default();
    }

    /// Feed back the outcome of a request returned by [`Self::dispatch`].
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<Reply, ApiError>) {
        if ticket.epoch != self.epoch {
            log::debug!("Dropping stale {:?} reply from epoch {}", ticket.kind, ticket.epoch);
            return;
        }
        let kind = ticket.kind;
        self.settle(&kind);

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("{:?} request failed: {}", kind, e);
                self.fail(&kind, format!("{}{}", kind.transport_prefix(), e));
                return;
            }
        };

        match (&kind, reply) {
            (RequestKind::Upload(_), Reply::Upload(resp)) => match resp.session_id.clone() {
                Some(session_id) if resp.success => {
                    self.session_id = Some(session_id);
                    self.pending_question = None;
                    self.summary = Some(resp.summary.unwrap_or_default());
                    self.chat.clear();
                    self.inputs.question.clear();
                    self.phase = Phase::Ready;
                }
                _ => self.fail(&kind, backend_message(&resp, &kind)),
            },
            (RequestKind::Query, Reply::Query(resp)) => {
                if !resp.success {
                    self.fail(&kind, backend_message(&resp, &kind));
                    return;
                }
                let source = resp.source.map(AnswerSource::from);
                let body = EntryBody::for_answer(resp.answer.unwrap_or_default(), source.as_ref());
                self.chat.push(Role::Assistant, body, source, None);
                if resp.not_found && resp.can_search_web {
                    self.phase = Phase::AwaitingWebSearch;
                }
            }
            (RequestKind::SearchWeb, Reply::SearchWeb(resp)) => {
                if !resp.success {
                    self.fail(&kind, backend_message(&resp, &kind));
                    return;
                }
                let source = resp.source.map(AnswerSource::from);
                let role = Role::for_web_answer(source.as_ref());
                let body = EntryBody::for_answer(resp.answer.unwrap_or_default(), source.as_ref());
                self.chat.push(role, body, source, resp.message);
            }
            (RequestKind::AddContext(origin), Reply::AddContext(resp)) => {
                if !resp.success {
                    self.fail(&kind, backend_message(&resp, &kind));
                    return;
                }
                if let Some(summary) = resp.summary {
                    self.replace_summary(summary);
                }
                let notice = ContextNotice::new(origin, resp.added_content.as_ref());
                self.chat.push(
                    Role::Assistant,
                    EntryBody::Context(notice),
                    Some(AnswerSource::parse(SYSTEM_SOURCE)),
                    None,
                );
            }
            (RequestKind::Summary, Reply::Summary(resp)) => match resp.summary.clone() {
                Some(summary) if resp.success => self.replace_summary(summary),
                _ => self.fail(&kind, backend_message(&resp, &kind)),
            },
            (kind, reply) => {
                log::warn!("Reply {:?} does not match request {:?}", reply, kind);
                let err = ApiError::Parse("unexpected response type".to_string());
                self.fail(kind, format!("{}{}", kind.transport_prefix(), err));
            }
        }
    }

    /// Bookkeeping common to every reply of `kind`, success or not.
    fn settle(&mut self, kind: &RequestKind) {
        match kind {
            RequestKind::Upload(_) | RequestKind::Summary => {}
            RequestKind::Query => self.query_in_flight = false,
            RequestKind::SearchWeb => {
                if let Some(id) = self.search_placeholder.take() {
                    self.chat.remove(id);
                }
            }
            RequestKind::AddContext(_) => {
                self.phase = if std::mem::take(&mut self.offer_held) {
                    Phase::AwaitingWebSearch
                } else {
                    Phase::Ready
                };
            }
        }
    }

    fn fail(&mut self, kind: &RequestKind, message: String) {
        if let RequestKind::Upload(_) = kind {
            // A failed upload leaves any earlier session untouched
            self.phase = if self.session_id.is_some() {
                Phase::Ready
            } else {
                Phase::Idle
            };
        }
        self.show_error(message);
    }

    fn replace_summary(&mut self, summary: String) {
        self.summary = Some(summary);
        self.summary_pulse = Some(self.next_token());
    }

    /// Show `message` in place of any current banner. Returns the banner id.
    pub fn show_error(&mut self, message: String) -> u64 {
        let id = self.next_token();
        log::warn!("{}", message);
        self.banner = Some(ErrorBanner { id, message });
        id
    }

    fn request(&mut self, kind: RequestKind, call: ApiCall) -> Request {
        Request {
            ticket: Ticket {
                epoch: self.epoch,
                kind,
            },
            call,
        }
    }

    fn next_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }
}

/// Banner text for an empty or missing input
pub fn validation_message(kind: SourceKind) -> String {
    match kind {
        SourceKind::File => "Please select a file",
        SourceKind::Url => "Please enter a valid URL",
        SourceKind::Text => "Please enter some text",
    }
    .to_string()
}

fn backend_message<R: BackendResponse>(resp: &R, kind: &RequestKind) -> String {
    match resp.error() {
        Some(msg) if !msg.is_empty() => msg.to_string(),
        _ => kind.fallback_error().to_string(),
    }
}
