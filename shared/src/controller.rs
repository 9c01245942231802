//! Async driver pairing a [`ViewState`] with an API client.

use crate::api::{execute, DocQaApi};
use crate::state::{Command, ViewState};

/// Runs commands end to end: dispatch, execute, complete.
///
/// Suitable for clients that can await each request in turn, such as the
/// terminal chat. The browser front end splits the same steps across Yew
/// messages instead.
pub struct Controller<A> {
    api: A,
    state: ViewState,
}

impl<A: DocQaApi> Controller<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Apply `command` and wait for any request it issues.
    ///
    /// Returns true if a request was made.
    pub async fn handle(&mut self, command: Command) -> bool {
        let Some(request) = self.state.dispatch(command) else {
            return false;
        };
        let outcome = execute(&self.api, &request.call).await;
        self.state.complete(request.ticket, outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        AddContextResponse, ApiCall, ApiError, ContentSource, QueryRequest, QueryResponse,
        SearchWebRequest, SearchWebResponse, SessionId, SummaryResponse, UploadResponse,
    };
    use crate::chat::{AnswerSource, EntryBody, Role};
    use crate::protocol::SEARCHING_PLACEHOLDER;
    use crate::state::Phase;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned JSON bodies in order and records every call.
    #[derive(Default)]
    struct ScriptedApi {
        replies: RefCell<VecDeque<serde_json::Value>>,
        calls: RefCell<Vec<ApiCall>>,
    }

    impl ScriptedApi {
        fn with(replies: Vec<serde_json::Value>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn next<T: serde::de::DeserializeOwned>(&self, call: ApiCall) -> Result<T, ApiError> {
            self.calls.borrow_mut().push(call);
            let body = self
                .replies
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ApiError::Network("no scripted reply".into()))?;
            serde_json::from_value(body).map_err(|e| ApiError::Parse(e.to_string()))
        }
    }

    impl DocQaApi for ScriptedApi {
        async fn upload(&self, source: &ContentSource) -> Result<UploadResponse, ApiError> {
            self.next(ApiCall::Upload(source.clone()))
        }

        async fn query(&self, req: &QueryRequest) -> Result<QueryResponse, ApiError> {
            self.next(ApiCall::Query(req.clone()))
        }

        async fn search_web(&self, req: &SearchWebRequest) -> Result<SearchWebResponse, ApiError> {
            self.next(ApiCall::SearchWeb(req.clone()))
        }

        async fn add_context(
            &self,
            session_id: &SessionId,
            source: &ContentSource,
        ) -> Result<AddContextResponse, ApiError> {
            self.next(ApiCall::AddContext {
                session_id: session_id.clone(),
                source: source.clone(),
            })
        }

        async fn session_summary(
            &self,
            session_id: &SessionId,
        ) -> Result<SummaryResponse, ApiError> {
            self.next(ApiCall::Summary(session_id.clone()))
        }
    }

    #[tokio::test]
    async fn upload_then_document_answer() {
        let api = ScriptedApi::with(vec![
            serde_json::json!({"success": true, "session_id": "s1", "summary": "1 doc, 11 chars"}),
            serde_json::json!({
                "success": true,
                "answer": "a greeting",
                "source": "document",
                "not_found": false,
            }),
        ]);
        let mut controller = Controller::new(api);

        assert!(
            controller
                .handle(Command::SubmitContent(ContentSource::Text("hello world".into())))
                .await
        );
        assert_eq!(controller.state().session_id(), Some(&SessionId::new("s1")));
        assert_eq!(controller.state().summary(), Some("1 doc, 11 chars"));

        assert!(controller.handle(Command::AskQuestion("what is this?".into())).await);

        let entries = controller.state().chat().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].body, EntryBody::Plain("what is this?".into()));
        assert_eq!(entries[1].role, Role::Assistant);
        assert_eq!(entries[1].body, EntryBody::Plain("a greeting".into()));
        assert_eq!(
            entries[1].source.as_ref().map(|s| s.label()),
            Some("Your Document")
        );
        assert!(!controller.state().visibility().web_search_prompt);
    }

    #[tokio::test]
    async fn not_found_then_gemini_fallback() {
        let api = ScriptedApi::with(vec![
            serde_json::json!({"success": true, "session_id": "s1", "summary": "LBJ"}),
            serde_json::json!({
                "success": true,
                "answer": "The given text does not mention LeBron James.",
                "source": "document",
                "not_found": true,
                "can_search_web": true
            }),
            serde_json::json!({
                "success": true,
                "answer": "**LeBron James**\n* born 1984\n* plays basketball",
                "source": "gemini_fallback",
                "message": "Google Search quota exceeded. Used Gemini's general knowledge."
            }),
        ]);
        let mut controller = Controller::new(api);
        controller
            .handle(Command::SubmitContent(ContentSource::Text(
                "LBJ was the 36th President.".into(),
            )))
            .await;
        controller
            .handle(Command::AskQuestion("How old is LeBron James?".into()))
            .await;
        assert_eq!(controller.state().phase(), Phase::AwaitingWebSearch);
        assert!(controller.state().visibility().web_search_prompt);

        assert!(controller.handle(Command::ResolveWebSearch).await);

        let state = controller.state();
        assert!(!state.visibility().web_search_prompt);
        assert!(state
            .chat()
            .entries()
            .iter()
            .all(|e| e.body.to_plain_text() != SEARCHING_PLACEHOLDER));
        let last = state.chat().last().unwrap();
        assert_eq!(last.role, Role::GeminiFallback);
        assert_eq!(last.source, Some(AnswerSource::GeminiFallback));
        assert_eq!(last.source.as_ref().unwrap().label(), "Gemini Knowledge");
        match &last.body {
            EntryBody::Markup { html, .. } => {
                assert!(html.starts_with("<strong>LeBron James</strong><br><ul>"));
                assert_eq!(html.matches("<li>").count(), 2);
            }
            other => panic!("expected markup, got {:?}", other),
        }
        assert!(last.note.as_deref().unwrap().contains("quota exceeded"));

        let calls = controller.api().calls.borrow();
        assert_eq!(
            calls.last(),
            Some(&ApiCall::SearchWeb(SearchWebRequest {
                question: "How old is LeBron James?".into()
            }))
        );
    }

    #[tokio::test]
    async fn session_scoped_calls_need_a_session() {
        let mut controller = Controller::new(ScriptedApi::default());
        assert!(!controller.handle(Command::AskQuestion("q".into())).await);
        assert!(
            !controller
                .handle(Command::AddContext(ContentSource::Text("more".into())))
                .await
        );
        assert!(!controller.handle(Command::RefreshSummary).await);
        assert!(controller.api().calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn session_id_tracks_latest_upload() {
        let api = ScriptedApi::with(vec![
            serde_json::json!({"success": true, "session_id": "s1", "summary": "one"}),
            serde_json::json!({"success": false, "error": "No valid content provided"}),
            serde_json::json!({"success": true, "session_id": "s2", "summary": "two"}),
        ]);
        let mut controller = Controller::new(api);
        let text = || Command::SubmitContent(ContentSource::Text("doc".into()));

        controller.handle(text()).await;
        assert_eq!(controller.state().session_id(), Some(&SessionId::new("s1")));
        controller.handle(text()).await;
        assert_eq!(controller.state().session_id(), Some(&SessionId::new("s1")));
        controller.handle(text()).await;
        assert_eq!(controller.state().session_id(), Some(&SessionId::new("s2")));
    }

    #[tokio::test]
    async fn transport_error_surfaces_with_prefix() {
        let mut controller = Controller::new(ScriptedApi::default());
        controller
            .handle(Command::SubmitContent(ContentSource::Text("doc".into())))
            .await;
        assert_eq!(
            controller.state().banner().unwrap().message,
            "Text processing failed: Network error: no scripted reply"
        );
        assert_eq!(controller.state().phase(), Phase::Idle);
    }
}
