//! The document Q&A page.
//!
//! All screen state lives in a [`ViewState`]. Every UI event becomes a
//! [`Command`]; requests the state machine issues run in `spawn_local` and
//! come back as [`QaMsg::Completed`].

use gloo::timers::callback::Timeout;
use shared::api::{execute, ApiCall, ApiError, ContentSource, FilePayload, Reply, SourceKind};
use shared::protocol::{ERROR_BANNER_TIMEOUT_MS, SUMMARY_PULSE_MS};
use shared::state::{Command, InputField, MethodPicker, Phase, ProcessingKind, Request, Ticket};
use shared::ViewState;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlInputElement};
use yew::prelude::*;

use crate::client::WebApiClient;
use crate::components::{ChatEntryView, ContextModal, ErrorBanner, SourceInputs};
use crate::utils;

pub enum QaMsg {
    Command(Command),
    Completed(Ticket, Result<Reply, ApiError>),
    FileChosen(MethodPicker, Option<web_sys::File>),
    /// Submit the upload form or the context modal
    Submit(MethodPicker),
    FileRead(MethodPicker, FilePayload),
    FileReadFailed(String),
}

pub struct QaPage {
    state: ViewState,
    api: WebApiClient,
    upload_file: Option<web_sys::File>,
    context_file: Option<web_sys::File>,
    messages_ref: NodeRef,
    rendered_entries: usize,
}

/// Ids of the current banner and summary highlight
type Marks = (Option<u64>, Option<u64>);

/// Spinner text for a phase, if it shows one
pub fn processing_label(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Processing(ProcessingKind::NewSession) => Some("Processing your content..."),
        Phase::Processing(ProcessingKind::Context) => Some("Adding context..."),
        _ => None,
    }
}

/// Marks in `after` that were not already showing in `before`
fn fresh_marks(before: Marks, after: Marks) -> Marks {
    (
        after.0.filter(|id| before.0 != Some(*id)),
        after.1.filter(|id| before.1 != Some(*id)),
    )
}

fn wrap_source(picker: MethodPicker, source: ContentSource) -> Command {
    match picker {
        MethodPicker::Upload => Command::SubmitContent(source),
        MethodPicker::Context => Command::AddContext(source),
    }
}

impl QaPage {
    fn marks(&self) -> Marks {
        (
            self.state.banner().map(|b| b.id),
            self.state.summary_pulse(),
        )
    }

    /// Start expiry timers for a banner or summary highlight that appeared since `before`.
    fn arm_timers(&self, ctx: &Context<Self>, before: Marks) {
        let (banner, pulse) = fresh_marks(before, self.marks());
        if let Some(id) = banner {
            let link = ctx.link().clone();
            Timeout::new(ERROR_BANNER_TIMEOUT_MS, move || {
                link.send_message(QaMsg::Command(Command::DismissError(id)));
            })
            .forget();
        }
        if let Some(id) = pulse {
            let link = ctx.link().clone();
            Timeout::new(SUMMARY_PULSE_MS, move || {
                link.send_message(QaMsg::Command(Command::ClearSummaryPulse(id)));
            })
            .forget();
        }
    }

    fn apply(&mut self, ctx: &Context<Self>, command: Command) {
        match &command {
            Command::Restart => {
                self.upload_file = None;
                self.context_file = None;
            }
            Command::SelectMethod(MethodPicker::Upload, _) => self.upload_file = None,
            Command::SelectMethod(MethodPicker::Context, _)
            | Command::OpenContextModal
            | Command::CloseContextModal => self.context_file = None,
            _ => {}
        }

        let before = self.marks();
        if let Some(request) = self.state.dispatch(command) {
            // The file inputs unmount while a request runs
            match &request.call {
                ApiCall::Upload(_) => self.upload_file = None,
                ApiCall::AddContext { .. } => self.context_file = None,
                _ => {}
            }
            self.send(ctx, request);
        }
        self.arm_timers(ctx, before);
    }

    fn send(&self, ctx: &Context<Self>, request: Request) {
        let api = self.api.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let outcome = execute(&api, &request.call).await;
            if let Err(e) = &outcome {
                log::error!("{:?} request failed: {}", request.ticket.kind, e);
            }
            link.send_message(QaMsg::Completed(request.ticket, outcome));
        });
    }

    fn submit(&mut self, ctx: &Context<Self>, picker: MethodPicker) {
        let source = {
            let inputs = self.state.inputs();
            let (method, url, text, file) = match picker {
                MethodPicker::Upload => (
                    inputs.upload_method,
                    &inputs.url,
                    &inputs.text,
                    &self.upload_file,
                ),
                MethodPicker::Context => (
                    inputs.context_method,
                    &inputs.context_url,
                    &inputs.context_text,
                    &self.context_file,
                ),
            };
            match method {
                SourceKind::Url => ContentSource::Url(url.clone()),
                SourceKind::Text => ContentSource::Text(text.clone()),
                SourceKind::File => match file.clone() {
                    Some(file) => {
                        let link = ctx.link().clone();
                        spawn_local(async move {
                            match utils::read_file(&file).await {
                                Ok(payload) => link.send_message(QaMsg::FileRead(picker, payload)),
                                Err(e) => link.send_message(QaMsg::FileReadFailed(e)),
                            }
                        });
                        return;
                    }
                    // Rejected by the state machine with a "select a file" banner
                    None => ContentSource::File(FilePayload {
                        name: String::new(),
                        content_type: None,
                        bytes: Vec::new(),
                    }),
                },
            }
        };
        self.apply(ctx, wrap_source(picker, source));
    }

    fn view_upload(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let inputs = self.state.inputs();
        let on_submit = link.callback(|_| QaMsg::Submit(MethodPicker::Upload));
        let on_method = link.callback(|kind| {
            QaMsg::Command(Command::SelectMethod(MethodPicker::Upload, kind))
        });
        let on_url = link.callback(|v| QaMsg::Command(Command::SetInput(InputField::Url, v)));
        let on_text = link.callback(|v| QaMsg::Command(Command::SetInput(InputField::Text, v)));

        html! {
            <section class="upload-section">
                <h2>{ "Add your content" }</h2>
                <p class="hint">
                    { "Upload a PDF or image, paste a link, or enter text " }
                    { "to start asking questions." }
                </p>
                <SourceInputs
                    method={inputs.upload_method}
                    url={AttrValue::from(inputs.url.clone())}
                    text={AttrValue::from(inputs.text.clone())}
                    {on_method}
                    {on_url}
                    {on_text}
                    on_file={link.callback(|f| QaMsg::FileChosen(MethodPicker::Upload, f))}
                />
                <button class="primary submit-button" onclick={on_submit}>
                    { "Process Content" }
                </button>
            </section>
        }
    }

    fn view_processing(&self) -> Html {
        let label = processing_label(self.state.phase()).unwrap_or("Working...");
        html! {
            <div class="processing">
                <div class="spinner"></div>
                <p>{ label }</p>
            </div>
        }
    }

    fn view_session(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let summary_class = classes!(
            "summary",
            self.state.summary_pulse().is_some().then_some("summary-updated")
        );
        let busy = self.state.is_busy();

        html! {
            <section class="content-info">
                <div class="content-header">
                    <h2>{ "Content Summary" }</h2>
                    <div class="content-actions">
                        <button
                            class="secondary"
                            disabled={busy}
                            onclick={link.callback(|_| QaMsg::Command(Command::OpenContextModal))}
                        >
                            { "➕ Add Context" }
                        </button>
                        <button
                            class="secondary"
                            disabled={busy}
                            onclick={link.callback(|_| QaMsg::Command(Command::RefreshSummary))}
                        >
                            { "🔄 Refresh" }
                        </button>
                        <button
                            class="secondary"
                            onclick={link.callback(|_| QaMsg::Command(Command::Restart))}
                        >
                            { "↺ New Content" }
                        </button>
                    </div>
                </div>
                <div class={summary_class}>{ self.state.summary().unwrap_or_default() }</div>
                { self.view_chat(ctx) }
            </section>
        }
    }

    fn view_chat(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let question = self.state.inputs().question.clone();

        let on_question_input = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            QaMsg::Command(Command::SetInput(InputField::Question, input.value()))
        });
        let on_keypress = {
            let question = question.clone();
            link.batch_callback(move |e: KeyboardEvent| {
                if e.key() == "Enter" {
                    Some(QaMsg::Command(Command::AskQuestion(question.clone())))
                } else {
                    None
                }
            })
        };
        let on_ask = {
            let question = question.clone();
            link.callback(move |_| QaMsg::Command(Command::AskQuestion(question.clone())))
        };

        html! {
            <div class="chat-section">
                <div class="messages" ref={self.messages_ref.clone()}>
                    { for self.state.chat().entries().iter().map(|entry| html! {
                        <ChatEntryView key={format!("{:?}", entry.id)} entry={entry.clone()} />
                    }) }
                </div>
                {
                    if self.state.visibility().web_search_prompt {
                        html! {
                            <div class="web-search-prompt">
                                <p>
                                    { "This information was not found in your document. " }
                                    { "Would you like to search the web?" }
                                </p>
                                <button
                                    class="primary"
                                    onclick={link.callback(|_| {
                                        QaMsg::Command(Command::ResolveWebSearch)
                                    })}
                                >
                                    { "🔍 Search Web" }
                                </button>
                                <button
                                    class="secondary"
                                    onclick={link.callback(|_| {
                                        QaMsg::Command(Command::DismissWebSearch)
                                    })}
                                >
                                    { "No thanks" }
                                </button>
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
                <div class="chat-input">
                    <input
                        type="text"
                        placeholder="Ask a question about your content..."
                        value={question}
                        oninput={on_question_input}
                        onkeypress={on_keypress}
                    />
                    <button
                        class="primary"
                        disabled={!self.state.ask_enabled()}
                        onclick={on_ask}
                    >
                        { self.state.ask_label() }
                    </button>
                </div>
            </div>
        }
    }

    fn view_context_modal(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let inputs = self.state.inputs();
        let on_method = link.callback(|kind| {
            QaMsg::Command(Command::SelectMethod(MethodPicker::Context, kind))
        });
        let on_url = link.callback(|v| {
            QaMsg::Command(Command::SetInput(InputField::ContextUrl, v))
        });
        let on_text = link.callback(|v| {
            QaMsg::Command(Command::SetInput(InputField::ContextText, v))
        });
        html! {
            <ContextModal
                method={inputs.context_method}
                url={AttrValue::from(inputs.context_url.clone())}
                text={AttrValue::from(inputs.context_text.clone())}
                {on_method}
                {on_url}
                {on_text}
                on_file={link.callback(|f| QaMsg::FileChosen(MethodPicker::Context, f))}
                on_submit={link.callback(|_| QaMsg::Submit(MethodPicker::Context))}
                on_close={link.callback(|_| QaMsg::Command(Command::CloseContextModal))}
            />
        }
    }
}

impl Component for QaPage {
    type Message = QaMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            state: ViewState::new(),
            api: WebApiClient::same_origin(),
            upload_file: None,
            context_file: None,
            messages_ref: NodeRef::default(),
            rendered_entries: 0,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            QaMsg::Command(command) => self.apply(ctx, command),
            QaMsg::Completed(ticket, outcome) => {
                let before = self.marks();
                self.state.complete(ticket, outcome);
                self.arm_timers(ctx, before);
            }
            QaMsg::FileChosen(MethodPicker::Upload, file) => self.upload_file = file,
            QaMsg::FileChosen(MethodPicker::Context, file) => self.context_file = file,
            QaMsg::Submit(picker) => self.submit(ctx, picker),
            QaMsg::FileRead(picker, payload) => {
                self.apply(ctx, wrap_source(picker, ContentSource::File(payload)))
            }
            QaMsg::FileReadFailed(message) => {
                log::error!("{}", message);
                let before = self.marks();
                self.state.show_error(message);
                self.arm_timers(ctx, before);
            }
        }
        true
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        let entries = self.state.chat().len();
        if entries != self.rendered_entries {
            self.rendered_entries = entries;
            if let Some(el) = self.messages_ref.cast::<Element>() {
                el.set_scroll_top(el.scroll_height());
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let visibility = self.state.visibility();
        let banner = self
            .state
            .banner()
            .map(|b| AttrValue::from(b.message.clone()));

        html! {
            <div class="container">
                <header class="app-header">
                    <h1>{ "📚 Document Q&A" }</h1>
                    <p>{ "Ask questions about PDFs, images, web pages and text" }</p>
                </header>
                <ErrorBanner message={banner} />
                { if visibility.upload_section { self.view_upload(ctx) } else { html! {} } }
                { if visibility.processing { self.view_processing() } else { html! {} } }
                { if visibility.content_info { self.view_session(ctx) } else { html! {} } }
                { if visibility.context_modal { self.view_context_modal(ctx) } else { html! {} } }
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_text_follows_phase() {
        assert_eq!(
            processing_label(Phase::Processing(ProcessingKind::NewSession)),
            Some("Processing your content...")
        );
        assert_eq!(
            processing_label(Phase::Processing(ProcessingKind::Context)),
            Some("Adding context...")
        );
        assert_eq!(processing_label(Phase::Ready), None);
        assert_eq!(processing_label(Phase::Idle), None);
    }

    #[test]
    fn timers_only_for_new_ids() {
        // Nothing showing, nothing to arm
        assert_eq!(fresh_marks((None, None), (None, None)), (None, None));
        // A banner and pulse appear
        assert_eq!(fresh_marks((None, None), (Some(3), Some(4))), (Some(3), Some(4)));
        // Same ids still showing after an unrelated command
        assert_eq!(fresh_marks((Some(3), Some(4)), (Some(3), Some(4))), (None, None));
        // A replacement banner gets its own timer, the pulse does not
        assert_eq!(fresh_marks((Some(3), Some(4)), (Some(5), Some(4))), (Some(5), None));
        // A cleared mark needs nothing
        assert_eq!(fresh_marks((Some(3), Some(4)), (None, Some(6))), (None, Some(6)));
    }

    #[test]
    fn sources_route_by_picker() {
        let text = ContentSource::Text("x".into());
        assert_eq!(
            wrap_source(MethodPicker::Upload, text.clone()),
            Command::SubmitContent(text.clone())
        );
        assert_eq!(
            wrap_source(MethodPicker::Context, text.clone()),
            Command::AddContext(text)
        );
    }
}
