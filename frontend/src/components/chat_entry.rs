use shared::chat::{ChatEntry, ContextNotice, EntryBody, Role};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ChatEntryViewProps {
    pub entry: ChatEntry,
}

/// One message in the chat log
#[function_component(ChatEntryView)]
pub fn chat_entry_view(props: &ChatEntryViewProps) -> Html {
    let entry = &props.entry;
    let class = classes!("message", entry.role.css_class());

    html! {
        <div class={class}>
            <div class="message-content">
                { render_body(&entry.body) }
            </div>
            {
                if let Some(source) = entry.source.as_ref().filter(|_| entry.role != Role::User) {
                    html! {
                        <div class="message-source">
                            { format!("Source: {}", source.display_label()) }
                        </div>
                    }
                } else {
                    html! {}
                }
            }
            {
                if let Some(note) = &entry.note {
                    html! { <div class="message-note">{ note }</div> }
                } else {
                    html! {}
                }
            }
        </div>
    }
}

fn render_body(body: &EntryBody) -> Html {
    match body {
        EntryBody::Plain(text) => html! { <div class="message-text">{ text }</div> },
        // Already escaped by markdown_lite::render
        EntryBody::Markup { html, .. } => html! {
            <div class="message-text formatted">
                { Html::from_html_unchecked(AttrValue::from(html.clone())) }
            </div>
        },
        EntryBody::Context(notice) => render_notice(notice),
    }
}

fn render_notice(notice: &ContextNotice) -> Html {
    html! {
        <div class="context-added">
            <strong>{ &notice.headline }</strong>
            {
                if let Some(stats) = &notice.stats {
                    html! { <div class="context-stats">{ stats }</div> }
                } else {
                    html! {}
                }
            }
            {
                if let Some(preview) = &notice.preview {
                    html! {
                        <div class="context-preview">
                            <em>{ "Preview: " }</em>
                            { preview }
                        </div>
                    }
                } else {
                    html! {}
                }
            }
        </div>
    }
}
