//! File / URL / text picker shared by the upload panel and the context modal.

use shared::api::SourceKind;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::utils;

#[derive(Properties, PartialEq, Clone)]
pub struct SourceInputsProps {
    pub method: SourceKind,
    pub url: AttrValue,
    pub text: AttrValue,
    pub on_method: Callback<SourceKind>,
    pub on_url: Callback<String>,
    pub on_text: Callback<String>,
    pub on_file: Callback<Option<web_sys::File>>,
    #[prop_or_default]
    pub disabled: bool,
}

const METHODS: [(SourceKind, &str); 3] = [
    (SourceKind::File, "📄 File"),
    (SourceKind::Url, "🌐 URL"),
    (SourceKind::Text, "📝 Text"),
];

#[function_component(SourceInputs)]
pub fn source_inputs(props: &SourceInputsProps) -> Html {
    let tabs = METHODS.iter().map(|(kind, label)| {
        let kind = *kind;
        let on_method = props.on_method.clone();
        let class = classes!("method-tab", (props.method == kind).then_some("active"));
        html! {
            <button
                type="button"
                class={class}
                disabled={props.disabled}
                onclick={move |_| on_method.emit(kind)}
            >
                { *label }
            </button>
        }
    });

    let input = match props.method {
        SourceKind::File => {
            let on_file = props.on_file.clone();
            let onchange = Callback::from(move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                on_file.emit(utils::first_file(&input));
            });
            html! {
                <input
                    type="file"
                    class="file-input"
                    accept=".pdf,.png,.jpg,.jpeg,.gif,.bmp,.tif,.tiff,.webp"
                    disabled={props.disabled}
                    {onchange}
                />
            }
        }
        SourceKind::Url => {
            let on_url = props.on_url.clone();
            let oninput = Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                on_url.emit(input.value());
            });
            html! {
                <input
                    type="url"
                    class="url-input"
                    placeholder="https://example.com/article"
                    value={props.url.clone()}
                    disabled={props.disabled}
                    {oninput}
                />
            }
        }
        SourceKind::Text => {
            let on_text = props.on_text.clone();
            let oninput = Callback::from(move |e: InputEvent| {
                let area: HtmlTextAreaElement = e.target_unchecked_into();
                on_text.emit(area.value());
            });
            html! {
                <textarea
                    class="text-input"
                    rows="8"
                    placeholder="Paste or type your text here..."
                    value={props.text.clone()}
                    disabled={props.disabled}
                    {oninput}
                />
            }
        }
    };

    html! {
        <div class="source-inputs">
            <div class="method-tabs">{ for tabs }</div>
            <div class="method-input">{ input }</div>
        </div>
    }
}
