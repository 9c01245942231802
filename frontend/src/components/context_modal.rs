use shared::api::SourceKind;
use yew::prelude::*;

use super::source_inputs::SourceInputs;

#[derive(Properties, PartialEq, Clone)]
pub struct ContextModalProps {
    pub method: SourceKind,
    pub url: AttrValue,
    pub text: AttrValue,
    pub on_method: Callback<SourceKind>,
    pub on_url: Callback<String>,
    pub on_text: Callback<String>,
    pub on_file: Callback<Option<web_sys::File>>,
    pub on_submit: Callback<()>,
    pub on_close: Callback<()>,
}

/// Dialog for adding more content to the active session
#[function_component(ContextModal)]
pub fn context_modal(props: &ContextModalProps) -> Html {
    let on_overlay_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let on_dialog_click = Callback::from(|e: MouseEvent| {
        e.stop_propagation();
    });
    let on_close = props.on_close.clone();
    let on_cancel = props.on_close.clone();
    let on_submit = props.on_submit.clone();

    html! {
        <div class="modal-overlay" onclick={on_overlay_click}>
            <div class="modal" onclick={on_dialog_click}>
                <div class="modal-header">
                    <h2>{ "Add Context" }</h2>
                    <button class="modal-close" onclick={move |_| on_close.emit(())}>
                        { "×" }
                    </button>
                </div>
                <p class="modal-hint">
                    { "Add another file, web page or text to this session." }
                </p>
                <SourceInputs
                    method={props.method}
                    url={props.url.clone()}
                    text={props.text.clone()}
                    on_method={props.on_method.clone()}
                    on_url={props.on_url.clone()}
                    on_text={props.on_text.clone()}
                    on_file={props.on_file.clone()}
                />
                <div class="modal-actions">
                    <button class="secondary" onclick={move |_| on_cancel.emit(())}>
                        { "Cancel" }
                    </button>
                    <button class="primary" onclick={move |_| on_submit.emit(())}>
                        { "Add Context" }
                    </button>
                </div>
            </div>
        </div>
    }
}
