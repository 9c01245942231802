use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ErrorBannerProps {
    /// Nothing is rendered when absent
    #[prop_or_default]
    pub message: Option<AttrValue>,
}

#[function_component(ErrorBanner)]
pub fn error_banner(props: &ErrorBannerProps) -> Html {
    match &props.message {
        Some(message) => html! {
            <div class="error-banner" role="alert">
                <span class="error-icon">{ "⚠️" }</span>
                <span class="error-text">{ message.clone() }</span>
            </div>
        },
        None => html! {},
    }
}
