mod client;
mod components;
mod pages;
pub mod utils;

use pages::qa::QaPage;
use yew::prelude::*;

#[function_component(App)]
fn app() -> Html {
    html! { <QaPage /> }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
