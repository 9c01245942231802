use web_sys::window;

/// Get the base HTTP URL (e.g., "http://localhost:8000" or "https://docs.example.com")
pub fn get_base_url() -> String {
    let Some(window) = window() else {
        return "http://localhost:8000".to_string();
    };
    let location = window.location();

    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let host = location
        .host()
        .unwrap_or_else(|_| "localhost:8000".to_string());

    format!("{}//{}", protocol, host)
}

/// Read a picked file into memory
pub async fn read_file(file: &web_sys::File) -> Result<shared::api::FilePayload, String> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| format!("Failed to read file: {}", file.name()))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let content_type = file.type_();

    Ok(shared::api::FilePayload {
        name: file.name(),
        content_type: (!content_type.is_empty()).then_some(content_type),
        bytes,
    })
}

/// First file of a file input, if one is picked
pub fn first_file(input: &web_sys::HtmlInputElement) -> Option<web_sys::File> {
    input.files().and_then(|files| files.get(0))
}
