mod chat_entry;
mod context_modal;
mod error_banner;
mod source_inputs;

pub use chat_entry::ChatEntryView;
pub use context_modal::ContextModal;
pub use error_banner::ErrorBanner;
pub use source_inputs::SourceInputs;
