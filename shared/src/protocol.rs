/// How long an error banner stays visible, in milliseconds.
pub const ERROR_BANNER_TIMEOUT_MS: u32 = 5_000;

/// How long the summary stays highlighted after it changes, in milliseconds.
pub const SUMMARY_PULSE_MS: u32 = 2_000;

/// Maximum characters of added-content preview text shown in the chat.
pub const PREVIEW_MAX_CHARS: usize = 300;

/// Text of the transient chat entry shown while a web search runs.
pub const SEARCHING_PLACEHOLDER: &str = "🔍 Searching the web...";

/// Source tag of chat entries generated by the client itself.
pub const SYSTEM_SOURCE: &str = "system";
