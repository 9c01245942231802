//! Chat log entries and answer provenance.

use serde::{Deserialize, Serialize};

use crate::api::{AddedContent, ContentSource};
use crate::markdown_lite;
use crate::protocol::PREVIEW_MAX_CHARS;

/// Where an answer came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnswerSource {
    /// The ingested document(s)
    Document,
    /// A live Google search
    GoogleSearch,
    /// Gemini's general knowledge, used when search is unavailable
    GeminiFallback,
    /// Transient tag of the "searching" placeholder
    WebSearch,
    /// Anything else, rendered verbatim
    Other(String),
}

impl AnswerSource {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "document" => AnswerSource::Document,
            "google_search" => AnswerSource::GoogleSearch,
            "gemini_fallback" => AnswerSource::GeminiFallback,
            "web-search" => AnswerSource::WebSearch,
            other => AnswerSource::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AnswerSource::Document => "document",
            AnswerSource::GoogleSearch => "google_search",
            AnswerSource::GeminiFallback => "gemini_fallback",
            AnswerSource::WebSearch => "web-search",
            AnswerSource::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AnswerSource::Document => "Your Document",
            AnswerSource::GoogleSearch => "Google Search",
            AnswerSource::GeminiFallback => "Gemini Knowledge",
            AnswerSource::WebSearch => "Web Search",
            AnswerSource::Other(raw) => raw,
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            AnswerSource::Document => Some("📄"),
            AnswerSource::GoogleSearch => Some("🌐"),
            AnswerSource::GeminiFallback => Some("🤖"),
            AnswerSource::WebSearch => Some("🔍"),
            AnswerSource::Other(_) => None,
        }
    }

    /// Label with its icon, e.g. "📄 Your Document"
    pub fn display_label(&self) -> String {
        match self.icon() {
            Some(icon) => format!("{} {}", icon, self.label()),
            None => self.label().to_string(),
        }
    }

    /// Only web answers get markdown-lite formatting
    pub fn uses_markup(&self) -> bool {
        matches!(self, AnswerSource::GoogleSearch | AnswerSource::GeminiFallback)
    }
}

impl From<String> for AnswerSource {
    fn from(raw: String) -> Self {
        AnswerSource::parse(&raw)
    }
}

impl From<AnswerSource> for String {
    fn from(source: AnswerSource) -> Self {
        source.as_str().to_string()
    }
}

/// Who authored an entry; also selects its styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    WebSearch,
    GeminiFallback,
}

impl Role {
    pub fn css_class(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::WebSearch => "web-search",
            Role::GeminiFallback => "gemini-fallback",
        }
    }

    /// Role of a final web-search answer
    pub fn for_web_answer(source: Option<&AnswerSource>) -> Self {
        match source {
            Some(AnswerSource::GoogleSearch) => Role::WebSearch,
            Some(AnswerSource::GeminiFallback) => Role::GeminiFallback,
            _ => Role::Assistant,
        }
    }
}

/// Where added context came from, for the confirmation entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOrigin {
    File(String),
    Url(String),
    Text,
}

impl ContextOrigin {
    pub fn icon(&self) -> &'static str {
        match self {
            ContextOrigin::File(_) => "📄",
            ContextOrigin::Url(_) => "🌐",
            ContextOrigin::Text => "📝",
        }
    }
}

impl From<&ContentSource> for ContextOrigin {
    fn from(source: &ContentSource) -> Self {
        match source {
            ContentSource::File(file) => ContextOrigin::File(file.name.clone()),
            ContentSource::Url(url) => ContextOrigin::Url(url.clone()),
            ContentSource::Text(_) => ContextOrigin::Text,
        }
    }
}

/// Confirmation shown after context was merged into a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextNotice {
    pub headline: String,
    pub stats: Option<String>,
    pub preview: Option<String>,
}

impl ContextNotice {
    pub fn new(origin: &ContextOrigin, added: Option<&AddedContent>) -> Self {
        let icon = origin.icon();
        match added {
            Some(added) => {
                let preview = &added.preview;
                Self {
                    headline: format!("{} Added: {}", icon, added.name),
                    stats: Some(format!(
                        "{} document(s), {} characters",
                        preview.document_count,
                        format_thousands(preview.character_count)
                    )),
                    preview: Some(truncate_chars(&preview.text_preview, PREVIEW_MAX_CHARS)),
                }
            }
            None => {
                let headline = match origin {
                    ContextOrigin::File(name) => format!("{} Added new file: {}", icon, name),
                    ContextOrigin::Url(url) => format!("{} Added content from: {}", icon, url),
                    ContextOrigin::Text => format!("{} Added additional text content", icon),
                };
                Self {
                    headline,
                    stats: None,
                    preview: None,
                }
            }
        }
    }

    pub fn to_plain_text(&self) -> String {
        let mut lines = vec![self.headline.clone()];
        lines.extend(self.stats.iter().cloned());
        lines.extend(self.preview.iter().cloned());
        lines.join("\n")
    }
}

/// Entry content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    /// Shown as-is; the renderer escapes it
    Plain(String),
    /// Output of [`markdown_lite::render`], safe to insert as markup
    Markup { raw: String, html: String },
    Context(ContextNotice),
}

impl EntryBody {
    /// Plain text for a source, or markup for the two web sources
    pub fn for_answer(text: String, source: Option<&AnswerSource>) -> Self {
        match source {
            Some(source) if source.uses_markup() => EntryBody::Markup {
                html: markdown_lite::render(&text),
                raw: text,
            },
            _ => EntryBody::Plain(text),
        }
    }

    pub fn to_plain_text(&self) -> String {
        match self {
            EntryBody::Plain(text) => text.clone(),
            EntryBody::Markup { raw, .. } => raw.clone(),
            EntryBody::Context(notice) => notice.to_plain_text(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub id: EntryId,
    pub role: Role,
    pub body: EntryBody,
    pub source: Option<AnswerSource>,
    /// Secondary line under the source, e.g. a fallback explanation
    pub note: Option<String>,
}

/// Ordered chat history.
///
/// Ids are never reused, even across [`ChatLog::clear`], so a stale id
/// can't remove a newer entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
    next_id: u64,
}

impl ChatLog {
    pub fn push(
        &mut self,
        role: Role,
        body: EntryBody,
        source: Option<AnswerSource>,
        note: Option<String>,
    ) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(ChatEntry {
            id,
            role,
            body,
            source,
            note,
        });
        id
    }

    pub fn remove(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format a count with commas (e.g., 1234567 -> "1,234,567")
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Cut `text` to `max` characters, marking the cut with "...".
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
