//! Terminal rendering for the `docqa` CLI.

use colored::Colorize;
use shared::api::{AddedContent, SessionId};
use shared::chat::{format_thousands, ChatEntry, EntryBody, EntryId, Role};
use shared::state::Phase;
use shared::ViewState;
use std::io::Write;
use tabled::{Table, Tabled};

/// Print the chat welcome banner
pub fn print_chat_banner(server: &str) {
    println!();
    println!("{}", "╭──────────────────────────────────────╮".bright_blue());
    println!("{}", "│          Document Q&A Chat           │".bright_blue());
    println!("{}", "╰──────────────────────────────────────╯".bright_blue());
    println!("  {} {}", "Server:".dimmed(), server.bright_white());
    println!(
        "  Type a question, {} for commands, {} to leave.",
        "/help".bright_yellow(),
        "/quit".bright_yellow()
    );
    println!();
}

pub fn print_help() {
    let rows = [
        ("/file <path>", "Start a new session from a PDF or image"),
        ("/url <address>", "Start a new session from a web page"),
        ("/text <content>", "Start a new session from text"),
        ("/add-file <path>", "Add a file to the current session"),
        ("/add-url <address>", "Add a web page to the current session"),
        ("/add-text <content>", "Add text to the current session"),
        ("/summary", "Reload the session summary"),
        ("/restart", "Drop the session and start over"),
        ("/quit", "Leave the chat"),
    ];
    for (command, help) in rows {
        println!("  {:<22} {}", command.bright_cyan(), help.dimmed());
    }
}

pub fn print_processing(what: &str) {
    println!("{} {}", "⏳".yellow(), what.dimmed());
}

pub fn print_searching() {
    println!("{}", shared::protocol::SEARCHING_PLACEHOLDER.bright_blue());
}

pub fn print_session(session_id: &SessionId, summary: &str) {
    println!();
    println!("{} {}", "✓ Session".green().bold(), session_id.as_str().bright_cyan());
    print_summary_body(summary);
}

pub fn print_summary_updated(summary: &str) {
    println!("{}", "✨ Summary updated".bright_magenta());
    print_summary_body(summary);
}

fn print_summary_body(summary: &str) {
    println!("  {}", "Content summary:".dimmed());
    for line in summary.lines() {
        println!("    {}", line);
    }
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_restarted() {
    println!(
        "{} Session cleared. Start again with {}, {} or {}.",
        "↺".bright_yellow(),
        "/file".bright_cyan(),
        "/url".bright_cyan(),
        "/text".bright_cyan()
    );
}

pub fn print_web_search_offer() {
    println!(
        "{} {}",
        "?".bright_yellow().bold(),
        "Not found in your document. Search the web instead? [y/N]".bright_yellow()
    );
}

/// Show the input prompt without a newline
pub fn prompt(label: &str) {
    print!("{} ", label.bright_green().bold());
    let _ = std::io::stdout().flush();
}

/// Print one chat entry. User entries are skipped since the user just typed them.
pub fn print_entry(entry: &ChatEntry) {
    if entry.role == Role::User {
        return;
    }

    match &entry.body {
        EntryBody::Context(notice) => {
            println!("{}", notice.headline.green());
            if let Some(stats) = &notice.stats {
                println!("  {}", stats.dimmed());
            }
            if let Some(preview) = &notice.preview {
                println!("  {}", preview.italic());
            }
        }
        body => {
            let text = body.to_plain_text();
            match entry.role {
                Role::WebSearch => println!("{}", text.bright_blue()),
                Role::GeminiFallback => println!("{}", text.bright_magenta()),
                _ => println!("{}", text),
            }
            if let Some(source) = &entry.source {
                println!("  {} {}", "Source:".dimmed(), source.display_label().dimmed());
            }
        }
    }
    if let Some(note) = &entry.note {
        println!("  {}", note.yellow());
    }
    println!();
}

#[derive(Tabled)]
struct AddedRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Documents")]
    documents: u64,
    #[tabled(rename = "Characters")]
    characters: String,
}

/// Table view of newly added content
pub fn added_table(added: &AddedContent) -> String {
    let row = AddedRow {
        name: added.name.clone(),
        kind: added.content_type.clone().unwrap_or_else(|| "-".into()),
        documents: added.preview.document_count,
        characters: format_thousands(added.preview.character_count),
    };
    Table::new([row]).to_string()
}

/// Prints what changed in a [`ViewState`] since the last call.
///
/// Tracks the last seen entry, banner, summary highlight and session so
/// each is shown once.
#[derive(Debug, Default)]
pub struct StatePrinter {
    last_entry: Option<EntryId>,
    last_banner: Option<u64>,
    last_pulse: Option<u64>,
    last_session: Option<SessionId>,
}

impl StatePrinter {
    pub fn flush(&mut self, state: &ViewState) {
        if state.session_id() != self.last_session.as_ref() {
            self.last_session = state.session_id().cloned();
            if let Some(id) = &self.last_session {
                print_session(id, state.summary().unwrap_or_default());
            }
        }

        for entry in self.unseen(state) {
            print_entry(entry);
        }
        if let Some(last) = state.chat().last() {
            self.last_entry = Some(last.id);
        }

        if let Some(banner) = state.banner() {
            if self.last_banner != Some(banner.id) {
                self.last_banner = Some(banner.id);
                print_error(&banner.message);
            }
        }

        if let Some(pulse) = state.summary_pulse() {
            if self.last_pulse != Some(pulse) {
                self.last_pulse = Some(pulse);
                print_summary_updated(state.summary().unwrap_or_default());
            }
        }

        if state.phase() == Phase::AwaitingWebSearch {
            print_web_search_offer();
        }
    }

    fn unseen<'a>(&self, state: &'a ViewState) -> impl Iterator<Item = &'a ChatEntry> {
        let last = self.last_entry;
        state
            .chat()
            .entries()
            .iter()
            .filter(move |e| last.map_or(true, |last| e.id > last))
    }
}
