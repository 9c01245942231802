//! Interactive chat loop over a [`Controller`].

use anyhow::{Context, Result};
use shared::api::{ContentSource, FilePayload};
use shared::state::{Command, Phase};
use shared::Controller;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::NativeApiClient;
use crate::ui::{self, StatePrinter};

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    NewFile(String),
    NewUrl(String),
    NewText(String),
    AddFile(String),
    AddUrl(String),
    AddText(String),
    Summary,
    Restart,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatInput::Empty;
        }
        if matches!(line, "quit" | "exit") {
            return ChatInput::Quit;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return ChatInput::Question(line.to_string());
        };

        let (command, arg) = match rest.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim().to_string()),
            None => (rest, String::new()),
        };
        match command {
            "file" => ChatInput::NewFile(arg),
            "url" => ChatInput::NewUrl(arg),
            "text" => ChatInput::NewText(arg),
            "add-file" => ChatInput::AddFile(arg),
            "add-url" => ChatInput::AddUrl(arg),
            "add-text" => ChatInput::AddText(arg),
            "summary" => ChatInput::Summary,
            "restart" => ChatInput::Restart,
            "help" => ChatInput::Help,
            "quit" | "exit" => ChatInput::Quit,
            other => ChatInput::Unknown(other.to_string()),
        }
    }
}

/// Answer to the web-search offer. Anything but yes declines.
pub fn accepts_web_search(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Read a file from disk into an upload payload
pub async fn load_file(path: &Path) -> Result<FilePayload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FilePayload {
        name,
        content_type: mime_guess::from_path(path).first().map(|m| m.to_string()),
        bytes,
    })
}

/// Load a file named on the chat line, reporting problems inline
async fn pick_file(path: &str) -> Option<FilePayload> {
    if path.is_empty() {
        ui::print_error("Please select a file");
        return None;
    }
    match load_file(Path::new(path)).await {
        Ok(file) => Some(file),
        Err(e) => {
            ui::print_error(&format!("{:#}", e));
            None
        }
    }
}

/// Chat until the user quits or stdin closes.
pub async fn run(client: NativeApiClient, initial: ContentSource) -> Result<()> {
    ui::print_chat_banner(client.base_url());

    let mut controller = Controller::new(client);
    let mut printer = StatePrinter::default();

    ui::print_processing("Processing content...");
    controller.handle(Command::SubmitContent(initial)).await;
    printer.flush(controller.state());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let awaiting = controller.state().phase() == Phase::AwaitingWebSearch;
        ui::prompt(if awaiting { "web?>" } else { "ask>" });

        let Some(line) = lines.next_line().await? else {
            break;
        };

        if awaiting {
            if accepts_web_search(&line) {
                ui::print_searching();
                controller.handle(Command::ResolveWebSearch).await;
            } else {
                controller.handle(Command::DismissWebSearch).await;
            }
            printer.flush(controller.state());
            continue;
        }

        let command = match ChatInput::parse(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Help => {
                ui::print_help();
                continue;
            }
            ChatInput::Unknown(name) => {
                ui::print_error(&format!("Unknown command: /{}", name));
                continue;
            }
            ChatInput::Restart => {
                controller.handle(Command::Restart).await;
                ui::print_restarted();
                continue;
            }
            ChatInput::Question(question) => {
                if controller.state().session_id().is_none() {
                    ui::print_error("No active session. Start one with /file, /url or /text");
                    continue;
                }
                Command::AskQuestion(question)
            }
            ChatInput::Summary => Command::RefreshSummary,
            ChatInput::NewUrl(url) => Command::SubmitContent(ContentSource::Url(url)),
            ChatInput::NewText(text) => Command::SubmitContent(ContentSource::Text(text)),
            ChatInput::AddUrl(url) => Command::AddContext(ContentSource::Url(url)),
            ChatInput::AddText(text) => Command::AddContext(ContentSource::Text(text)),
            ChatInput::NewFile(path) => match pick_file(&path).await {
                Some(file) => Command::SubmitContent(ContentSource::File(file)),
                None => continue,
            },
            ChatInput::AddFile(path) => match pick_file(&path).await {
                Some(file) => Command::AddContext(ContentSource::File(file)),
                None => continue,
            },
        };

        match &command {
            Command::SubmitContent(_) => ui::print_processing("Processing content..."),
            Command::AddContext(_) => ui::print_processing("Adding context..."),
            _ => {}
        }
        controller.handle(command).await;
        printer.flush(controller.state());
    }

    println!("Goodbye!");
    Ok(())
}
