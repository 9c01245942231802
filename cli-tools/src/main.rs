//! docqa - command-line client for the document Q&A service
//!
//! One-shot subcommands map onto the service endpoints; `chat` runs the
//! same session flow as the web page in the terminal.

mod chat;
mod client;
mod config;
mod ui;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use shared::api::{
    BackendResponse, ContentSource, DocQaApi, QueryRequest, SearchWebRequest, SessionId,
};
use shared::chat::{AnswerSource, ContextNotice, ContextOrigin};
use shared::state::{validation_message, RequestKind};
use std::path::PathBuf;

use client::NativeApiClient;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about documents, web pages and text", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "DOCQA_SERVER")]
    server: Option<String>,

    /// Output format
    #[arg(short, long)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Table,
}

/// Exactly one piece of content
#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// PDF or image file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Web page address
    #[arg(long)]
    url: Option<String>,
    /// Literal text
    #[arg(long)]
    text: Option<String>,
}

impl SourceArgs {
    async fn into_source(self) -> Result<ContentSource> {
        let source = match (self.file, self.url, self.text) {
            (Some(path), _, _) => ContentSource::File(chat::load_file(&path).await?),
            (_, Some(url), _) => ContentSource::Url(url),
            (_, _, Some(text)) => ContentSource::Text(text),
            _ => bail!("Provide one of --file, --url or --text"),
        };
        let kind = source.kind();
        match source.normalized() {
            Some(source) => Ok(source),
            None => bail!("{}", validation_message(kind)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session from content and print its summary
    Upload {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Ask a question about a session's content
    Ask {
        /// Session ID from `upload`
        #[arg(long)]
        session: String,
        question: String,
    },

    /// Answer a question from the web
    SearchWeb { question: String },

    /// Add more content to a session
    AddContext {
        /// Session ID from `upload`
        #[arg(long)]
        session: String,
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the current summary of a session
    Summary {
        /// Session ID from `upload`
        #[arg(long)]
        session: String,
    },

    /// Upload content and chat about it interactively
    Chat {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Turn a `success: false` reply into an error
fn ensure_success<R: BackendResponse>(resp: &R, fallback: &str) -> Result<()> {
    if resp.success() {
        return Ok(());
    }
    match resp.error() {
        Some(msg) if !msg.is_empty() => bail!("{}", msg),
        _ => bail!("{}", fallback),
    }
}

fn nonblank_question(question: &str) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        bail!("Please enter a question");
    }
    Ok(question.to_string())
}

fn print_answer(answer: &str, source: Option<&str>, message: Option<&str>) {
    println!("{}", answer);
    if let Some(source) = source {
        let source = AnswerSource::parse(source);
        println!("  {} {}", "Source:".dimmed(), source.display_label().dimmed());
    }
    if let Some(message) = message {
        println!("  {}", message.yellow());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_config();

    let server = config.resolve_server(cli.server);
    let format = cli
        .format
        .or_else(|| {
            config
                .output
                .as_deref()
                .and_then(|s| OutputFormat::from_str(s, true).ok())
        })
        .unwrap_or_default();
    tracing::debug!("Using server {} with {:?} output", server, format);

    let client = NativeApiClient::new(&server);

    match cli.command {
        Commands::Upload { source } => {
            let source = source.into_source().await?;
            let kind = RequestKind::Upload(source.kind());
            let resp = client.upload(&source).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
                return Ok(());
            }
            ensure_success(&resp, kind.fallback_error())?;
            let Some(session_id) = resp.session_id else {
                bail!("Server did not return a session id");
            };
            ui::print_session(&session_id, resp.summary.as_deref().unwrap_or_default());
        }

        Commands::Ask { session, question } => {
            let req = QueryRequest {
                session_id: SessionId::new(session),
                question: nonblank_question(&question)?,
            };
            let resp = client.query(&req).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
                return Ok(());
            }
            ensure_success(&resp, RequestKind::Query.fallback_error())?;
            print_answer(
                resp.answer.as_deref().unwrap_or_default(),
                resp.source.as_deref(),
                None,
            );
            if resp.not_found && resp.can_search_web {
                println!();
                println!(
                    "{} Not found in the document. Try {}",
                    "?".bright_yellow(),
                    format!("docqa search-web \"{}\"", req.question).bright_cyan()
                );
            }
        }

        Commands::SearchWeb { question } => {
            let question = nonblank_question(&question)?;
            let resp = client.search_web(&SearchWebRequest { question }).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
                return Ok(());
            }
            ensure_success(&resp, RequestKind::SearchWeb.fallback_error())?;
            print_answer(
                resp.answer.as_deref().unwrap_or_default(),
                resp.source.as_deref(),
                resp.message.as_deref(),
            );
        }

        Commands::AddContext { session, source } => {
            let source = source.into_source().await?;
            let origin = ContextOrigin::from(&source);
            let resp = client
                .add_context(&SessionId::new(session), &source)
                .await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
                return Ok(());
            }
            ensure_success(&resp, RequestKind::AddContext(origin.clone()).fallback_error())?;
            match (format, resp.added_content.as_ref()) {
                (OutputFormat::Table, Some(added)) => println!("{}", ui::added_table(added)),
                (_, added) => {
                    let notice = ContextNotice::new(&origin, added);
                    println!("{}", notice.to_plain_text());
                }
            }
            if let Some(summary) = resp.summary.as_deref() {
                ui::print_summary_updated(summary);
            }
        }

        Commands::Summary { session } => {
            let resp = client.session_summary(&SessionId::new(session)).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
                return Ok(());
            }
            ensure_success(&resp, RequestKind::Summary.fallback_error())?;
            println!("{}", resp.summary.unwrap_or_default());
        }

        Commands::Chat { source } => {
            let source = source.into_source().await?;
            chat::run(client, source).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::api::QueryResponse;

    #[test]
    fn cli_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["docqa", "upload", "--url", "https://a.b"]).is_ok());
        assert!(Cli::try_parse_from(["docqa", "upload"]).is_err());
        assert!(
            Cli::try_parse_from(["docqa", "upload", "--url", "https://a.b", "--text", "x"]).is_err()
        );
    }

    #[test]
    fn cli_parses_session_commands() {
        let cli = Cli::try_parse_from([
            "docqa", "--format", "json", "ask", "--session", "s1", "what is it?",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Ask { session, question } => {
                assert_eq!(session, "s1");
                assert_eq!(question, "what is it?");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn blank_question_is_rejected_before_sending() {
        let cli = Cli::try_parse_from(["docqa", "ask", "--session", "s1", "  \t "]).unwrap();
        let Commands::Ask { question, .. } = cli.command else {
            panic!("expected ask");
        };
        let err = nonblank_question(&question).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a question");

        assert_eq!(nonblank_question("  what is it? ").unwrap(), "what is it?");
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_sending() {
        let args = SourceArgs {
            file: None,
            url: None,
            text: Some("   ".into()),
        };
        assert!(args.into_source().await.is_err());
    }

    #[test]
    fn failure_uses_backend_message_or_fallback() {
        let with_message = QueryResponse {
            success: false,
            error: Some("Invalid session_id".into()),
            ..Default::default()
        };
        let err = ensure_success(&with_message, "Failed to get answer").unwrap_err();
        assert_eq!(err.to_string(), "Invalid session_id");

        let bare = QueryResponse::default();
        let err = ensure_success(&bare, "Failed to get answer").unwrap_err();
        assert_eq!(err.to_string(), "Failed to get answer");

        let ok = QueryResponse {
            success: true,
            ..Default::default()
        };
        assert!(ensure_success(&ok, "unused").is_ok());
    }
}
