//! Interactive console session against the conversation service.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use registrar_application::assemble;
use registrar_core::transport::{InboundEvent, Payload, SubjectId};
use registrar_infrastructure::{RegistrarConfig, SqliteStore};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::console::{ConsoleTransport, LocalFileFetcher};

const COMMANDS: [&str; 5] = ["/start", "/photo", "/doc", "/as", "/help"];

/// Completion, highlighting and hints for console commands.
struct ChatHelper;

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') || line.starts_with('#') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ChatHelper {}

/// One parsed line of console input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Help,
    Send(String),
    Photo(PathBuf),
    Document(PathBuf),
    Choose(usize),
    SwitchUser { id: i64, name: Option<String> },
    Invalid(&'static str),
}

fn parse_line(line: &str) -> Input {
    if line == "quit" || line == "exit" {
        return Input::Quit;
    }
    if line == "/help" {
        return Input::Help;
    }
    if let Some(index) = line.strip_prefix('#') {
        return match index.trim().parse() {
            Ok(index) => Input::Choose(index),
            Err(_) => Input::Invalid("usage: #<number>"),
        };
    }
    if let Some(path) = line.strip_prefix("/photo ") {
        return Input::Photo(PathBuf::from(path.trim()));
    }
    if let Some(path) = line.strip_prefix("/doc ") {
        return Input::Document(PathBuf::from(path.trim()));
    }
    if let Some(rest) = line.strip_prefix("/as ") {
        let mut parts = rest.trim().splitn(2, ' ');
        return match parts.next().and_then(|id| id.parse().ok()) {
            Some(id) => Input::SwitchUser {
                id,
                name: parts.next().map(|name| name.trim().to_string()),
            },
            None => Input::Invalid("usage: /as <id> [name]"),
        };
    }
    Input::Send(line.to_string())
}

fn print_help() {
    println!("{}", "Type text to send it, '#n' to press choice n.".bright_black());
    println!("{}", "/photo <path>, /doc <path>   send a file".bright_black());
    println!("{}", "/as <id> [name]              continue as another user".bright_black());
    println!("{}", "quit                         leave".bright_black());
    println!();
}

pub async fn run(
    config: &RegistrarConfig,
    store: SqliteStore,
    id: i64,
    name: String,
) -> Result<()> {
    let transport = Arc::new(ConsoleTransport::new(SubjectId(id)));
    let fetcher = Arc::new(LocalFileFetcher::new());
    let service = assemble(config, Arc::new(store), transport.clone(), fetcher.clone());

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ChatHelper));

    tracing::info!("[Chat] Console session started as {} ({})", id, name);
    println!("{}", "=== Registrar console ===".bright_magenta().bold());
    print_help();

    let mut display_name = name;
    loop {
        let subject = transport.local().await;
        let readline = rl.readline(&format!("{}> ", subject));

        let line = match readline {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                tracing::error!("[Chat] Readline failed: {:?}", err);
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(&line);

        let payload = match parse_line(trimmed) {
            Input::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Input::Help => {
                print_help();
                continue;
            }
            Input::Invalid(usage) => {
                println!("{}", usage.yellow());
                continue;
            }
            Input::SwitchUser { id, name } => {
                tracing::debug!("[Chat] Switching console identity {} -> {}", subject, id);
                transport.switch(SubjectId(id)).await;
                if let Some(name) = name {
                    display_name = name;
                }
                println!("{}", format!("Now chatting as {} ({})", display_name, id).bright_black());
                continue;
            }
            Input::Choose(index) => match transport.choose(index).await {
                Some(payload) => payload,
                None => {
                    println!("{}", format!("No choice #{}", index).yellow());
                    continue;
                }
            },
            Input::Photo(path) => {
                tracing::debug!("[Chat] Attaching photo {}", path.display());
                Payload::Photo(fetcher.register(&path).await)
            }
            Input::Document(path) => {
                tracing::debug!("[Chat] Attaching document {}", path.display());
                Payload::Document(fetcher.register(&path).await)
            }
            Input::Send(text) => Payload::Text(text),
        };

        let event = InboundEvent {
            subject,
            display_name: display_name.clone(),
            payload,
        };
        if let Err(e) = service.handle(event).await {
            tracing::error!("[Chat] Event from {} failed: {:#}", subject, e);
            eprintln!("{}", format!("Error: {:#}", e).red());
        }
    }

    tracing::info!("[Chat] Console session ended");
    Ok(())
}
