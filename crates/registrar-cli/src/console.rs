//! Terminal implementations of the transport traits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use colored::Colorize;
use registrar_core::error::{RegistrarError, Result};
use registrar_core::transport::{
    Attachment, Choices, FileFetcher, Outbound, Payload, SubjectId, Transport,
};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Prints outbound messages to stdout.
///
/// Messages for the identity currently typing are shown in full and their
/// choices are remembered so `#n` can pick one. Messages for anyone else
/// (relayed contact messages) are shown with the recipient in front.
pub struct ConsoleTransport {
    local: RwLock<SubjectId>,
    last_choices: Mutex<Choices>,
}

impl ConsoleTransport {
    pub fn new(local: SubjectId) -> Self {
        Self {
            local: RwLock::new(local),
            last_choices: Mutex::new(Choices::None),
        }
    }

    pub async fn switch(&self, subject: SubjectId) {
        *self.local.write().await = subject;
        *self.last_choices.lock().await = Choices::None;
    }

    pub async fn local(&self) -> SubjectId {
        *self.local.read().await
    }

    /// Turns `#n` (1-based) into the payload the chosen key or button sends.
    pub async fn choose(&self, index: usize) -> Option<Payload> {
        let slot = index.checked_sub(1)?;
        match &*self.last_choices.lock().await {
            Choices::None => None,
            Choices::Keyboard(keys) => keys.get(slot).cloned().map(Payload::Text),
            Choices::Buttons(buttons) => buttons.get(slot).map(|b| Payload::Action(b.action)),
        }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, to: SubjectId, message: Outbound) -> Result<()> {
        let lines = render(&message);
        if to == self.local().await {
            for line in &lines {
                println!("{}", line.bright_blue());
            }
            if let Outbound::Text { choices, .. } = message {
                if !matches!(choices, Choices::None) {
                    *self.last_choices.lock().await = choices;
                }
            }
        } else {
            println!("{}", format!("[to {}]", to).bright_magenta());
            for line in &lines {
                println!("{}", line.magenta());
            }
        }
        println!();
        Ok(())
    }
}

/// Plain-text rendering of one message, choices numbered from 1.
pub fn render(message: &Outbound) -> Vec<String> {
    match message {
        Outbound::Text { body, choices } => {
            let mut lines: Vec<String> = body.lines().map(str::to_string).collect();
            match choices {
                Choices::None => {}
                Choices::Keyboard(keys) => lines.extend(
                    keys.iter()
                        .enumerate()
                        .map(|(i, key)| format!("  #{} {}", i + 1, key)),
                ),
                Choices::Buttons(buttons) => lines.extend(
                    buttons
                        .iter()
                        .enumerate()
                        .map(|(i, button)| format!("  #{} [{}]", i + 1, button.label)),
                ),
            }
            lines
        }
        Outbound::Document { path, caption } => {
            vec![caption.clone(), format!("  file: {}", path.display())]
        }
    }
}

/// Serves attachments from local paths registered by the REPL.
#[derive(Default)]
pub struct LocalFileFetcher {
    files: RwLock<HashMap<String, PathBuf>>,
}

impl LocalFileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` under a fresh attachment id.
    pub async fn register(&self, path: &Path) -> Attachment {
        let file_id = Uuid::new_v4().to_string();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        self.files
            .write()
            .await
            .insert(file_id.clone(), path.to_path_buf());
        Attachment::new(file_id, file_name)
    }
}

#[async_trait]
impl FileFetcher for LocalFileFetcher {
    async fn fetch(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        let path = self
            .files
            .read()
            .await
            .get(&attachment.file_id)
            .cloned()
            .ok_or_else(|| RegistrarError::not_found("Attachment", attachment.file_id.clone()))?;
        Ok(tokio::fs::read(&path).await?)
    }
}
