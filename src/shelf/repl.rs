//! Interactive terminal browser for a shelf.

use std::io::{self, BufRead, Write};
use std::path::Path;

use async_trait::async_trait;

use super::api::{Shelf, ShelfResult};
use crate::gateway::RawFile;
use crate::ops::{Confirmation, Notification, Notifier, Severity};

/// Notifier that prints outcomes to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => println!("{}", notification.message),
            Severity::Error => eprintln!("error: {}", notification.message),
        }
    }
}

/// Confirmation prompt reading a y/N answer from stdin.
///
/// Anything but an explicit yes counts as a dismissal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

#[async_trait]
impl Confirmation for StdinConfirm {
    async fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Prompt string.
    pub prompt: String,
    /// Max entries to display per listing.
    pub max_entries: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            prompt: "docshelf> ".into(),
            max_entries: 100,
        }
    }
}

/// The interactive browser loop.
pub struct Browser {
    shelf: Shelf,
    config: BrowserConfig,
}

impl Browser {
    /// Create a new browser over the given shelf.
    pub fn new(shelf: Shelf) -> Self {
        Self {
            shelf,
            config: BrowserConfig::default(),
        }
    }

    /// Create a browser with custom configuration.
    pub fn with_config(shelf: Shelf, config: BrowserConfig) -> Self {
        Self { shelf, config }
    }

    /// Run the browser interactively.
    pub async fn run(&mut self) -> ShelfResult<()> {
        self.print_banner();
        self.shelf.refresh().await?;
        self.list_entries();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("{}", self.config.prompt);
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF.
                println!("\nGoodbye!");
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let command = parts.next().unwrap_or_default().to_lowercase();
            let args: Vec<&str> = parts.collect();

            match command.as_str() {
                "help" | "h" | "?" => self.print_help(),
                "quit" | "exit" | "q" => break,
                "list" | "ls" => {
                    self.shelf.refresh().await?;
                    self.list_entries();
                }
                "open" | "show" => self.cmd_open(&args).await,
                "next" | "n" => self.cmd_next().await,
                "prev" | "p" | "previous" => self.cmd_previous().await,
                "edit" => self.cmd_edit(),
                "save" => self.cmd_save().await,
                "cancel" => self.cmd_cancel().await,
                "new" => self.cmd_new(&args).await,
                "upload" => self.cmd_upload(&args).await,
                "delete" | "rm" => self.cmd_delete().await,
                "close" => {
                    self.shelf.navigator().close();
                    println!("Viewer closed.");
                }
                other => {
                    eprintln!("Unknown command: {}", other);
                    eprintln!("Type help for available commands");
                }
            }
        }

        Ok(())
    }

    fn print_banner(&self) {
        println!("╔═══════════════════════════════════════════════════╗");
        println!("║                  docshelf v0.1.0                  ║");
        println!("║       Browse, edit and sync markdown notes        ║");
        println!("╠═══════════════════════════════════════════════════╣");
        println!("║   Type help for commands, list to see documents   ║");
        println!("╚═══════════════════════════════════════════════════╝");
        println!();
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  help, h, ?              Show this help message");
        println!("  quit, exit, q           Exit the browser");
        println!("  list, ls                Refresh and list documents");
        println!("  open <n>                Open document at index n");
        println!("  next, n / prev, p       Step through the list");
        println!("  edit                    Edit the open document (end input with a lone .)");
        println!("  save / cancel           Finish or abandon the edit");
        println!("  new <name>              Create a document (end input with a lone .)");
        println!("  upload <path> [..]      Upload files from disk");
        println!("  delete, rm              Delete the open document (asks first)");
        println!("  close                   Close the viewer");
    }

    fn list_entries(&self) {
        let entries = self.shelf.entries();
        if entries.is_empty() {
            println!("No documents.");
            return;
        }

        println!("{:>4}  {:>5}  {}", "#", "id", "name");
        for (i, entry) in entries.iter().take(self.config.max_entries).enumerate() {
            println!("{:>4}  {:>5}  {}", i, entry.id, entry.name);
        }
        if entries.len() > self.config.max_entries {
            println!("... ({} more)", entries.len() - self.config.max_entries);
        }
        println!("({} documents)", entries.len());
    }

    fn print_open_document(&mut self) {
        if let Some(entry) = self.shelf.navigator().current_entry() {
            let nav = self.shelf.navigator();
            println!("--- {} ---", entry.name);
            if let Some(content) = nav.content() {
                println!("{}", content);
            }
            let mut hints = Vec::new();
            if nav.has_previous() {
                hints.push("prev");
            }
            if nav.has_next() {
                hints.push("next");
            }
            if !hints.is_empty() {
                println!("--- ({} available) ---", hints.join(", "));
            } else {
                println!("---");
            }
        }
    }

    async fn cmd_open(&mut self, args: &[&str]) {
        let Some(index) = args.first().and_then(|a| a.parse::<usize>().ok()) else {
            eprintln!("Usage: open <index>");
            return;
        };

        if self.shelf.navigator().select(index).await {
            self.print_open_document();
        }
    }

    async fn cmd_next(&mut self) {
        if self.shelf.navigator().next().await {
            self.print_open_document();
        } else if self.shelf.navigator().is_closed() {
            println!("Viewer closed.");
        } else {
            println!("Already at the last document.");
        }
    }

    async fn cmd_previous(&mut self) {
        if self.shelf.navigator().previous().await {
            self.print_open_document();
        } else if self.shelf.navigator().is_closed() {
            println!("Viewer closed.");
        } else {
            println!("Already at the first document.");
        }
    }

    fn cmd_edit(&mut self) {
        if !self.shelf.navigator().edit() {
            eprintln!("Nothing open to edit; use open <n> first.");
            return;
        }

        println!("Enter new content, end with a lone '.' line:");
        match read_body() {
            Ok(body) => {
                self.shelf.navigator().replace_draft(body);
                println!("Draft ready; type save to write it or cancel to discard.");
            }
            Err(e) => {
                eprintln!("error reading input: {}", e);
                // leave the draft seeded with the original content
            }
        }
    }

    async fn cmd_save(&mut self) {
        if !self.shelf.navigator().is_editing() {
            eprintln!("Not editing.");
            return;
        }
        self.shelf.navigator().save().await;
    }

    async fn cmd_cancel(&mut self) {
        if !self.shelf.navigator().is_editing() {
            eprintln!("Not editing.");
            return;
        }
        if self.shelf.navigator().cancel().await {
            println!("Edit discarded.");
        }
    }

    async fn cmd_new(&mut self, args: &[&str]) {
        if args.is_empty() {
            eprintln!("Usage: new <name>");
            return;
        }
        let name = args.join(" ");

        println!("Enter content, end with a lone '.' line:");
        let body = match read_body() {
            Ok(body) => body,
            Err(e) => {
                eprintln!("error reading input: {}", e);
                return;
            }
        };

        self.shelf.operations().create(&name, body.as_bytes()).await;
    }

    async fn cmd_upload(&mut self, args: &[&str]) {
        if args.is_empty() {
            eprintln!("Usage: upload <path> [path...]");
            return;
        }

        let mut files = Vec::new();
        for arg in args {
            let path = Path::new(arg);
            match std::fs::read(path) {
                Ok(bytes) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| (*arg).to_string());
                    files.push(RawFile::new(name, bytes));
                }
                Err(e) => eprintln!("error: cannot read {}: {}", arg, e),
            }
        }

        if !files.is_empty() {
            self.shelf.operations().upload(files).await;
        }
    }

    async fn cmd_delete(&mut self) {
        if self.shelf.navigator().current_entry().is_none() {
            eprintln!("Nothing open to delete; use open <n> first.");
            return;
        }
        self.shelf.navigator().delete(&StdinConfirm).await;
    }
}

/// Read stdin lines until a lone `.` line.
fn read_body() -> io::Result<String> {
    let stdin = io::stdin();
    let mut body = String::new();
    loop {
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim_end() == "." {
            break;
        }
        body.push_str(&line);
    }
    // drop the trailing newline the last content line carried
    if body.ends_with('\n') {
        body.pop();
    }
    Ok(body)
}
