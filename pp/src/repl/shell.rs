//! Selection shell over one session

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{print_stats, print_templates};
use crate::config::Config;
use crate::session::{Session, SessionEvent, SessionHandle};
use crate::watcher::ChangeWatcher;

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Toggle(String),
    Select(String),
    Deselect(String),
    SelectAll,
    DeselectAll,
    TaskType(Option<String>),
    Preset(Option<String>),
    Instruction(String),
    Show,
    Stats,
    Write(PathBuf),
    Rescan,
    Templates,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse a trimmed, non-empty input line
    pub fn parse(line: &str) -> Result<Self, String> {
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        let arg = |name: &str| {
            if rest.is_empty() {
                Err(format!("{} needs an argument", name))
            } else {
                Ok(rest.to_string())
            }
        };
        let optional = || (!rest.is_empty()).then(|| rest.to_string());

        match cmd {
            "ls" | "list" => Ok(Self::List),
            "t" | "toggle" => arg("toggle").map(Self::Toggle),
            "select" | "add" => arg("select").map(Self::Select),
            "deselect" | "rm" => arg("deselect").map(Self::Deselect),
            "all" => Ok(Self::SelectAll),
            "none" => Ok(Self::DeselectAll),
            "tasktype" | "task" => Ok(Self::TaskType(optional())),
            "preset" => Ok(Self::Preset(optional())),
            "instruction" | "i" => Ok(Self::Instruction(rest.to_string())),
            "show" => Ok(Self::Show),
            "stats" => Ok(Self::Stats),
            "write" | "w" => arg("write").map(|p| Self::Write(PathBuf::from(p))),
            "rescan" | "r" => Ok(Self::Rescan),
            "templates" => Ok(Self::Templates),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(format!("Unknown command: {}", cmd)),
        }
    }
}

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Quit,
}

/// Interactive shell driving a shared session
pub struct Shell {
    handle: SessionHandle,
    events: broadcast::Receiver<SessionEvent>,
    reconcile: Option<JoinHandle<()>>,
}

impl Shell {
    /// Wrap a session; starts the background watcher when enabled in config
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(session: Session, config: &Config) -> Result<Self> {
        debug!(base = ?session.base(), watch = config.watch.enabled, "Shell::new: called");
        let stream = if config.watch.enabled {
            match ChangeWatcher::start(session.base(), &config.watch, &config.scan) {
                Ok(stream) => Some(stream),
                Err(e) => {
                    warn!(error = %e, "Watcher unavailable, use rescan to refresh");
                    None
                }
            }
        } else {
            None
        };

        let handle = SessionHandle::new(session);
        let events = handle.subscribe();
        let reconcile = stream.map(|stream| handle.spawn_reconcile(stream));

        Ok(Self {
            handle,
            events,
            reconcile,
        })
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Run the read-eval loop until quit or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome().await;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            self.drain_events();

            let prompt = format!("{} ", "pp>".bright_green());
            let readline = tokio::task::block_in_place(|| rl.readline(&prompt));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match ShellCommand::parse(input) {
                        Ok(cmd) => match self.execute(cmd).await {
                            Ok(ShellFlow::Continue) => {}
                            Ok(ShellFlow::Quit) => break,
                            Err(e) => println!("{} {}", "✗".red(), e),
                        },
                        Err(msg) => {
                            println!("{} {}", "?".yellow(), msg);
                            println!("Type {} for available commands", "help".yellow());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Execute one command against the session
    pub async fn execute(&mut self, cmd: ShellCommand) -> Result<ShellFlow> {
        debug!(?cmd, "Shell::execute: called");
        match cmd {
            ShellCommand::List => self.print_listing().await,
            ShellCommand::Toggle(path) => {
                let selected = self.handle.lock().await.toggle(&path)?;
                let state = if selected { "selected".green() } else { "deselected".dimmed() };
                println!("{} {}", path, state);
            }
            ShellCommand::Select(path) => {
                let changed = self.handle.lock().await.select(&path)?;
                println!("{} file(s) selected", changed);
            }
            ShellCommand::Deselect(path) => {
                let changed = self.handle.lock().await.deselect(&path)?;
                println!("{} file(s) deselected", changed);
            }
            ShellCommand::SelectAll => {
                let changed = self.handle.lock().await.select_all();
                println!("{} file(s) selected", changed);
            }
            ShellCommand::DeselectAll => {
                let changed = self.handle.lock().await.deselect_all();
                println!("{} file(s) deselected", changed);
            }
            ShellCommand::TaskType(name) => {
                self.handle.lock().await.set_task_type(name.as_deref())?;
                println!("Task type: {}", name.as_deref().unwrap_or("none"));
            }
            ShellCommand::Preset(name) => {
                self.handle.lock().await.set_preset(name.as_deref())?;
                println!("Preset: {}", name.as_deref().unwrap_or("none"));
            }
            ShellCommand::Instruction(text) => {
                self.handle.lock().await.set_instruction(text);
            }
            ShellCommand::Show => {
                let prompt = self.handle.lock().await.compose()?;
                println!("{}", prompt.text);
                print_stats(&prompt);
            }
            ShellCommand::Stats => {
                let prompt = self.handle.lock().await.compose()?;
                print_stats(&prompt);
            }
            ShellCommand::Write(path) => {
                let prompt = self.handle.lock().await.compose()?;
                fs::write(&path, &prompt.text).context(format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), bytes = prompt.text.len(), "Prompt written");
                println!("{} Wrote {}", "✓".green(), path.display());
                print_stats(&prompt);
            }
            ShellCommand::Rescan => {
                self.drain_events();
                let pruned = self.handle.rescan().await?;
                let own = SessionEvent::Rescanned {
                    entries: self.handle.lock().await.catalog().len(),
                    pruned: pruned.clone(),
                };
                for event in self.pending_notices(Some(&own)) {
                    Self::print_notice(event);
                }
                self.report_rescan(&pruned).await;
            }
            ShellCommand::Templates => {
                let session = self.handle.lock().await;
                print_templates(session.templates());
            }
            ShellCommand::Help => self.print_help(),
            ShellCommand::Quit => return Ok(ShellFlow::Quit),
        }
        Ok(ShellFlow::Continue)
    }

    /// Report background reconcile events since the last prompt
    fn drain_events(&mut self) {
        for event in self.pending_notices(None) {
            Self::print_notice(event);
        }
    }

    /// Queued events, minus the first one equal to `own`
    ///
    /// `own` is the event a user command already reported itself.
    fn pending_notices(&mut self, own: Option<&SessionEvent>) -> Vec<SessionEvent> {
        let mut own = own;
        let mut notices = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) if own == Some(&event) => own = None,
                Ok(SessionEvent::Superseded) => {}
                Ok(event) => notices.push(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Shell::pending_notices: lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        notices
    }

    fn print_notice(event: SessionEvent) {
        match event {
            SessionEvent::Rescanned { entries, pruned } => {
                println!("{} Directory changed, {} entries", "●".bright_cyan(), entries);
                for path in pruned {
                    println!("  {} {} removed from selection", "-".yellow(), path);
                }
            }
            SessionEvent::ScanFailed { error } => {
                println!("{} Re-scan failed: {}", "✗".red(), error);
            }
            SessionEvent::Superseded => {}
        }
    }

    async fn report_rescan(&self, pruned: &[String]) {
        let session = self.handle.lock().await;
        println!(
            "{} Rescanned: {} files, {} selected",
            "✓".green(),
            session.catalog().file_count(),
            session.selection().len()
        );
        for path in pruned {
            println!("  {} {} removed from selection", "-".yellow(), path);
        }
    }

    async fn print_welcome(&self) {
        let session = self.handle.lock().await;
        println!();
        println!("{}", "PromptPack".bright_cyan().bold());
        println!("Directory: {}", session.base().display());
        println!("{} files available", session.catalog().file_count());
        if self.reconcile.is_some() {
            println!("{}", "Watching for changes".dimmed());
        }
        println!("Type {} for help, {} to quit", "help".yellow(), "quit".yellow());
        println!();
    }

    async fn print_listing(&self) {
        let session = self.handle.lock().await;
        let catalog = session.catalog();
        let selection = session.selection();
        for entry in catalog.entries() {
            let indent = "  ".repeat(entry.depth());
            if entry.is_dir {
                let (total, chosen) = catalog
                    .files_under(&entry.path)
                    .fold((0, 0), |(t, c), f| (t + 1, c + usize::from(selection.contains(&f.path))));
                let mark = match chosen {
                    0 => "[ ]",
                    n if n == total => "[x]",
                    _ => "[-]",
                };
                println!("{}{} {}/", indent, mark, entry.name().bright_blue());
            } else if selection.contains(&entry.path) {
                println!("{}{} {}", indent, "[x]".green(), entry.name());
            } else {
                println!("{}[ ] {}", indent, entry.name());
            }
        }
        let request = session.request();
        println!();
        println!(
            "{} selected | task type: {} | preset: {}",
            selection.len(),
            request.task_type.as_deref().unwrap_or("none"),
            request.preset.as_deref().unwrap_or("none")
        );
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:20} List entries with selection marks", "ls".yellow());
        println!("  {:20} Flip a file or every file in a directory", "toggle PATH".yellow());
        println!("  {:20} Select a file or directory", "select PATH".yellow());
        println!("  {:20} Deselect a file or directory", "deselect PATH".yellow());
        println!("  {:20} Select every file", "all".yellow());
        println!("  {:20} Clear the selection", "none".yellow());
        println!("  {:20} Set or clear the task type", "tasktype [NAME]".yellow());
        println!("  {:20} Set or clear the preset", "preset [NAME]".yellow());
        println!("  {:20} Set the task instruction", "instruction TEXT".yellow());
        println!("  {:20} Print the composed prompt", "show".yellow());
        println!("  {:20} Print token estimate and difficulty", "stats".yellow());
        println!("  {:20} Write the composed prompt to a file", "write FILE".yellow());
        println!("  {:20} Re-scan the directory", "rescan".yellow());
        println!("  {:20} List task types and presets", "templates".yellow());
        println!("  {:20} Exit the shell", "quit".yellow());
        println!();
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(task) = self.reconcile.take() {
            task.abort();
        }
    }
}
