//! PromptPack - prompt builder for LLM code tasks
//!
//! CLI entry point: scan a directory, select files, and assemble a prompt.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use promptpack::cli::{Cli, Command, OutputFormat, PromptArgs, get_log_path};
use promptpack::config::Config;
use promptpack::history::LastDirectory;
use promptpack::repl::{self, Shell};
use promptpack::{ChangeWatcher, ComposedPrompt, Session, SessionEvent, SessionHandle, TemplateSet};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging isn't initialized yet, so nothing here can be traced
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Scan { dir, format } => {
            debug!(?dir, %format, "main: matched Scan command");
            cmd_scan(&config, dir.as_deref(), format)
        }
        Command::Assemble { prompt, output, format } => {
            debug!(?output, %format, "main: matched Assemble command");
            cmd_assemble(&config, &prompt, output.as_deref(), format)
        }
        Command::Watch { prompt, output } => {
            debug!(?output, "main: matched Watch command");
            cmd_watch(&config, &prompt, &output).await
        }
        Command::Templates => {
            debug!("main: matched Templates command");
            cmd_templates(&config)
        }
        Command::Shell { dir } => {
            debug!(?dir, "main: matched Shell command");
            cmd_shell(&config, dir.as_deref()).await
        }
    }
}

/// Open a session on the given directory, or the remembered one
fn open_session(config: &Config, dir: Option<&Path>) -> Result<Session> {
    debug!(?dir, "open_session: called");
    let history = LastDirectory::default_location();
    let dir = history
        .resolve(dir)
        .ok_or_else(|| eyre!("No directory given and no previous directory remembered"))?;

    let session = Session::open(&dir, config).context(format!("Failed to open {}", dir.display()))?;

    if let Err(e) = history.save(session.base()) {
        warn!(error = %e, "Failed to remember directory");
    }
    Ok(session)
}

/// Apply selection and framing flags to a fresh session
fn apply_prompt_args(session: &mut Session, args: &PromptArgs) -> Result<()> {
    debug!(all = args.all, selected = args.select.len(), "apply_prompt_args: called");
    if args.all {
        session.select_all();
    }
    for path in &args.select {
        // Unknown paths are reported and skipped; the rest of the selection still applies
        if let Err(e) = session.select(path) {
            eprintln!("{} {}, skipping", "!".yellow(), e);
        }
    }
    session.set_request(args.request())?;
    Ok(())
}

fn cmd_scan(config: &Config, dir: Option<&Path>, format: OutputFormat) -> Result<()> {
    debug!(?dir, %format, "cmd_scan: called");
    let session = open_session(config, dir)?;
    let catalog = session.catalog();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(catalog.entries())?);
        }
        OutputFormat::Text => {
            println!("{}", session.base().display().to_string().bold());
            for entry in catalog.entries() {
                let indent = "  ".repeat(entry.depth());
                if entry.is_dir {
                    println!("{}{}/", indent, entry.name().bright_blue());
                } else {
                    println!("{}{}", indent, entry.name());
                }
            }
            println!();
            println!(
                "{} files, {} directories",
                catalog.file_count(),
                catalog.len() - catalog.file_count()
            );
        }
    }
    Ok(())
}

fn cmd_assemble(config: &Config, args: &PromptArgs, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    debug!(?output, %format, "cmd_assemble: called");
    let mut session = open_session(config, args.dir.as_deref())?;
    apply_prompt_args(&mut session, args)?;
    let prompt = session.compose()?;

    match (format, output) {
        (OutputFormat::Json, Some(path)) => {
            write_prompt(path, &serde_json::to_string_pretty(&prompt)?)?;
            repl::print_stats(&prompt);
        }
        (OutputFormat::Json, None) => {
            println!("{}", serde_json::to_string_pretty(&prompt)?);
        }
        (OutputFormat::Text, Some(path)) => {
            write_prompt(path, &prompt.text)?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
            repl::print_stats(&prompt);
        }
        (OutputFormat::Text, None) => {
            println!("{}", prompt.text);
            repl::print_stats(&prompt);
        }
    }
    Ok(())
}

async fn cmd_watch(config: &Config, args: &PromptArgs, output: &Path) -> Result<()> {
    debug!(?output, "cmd_watch: called");
    let mut session = open_session(config, args.dir.as_deref())?;
    apply_prompt_args(&mut session, args)?;

    if !config.watch.enabled {
        warn!("Watching is disabled in config, watching anyway for the watch command");
    }

    // Written before the watcher starts so the path can be canonicalized
    let mut target = PromptFile::new(output);
    target.update(&session.compose()?)?;
    let resolved = output.canonicalize().context(format!("Failed to resolve {}", output.display()))?;

    // The output file never feeds its own prompt
    if let Ok(relative) = resolved.strip_prefix(session.base()) {
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if session.catalog().contains(&relative) && session.deselect(&relative)? > 0 {
            eprintln!("{} {} is the output file, deselected", "-".yellow(), relative);
            target.update(&session.compose()?)?;
        }
    }
    let ignored = vec![resolved];

    let stream = ChangeWatcher::start_ignoring(session.base(), &config.watch, &config.scan, ignored)?;
    let base = session.base().to_path_buf();
    let handle = SessionHandle::new(session);
    let mut events = handle.subscribe();
    let reconcile = handle.spawn_reconcile(stream);

    eprintln!(
        "{} Watching {} (Ctrl-C to stop)",
        "●".bright_cyan(),
        base.display().to_string().bold()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Watch interrupted");
                break;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Rescanned { pruned, .. }) => {
                    for path in &pruned {
                        eprintln!("{} {} no longer exists, deselected", "-".yellow(), path);
                    }
                    let prompt = handle.lock().await.compose()?;
                    target.update(&prompt)?;
                }
                Ok(SessionEvent::ScanFailed { error }) => {
                    eprintln!("{} Re-scan failed: {}", "✗".red(), error);
                }
                Ok(SessionEvent::Superseded) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "cmd_watch: lagged behind session events");
                    let prompt = handle.lock().await.compose()?;
                    target.update(&prompt)?;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    reconcile.abort();
    Ok(())
}

/// Output file of `pp watch`, rewritten only when the prompt text changes
struct PromptFile {
    path: PathBuf,
    written: Option<String>,
}

impl PromptFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            written: None,
        }
    }

    /// Write `prompt` unless the file already holds the same text; returns whether it wrote
    fn update(&mut self, prompt: &ComposedPrompt) -> Result<bool> {
        debug!(path = ?self.path, "PromptFile::update: called");
        if self.written.as_deref() == Some(prompt.text.as_str()) {
            debug!("PromptFile::update: unchanged, skipping write");
            return Ok(false);
        }
        write_prompt(&self.path, &prompt.text)?;
        self.written = Some(prompt.text.clone());
        eprintln!(
            "{} Wrote {} ({} files, {})",
            "✓".green(),
            self.path.display(),
            prompt.included.len(),
            prompt.estimate
        );
        Ok(true)
    }
}

fn write_prompt(path: &Path, text: &str) -> Result<()> {
    debug!(?path, bytes = text.len(), "write_prompt: called");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, text).context(format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn cmd_templates(config: &Config) -> Result<()> {
    debug!("cmd_templates: called");
    let templates: TemplateSet = config.templates();
    repl::print_templates(&templates);
    Ok(())
}

async fn cmd_shell(config: &Config, dir: Option<&Path>) -> Result<()> {
    debug!(?dir, "cmd_shell: called");
    let session = open_session(config, dir)?;
    let mut shell = Shell::new(session, config)?;
    shell.run().await
}
