//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::prompts::ComposeRequest;

/// PromptPack - turn selected source files into an LLM prompt
#[derive(Parser)]
#[command(
    name = "pp",
    about = "Assemble selected source files into LLM-ready prompts",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the files and directories a base directory offers
    Scan {
        /// Base directory (defaults to the last one opened)
        dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Compose a prompt once and print it
    Assemble {
        #[command(flatten)]
        prompt: PromptArgs,

        /// Write the prompt to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Keep a prompt file up to date while the directory changes
    Watch {
        #[command(flatten)]
        prompt: PromptArgs,

        /// File rewritten after every change
        #[arg(short, long, required = true)]
        output: PathBuf,
    },

    /// List available task types and presets
    Templates,

    /// Interactive selection shell
    Shell {
        /// Base directory (defaults to the last one opened)
        dir: Option<PathBuf>,
    },
}

/// Directory, selection and framing shared by `assemble` and `watch`
#[derive(Debug, Clone, Args)]
pub struct PromptArgs {
    /// Base directory (defaults to the last one opened)
    pub dir: Option<PathBuf>,

    /// Select every supported file
    #[arg(short, long)]
    pub all: bool,

    /// Select a file or directory (relative to the base); repeatable
    #[arg(short, long = "select", value_name = "PATH")]
    pub select: Vec<String>,

    /// Task type framing the files
    #[arg(short, long)]
    pub task_type: Option<String>,

    /// Preset appended at the end
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Task instruction text
    #[arg(short, long, default_value = "")]
    pub instruction: String,
}

impl PromptArgs {
    /// The compose request these arguments describe
    pub fn request(&self) -> ComposeRequest {
        debug!(task_type = ?self.task_type, preset = ?self.preset, "PromptArgs::request: called");
        ComposeRequest {
            task_type: self.task_type.clone(),
            instruction: self.instruction.clone(),
            preset: self.preset.clone(),
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptpack")
        .join("logs")
        .join("promptpack.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Output format for scan/assemble commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
