use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "finnctl", version, about = "Build orchestration for the FINN pipeline")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file. Falls back to $FINNCTL_CONFIG, then ./finnctl.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Show a progress bar over the planned tasks.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Bytes of captured command output kept for diagnostics.
    #[arg(long, default_value_t = 16 * 1024, global = true)]
    pub capture_bytes: usize,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    /// Task names, followed by positional arguments of the last task that takes them.
    pub tokens: Vec<String>,

    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    #[arg(long, short = 's')]
    pub source: Option<String>,

    #[arg(long, short = 'm')]
    pub mode: Option<String>,

    /// Extra task parameters (KEY=VALUE). Can be specified multiple times.
    #[arg(long = "param", short = 'p', action = clap::ArgAction::Append)]
    pub params: Vec<String>,

    /// Run every task in the closure, even when its targets exist.
    #[arg(long)]
    pub force: bool,

    /// Stream external command output to the terminal for every task.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Print a one-line summary when the run ends.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run tasks and their dependencies (default: finn-doit-setup).
    Run(RunArgs),
    /// List registered tasks in declaration order.
    List,
}
