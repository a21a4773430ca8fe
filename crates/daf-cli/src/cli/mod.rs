use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::{Commands, ExpandArgs, MergeArgs, PageArgs, ParseArgs};

/// Top-level CLI parser for the `daf` binary.
#[derive(Debug, Parser)]
#[command(name = "daf", version, about = "daf - Talmud, Tanakh and liturgy pages with commentary")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags { format: self.format, quiet: self.quiet, verbose: self.verbose }
    }
}
