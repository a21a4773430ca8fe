use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Render a page with its nested commentary.
    Page(PageArgs),
    /// Parse a free-text query such as "Brachot 20" into a book and pages.
    Parse(ParseArgs),
    /// Expand a ranged ref into its atomic segment refs.
    Expand(ExpandArgs),
    /// Merge consecutive segment refs into ranges.
    Merge(MergeArgs),
}

#[derive(Clone, Debug, Args)]
pub struct PageArgs {
    /// Book name or alias, e.g. Berakhot or Brachot.
    pub book: String,

    /// Pages within the book, e.g. 2a, 12 or a liturgy section.
    #[arg(required = true)]
    pub pages: Vec<String>,

    /// Serve every request from recorded responses in this directory.
    #[arg(long, conflicts_with = "record")]
    pub replay: Option<PathBuf>,

    /// Fetch from the live API and record each response into this directory.
    #[arg(long)]
    pub record: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ParseArgs {
    /// Query text.
    pub query: String,
}

#[derive(Clone, Debug, Args)]
pub struct ExpandArgs {
    /// Ref to expand, e.g. "Berakhot 2a:6-2b:2".
    pub r#ref: String,
}

#[derive(Clone, Debug, Args)]
pub struct MergeArgs {
    /// Atomic refs to merge.
    #[arg(required = true)]
    pub refs: Vec<String>,
}
