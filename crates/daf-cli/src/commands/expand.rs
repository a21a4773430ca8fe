use daf_core::refs::expand_ref;

use crate::bootstrap::Loaded;
use crate::cli::{ExpandArgs, GlobalFlags};
use crate::output::output;

/// Handle `daf expand`.
pub fn handle(args: &ExpandArgs, loaded: &Loaded, flags: &GlobalFlags) -> anyhow::Result<()> {
    let refs = expand_ref(&args.r#ref, &loaded.tables.segment_counts)?;
    output(&refs, flags.format)
}
