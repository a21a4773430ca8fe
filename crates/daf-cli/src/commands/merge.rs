use daf_core::refs::merge_refs;

use crate::cli::{GlobalFlags, MergeArgs};
use crate::output::output;

/// Handle `daf merge`.
pub fn handle(args: &MergeArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&merge_refs(&args.refs), flags.format)
}
