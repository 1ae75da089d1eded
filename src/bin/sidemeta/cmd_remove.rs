use anyhow::Result;
use std::path::PathBuf;

use SideMeta::MetaStore;

use super::util::print_warnings;

pub fn exec(store: &MetaStore, files: Vec<PathBuf>) -> Result<()> {
    let report = store.remove_batch(&files);
    println!("REMOVED: {} file(s)", report.files);
    print_warnings(&report.warnings);
    Ok(())
}
