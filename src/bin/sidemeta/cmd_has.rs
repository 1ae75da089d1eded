use anyhow::Result;
use std::path::PathBuf;

use SideMeta::MetaStore;

pub fn exec(store: &MetaStore, file: PathBuf) -> Result<()> {
    let yes = store.has_record(&file);
    println!("{} '{}'", if yes { "YES" } else { "NO" }, file.display());
    Ok(())
}
