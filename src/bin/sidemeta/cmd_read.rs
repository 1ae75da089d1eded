use anyhow::Result;
use std::path::PathBuf;

use SideMeta::MetaStore;

pub fn exec(store: &MetaStore, file: PathBuf, json: bool) -> Result<()> {
    match store.read(&file) {
        Ok(rec) => {
            let pretty = serde_json::to_string_pretty(&rec)?;
            if !json {
                println!("FOUND '{}' ({})", file.display(), store.stream_path(&file));
            }
            println!("{}", pretty);
        }
        Err(e) if e.is_not_found() => println!("NOT FOUND '{}'", file.display()),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
