use anyhow::Result;
use std::path::PathBuf;

use SideMeta::{MetaStore, Record};

use super::util::{apply_fields, parse_field, parse_fields_json, print_warnings};

pub fn exec(
    store: &MetaStore,
    file: PathBuf,
    fields: Vec<String>,
    fields_json: Option<String>,
) -> Result<()> {
    let mut rec = Record::for_file(&file)?;
    if let Some(s) = fields_json {
        apply_fields(&mut rec, parse_fields_json(&s)?);
    }
    for f in &fields {
        let (k, v) = parse_field(f)?;
        rec.set(&k, v);
    }

    let report = match store.save_one(&file, &rec) {
        Ok(r) => r,
        Err(e) => {
            print_warnings(e.warnings());
            return Err(e.into());
        }
    };
    println!("SAVED '{}': {} B", file.display(), report.bytes);
    print_warnings(&report.warnings);
    Ok(())
}
