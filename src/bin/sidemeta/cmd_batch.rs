use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use SideMeta::{MetaError, MetaStore, Record};

use super::util::{apply_fields, print_warnings};

#[derive(Debug, Deserialize)]
struct RawOp {
    op: String,
    file: PathBuf,
    #[serde(default)]
    fields: Option<Map<String, Value>>,
}

enum Run {
    Save(Vec<(PathBuf, Record)>),
    Remove(Vec<PathBuf>),
}

/// Group consecutive ops of the same kind; order between groups is preserved.
fn plan(ops: Vec<RawOp>) -> Result<Vec<Run>> {
    let mut runs: Vec<Run> = Vec::new();
    for op in ops {
        match op.op.to_ascii_lowercase().as_str() {
            "save" => {
                let mut rec = Record::for_file(&op.file)
                    .with_context(|| format!("stat {}", op.file.display()))?;
                if let Some(f) = op.fields {
                    apply_fields(&mut rec, f);
                }
                match runs.last_mut() {
                    Some(Run::Save(items)) => items.push((op.file, rec)),
                    _ => runs.push(Run::Save(vec![(op.file, rec)])),
                }
            }
            "remove" | "del" => match runs.last_mut() {
                Some(Run::Remove(files)) => files.push(op.file),
                _ => runs.push(Run::Remove(vec![op.file])),
            },
            other => return Err(anyhow!("unknown op '{}'", other)),
        }
    }
    Ok(runs)
}

pub fn exec(store: &MetaStore, ops_file: Option<PathBuf>, ops_json: Option<String>) -> Result<()> {
    let raw = if let Some(p) = ops_file {
        std::fs::read_to_string(&p).with_context(|| format!("read ops file {}", p.display()))?
    } else if let Some(s) = ops_json {
        s
    } else {
        return Err(anyhow!("provide --ops-file or --ops-json"));
    };

    let ops: Vec<RawOp> = serde_json::from_str(&raw).context("parse ops json (array of objects)")?;
    if ops.is_empty() {
        println!("No ops to execute.");
        return Ok(());
    }
    let total = ops.len();

    let mut done = 0usize;
    for run in plan(ops)? {
        match run {
            Run::Save(items) => match store.save_batch(&items) {
                Ok(report) => {
                    done += report.files;
                    print_warnings(&report.warnings);
                }
                Err(MetaError::BatchAbort { index, path, source, warnings }) => {
                    print_warnings(&warnings);
                    return Err(anyhow!(
                        "processed {} of {}, failed at file {}: {}",
                        done + index,
                        total,
                        path.display(),
                        source
                    ));
                }
                Err(e) => return Err(e.into()),
            },
            Run::Remove(files) => {
                let report = store.remove_batch(&files);
                done += report.files;
                print_warnings(&report.warnings);
            }
        }
    }

    println!("Batch: OK ({} of {})", done, total);
    Ok(())
}
