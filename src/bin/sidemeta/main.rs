use anyhow::Result;
use env_logger::{Builder, Env};

use SideMeta::{MetaStore, StoreBuilder};

mod cli;
mod util;
mod cmd_read;
mod cmd_save;
mod cmd_remove;
mod cmd_has;
mod cmd_batch;
mod cmd_status;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт - info.
    // Пример: RUST_LOG=debug ./sidemeta read --file movie.mkv
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn open_store(opts: &cli::StoreOpts) -> Result<MetaStore> {
    let mut b = StoreBuilder::new();
    if let Some(name) = &opts.stream {
        b = b.stream_name(name.as_str());
    }
    if opts.no_cache {
        b = b.cache_enabled(false);
    }
    Ok(b.build()?)
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse_args();
    let store = open_store(&cli.store)?;
    match cli.cmd {
        cli::Cmd::Read { file, json } =>
            cmd_read::exec(&store, file, json),

        cli::Cmd::Save { file, field, fields_json } =>
            cmd_save::exec(&store, file, field, fields_json),

        cli::Cmd::Remove { files } =>
            cmd_remove::exec(&store, files),

        cli::Cmd::Has { file } =>
            cmd_has::exec(&store, file),

        cli::Cmd::Batch { ops_file, ops_json } =>
            cmd_batch::exec(&store, ops_file, ops_json),

        cli::Cmd::Status { json, reset } =>
            cmd_status::exec(&store, json, reset),
    }
}
