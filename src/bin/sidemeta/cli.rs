use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI для side-channel метаданных файлов
#[derive(Parser, Debug)]
#[command(name = "sidemeta", version, about = "Per-file metadata records in alternate data streams")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreOpts,

    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

#[derive(Args, Debug)]
pub struct StoreOpts {
    /// Stream name (overrides SM_STREAM_NAME)
    #[arg(long, global = true)]
    pub stream: Option<String>,

    /// Disable the record cache for this run
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print the record stored for a file
    Read {
        #[arg(long)]
        file: PathBuf,
        /// Pretty JSON only (no header line)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Save a record: last_modified/last_size from the file, plus fields
    ///
    /// Пример:
    ///   sidemeta save --file movie.mkv --field video_codec=H264 --field tracks=3
    Save {
        #[arg(long)]
        file: PathBuf,
        /// key=value; value parsed as JSON if possible, else taken as a string
        #[arg(long)]
        field: Vec<String>,
        /// JSON object with producer fields (applied before --field)
        #[arg(long)]
        fields_json: Option<String>,
    },
    /// Remove records (missing streams are not an error)
    Remove {
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
    },
    /// Does the file carry a record stream?
    Has {
        #[arg(long)]
        file: PathBuf,
    },
    /// Run save/remove ops from JSON
    ///
    /// JSON формат (массив объектов):
    /// [
    ///   {"op":"save","file":"a.mkv","fields":{"video_codec":"H264"}},
    ///   {"op":"save","file":"b.mkv"},
    ///   {"op":"remove","file":"c.mkv"}
    /// ]
    /// Подряд идущие операции одного вида уходят в store одним батчем.
    Batch {
        /// JSON-файл с операциями
        #[arg(long)]
        ops_file: Option<PathBuf>,
        /// JSON-строка с операциями (если ops_file не задан)
        #[arg(long)]
        ops_json: Option<String>,
    },
    /// Print config and metrics
    Status {
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Zero the counters after printing them
        #[arg(long, default_value_t = false)]
        reset: bool,
    },
}
