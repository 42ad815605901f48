use chrono::Utc;
use clap::Parser;
use copycache_history::ClipboardHistory;
use copycache_history::classify;
use copycache_history::factory;
use copycache_history::factory::Backend;
use copycache_history::factory::HistoryConfig;
use copycache_history::migrate::decode_stored;
use copycache_history::query;
use std::io::Read as _;
use std::io::Write as _;
use std::path::PathBuf;

const PREVIEW_CHARS: usize = 150;

/// Clipboard history from the command line.
#[derive(Debug, Parser)]
#[command(name = "copycache", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub cmd: HistoryCommand,
}

/// Where the history lives; only read by commands that open it.
#[derive(Debug, clap::Args)]
pub struct StoreArgs {
    /// Directory holding the history files (overrides `COPYCACHE_DATA_DIR`).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Persistence backend: jsonl, sqlite or memory (overrides `COPYCACHE_BACKEND`).
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Maximum number of entries kept (overrides `COPYCACHE_CAPACITY`).
    #[arg(long, global = true)]
    pub capacity: Option<usize>,
}

/// History subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum HistoryCommand {
    /// Capture text at the top of the history. Reads stdin when TEXT is omitted.
    Record { text: Option<String> },
    /// List entries, most recent first.
    List {
        /// Only show entries containing this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
        /// Print entries as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// Remove an entry by id.
    Rm { id: String },
    /// Remove every entry.
    Clear,
    /// Show the capacity, or trim the stored history to a new one.
    Capacity { value: Option<usize> },
    /// Show entry counts per content type.
    Stats,
    /// Print the content type the store would assign to TEXT.
    Classify { text: String },
    /// Write entries to stdout as JSONL.
    Export,
    /// Merge JSONL entries from stdin into the history.
    Import,
    /// Rewrite a JSONL history file in the current entry shape.
    Upgrade {
        /// Input JSONL file, possibly holding legacy entries
        #[arg(long)]
        input: PathBuf,
        /// Output JSONL file to write results
        #[arg(long)]
        output: PathBuf,
    },
    /// Copy a JSONL history file into a SQLite database.
    Migrate {
        /// Path to the source JSONL file
        #[arg(long)]
        jsonl: PathBuf,
        /// Path to the destination SQLite database file
        #[arg(long)]
        sqlite: PathBuf,
    },
}

fn resolve_config(args: &StoreArgs) -> anyhow::Result<HistoryConfig> {
    let mut config = HistoryConfig::from_env_in(args.data_dir.clone())?;
    if let Some(backend) = &args.backend {
        config.backend = backend.parse::<Backend>()?;
    }
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    Ok(config)
}

fn open(args: &StoreArgs) -> anyhow::Result<ClipboardHistory> {
    let config = resolve_config(args)?;
    let history = factory::open_history(&config)?;
    tracing::debug!(?config, "opened history");
    Ok(history)
}

/// Execute a history command.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli { store, cmd } = cli;
    match cmd {
        HistoryCommand::Classify { text } => {
            println!("{}", classify(&text));
        }
        HistoryCommand::Upgrade { input, output } => {
            let (read, written) = copycache_history::migrate::upgrade_jsonl(&input, &output)?;
            println!("Read {read} entries, wrote {written} entries");
        }
        HistoryCommand::Migrate { jsonl, sqlite } => {
            let n = copycache_history::migrate::migrate_jsonl_to_sqlite(&jsonl, &sqlite)?;
            println!("Migrated {n} entries");
        }
        HistoryCommand::Record { text } => {
            let history = open(&store)?;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            match history.record(&text)? {
                Some(entry) => println!("{}\t{}", entry.id, entry.r#type),
                None => eprintln!("Nothing to record"),
            }
        }
        HistoryCommand::List { search, json } => {
            let history = open(&store)?;
            let entries = match search {
                Some(term) => query::search(&history.list(), &term),
                None => history.list(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_entries(&entries)?;
            }
        }
        HistoryCommand::Rm { id } => {
            if !open(&store)?.remove(&id)? {
                anyhow::bail!("history id not found: {id}");
            }
            println!("Removed {id}");
        }
        HistoryCommand::Clear => {
            open(&store)?.clear()?;
            println!("Cleared history");
        }
        HistoryCommand::Capacity { value } => {
            let history = open(&store)?;
            match value {
                Some(n) => {
                    set_capacity(&history, n)?;
                    println!("Capacity {}", history.capacity());
                }
                None => println!("{}", history.capacity()),
            }
        }
        HistoryCommand::Stats => {
            println!("{}", open(&store)?.stats());
        }
        HistoryCommand::Export => {
            let history = open(&store)?;
            let mut out = std::io::stdout().lock();
            for entry in history.list() {
                serde_json::to_writer(&mut out, &entry)?;
                out.write_all(b"\n")?;
            }
        }
        HistoryCommand::Import => {
            let history = open(&store)?;
            let mut data = String::new();
            std::io::stdin().read_to_string(&mut data)?;
            let mut entries = Vec::new();
            for line in data.lines().map(str::trim).filter(|l| !l.is_empty()) {
                entries.push(decode_stored(line)?);
            }
            let n = history.import(entries)?;
            println!("Imported {n} entries");
        }
    }
    Ok(())
}

fn set_capacity(history: &ClipboardHistory, n: usize) -> anyhow::Result<()> {
    let before = history.len();
    history.set_capacity(n)?;
    let evicted = before.saturating_sub(history.len());
    if evicted > 0 {
        eprintln!("Evicted {evicted} oldest entries");
    }
    Ok(())
}

fn print_entries(entries: &[copycache_history::Entry]) -> anyhow::Result<()> {
    let now = Utc::now();
    let mut out = std::io::stdout().lock();
    for entry in entries {
        let one_line = query::preview(&entry.text, PREVIEW_CHARS).replace(['\n', '\r'], " ");
        writeln!(
            out,
            "{}  {:<8}  {:>9}  {}",
            entry.id,
            entry.r#type.as_ref().to_uppercase(),
            query::time_ago(entry.created_at, now),
            one_line
        )?;
    }
    Ok(())
}
