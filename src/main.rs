//! `bibindex` command-line tool.
//!
//! ```text
//! bibindex index catalog.mrc --solr http://localhost:8983/solr/catalog --holdings checkin.csv
//! bibindex index catalog.mrc --csv records.csv --ils generic
//! bibindex shard catalog.mrc.gz --shard-size 50000 --out-dir shards
//! bibindex sample catalog.mrc --size 500 --seed 7 --output sample.mrc
//! ```

use anyhow::{bail, Context, Result};
use bibindex::batch::{BatchDriver, ErrorLog};
use bibindex::extract::{Extractor, IlsVariant};
use bibindex::formats::open_input;
use bibindex::holdings::HoldingsTable;
use bibindex::index::{IndexBatcher, SolrIndex, DEFAULT_BATCH_SIZE};
use bibindex::sample::Sampler;
use bibindex::shard::{input_stem, Sharder, DEFAULT_SHARD_SIZE};
use bibindex::{LookupTables, MarcWriter};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bibindex", version, about = "Normalize MARC records for a search index")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do not print progress to standard error
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON file overriding the built-in lookup tables
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Append failed record positions here
    #[arg(long, global = true, default_value = "errors.log")]
    error_log: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract documents and send them to an index and/or a CSV file
    Index {
        /// Binary record files (`.gz` is decompressed)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Solr core URL
        #[arg(long)]
        solr: Option<String>,

        /// Write flat rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Serial check-in export to merge
        #[arg(long)]
        holdings: Option<PathBuf>,

        /// Library system that produced the records
        #[arg(long, value_enum, default_value_t = IlsVariant::Iii)]
        ils: IlsVariant,

        /// Collection name added to every document (repeatable)
        #[arg(long = "collection")]
        collections: Vec<String>,

        /// Documents per index commit
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Split a record file into shards
    Shard {
        /// Binary record file (`.gz` is decompressed)
        input: PathBuf,

        /// Records per shard
        #[arg(long, default_value_t = DEFAULT_SHARD_SIZE)]
        shard_size: usize,

        /// Directory for shard files
        #[arg(long, default_value = "shards")]
        out_dir: PathBuf,
    },
    /// Write a random sample of non-suppressed records
    Sample {
        /// Binary record file (`.gz` is decompressed)
        input: PathBuf,

        /// Number of records to sample
        #[arg(long, default_value_t = 100)]
        size: usize,

        /// Seed for a repeatable sample
        #[arg(long)]
        seed: Option<u64>,

        /// Output record file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "bibindex=debug" } else { "bibindex=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let tables = match &cli.tables {
        Some(path) => LookupTables::from_json_path(path)
            .with_context(|| format!("loading lookup tables from {}", path.display()))?,
        None => LookupTables::default(),
    };
    let error_log = || {
        ErrorLog::open(&cli.error_log)
            .with_context(|| format!("opening error log {}", cli.error_log.display()))
    };

    match &cli.command {
        Command::Index {
            inputs,
            solr,
            csv,
            holdings,
            ils,
            collections,
            batch_size,
        } => {
            if solr.is_none() && csv.is_none() {
                bail!("nothing to do: give --solr, --csv or both");
            }

            let holdings = match holdings {
                Some(path) => Some(
                    HoldingsTable::load_path(path)
                        .with_context(|| format!("loading holdings from {}", path.display()))?,
                ),
                None => None,
            };
            let mut extractor = Extractor::new(&tables).with_ils(*ils);
            if let Some(holdings) = &holdings {
                extractor = extractor.with_holdings(holdings);
            }

            let mut driver = BatchDriver::<SolrIndex>::new(extractor)
                .with_collections(collections.clone())
                .with_error_log(error_log()?)
                .with_progress(!cli.quiet);
            if let Some(url) = solr {
                let index = SolrIndex::new(url)?;
                let batcher = IndexBatcher::new(index, *batch_size)
                    .with_context(|| format!("reading index schema from {url}"))?;
                driver = driver.with_index(batcher);
            }
            if let Some(path) = csv {
                driver = driver
                    .with_csv_path(path)
                    .with_context(|| format!("creating {}", path.display()))?;
            }

            for input in inputs {
                let mut reader = open_input(input)
                    .with_context(|| format!("opening {}", input.display()))?;
                info!(input = %input.display(), "indexing");
                let stats = driver
                    .run(&mut reader)
                    .with_context(|| format!("indexing {}", input.display()))?;
                eprintln!("{}: {stats}", input.display());
            }
        },
        Command::Shard {
            input,
            shard_size,
            out_dir,
        } => {
            let mut reader =
                open_input(input).with_context(|| format!("opening {}", input.display()))?;
            let stats = Sharder::new(out_dir, input_stem(input), *shard_size, &tables.identifiers)
                .with_error_log(error_log()?)
                .with_progress(!cli.quiet)
                .run(&mut reader)
                .with_context(|| format!("sharding {}", input.display()))?;
            eprintln!("{stats}");
        },
        Command::Sample {
            input,
            size,
            seed,
            output,
        } => {
            let mut reader =
                open_input(input).with_context(|| format!("opening {}", input.display()))?;
            let file = File::create(output)
                .with_context(|| format!("creating {}", output.display()))?;
            let mut writer = MarcWriter::new(BufWriter::new(file));
            let stats = Sampler::new(*size, &tables.identifiers, *seed)
                .run(&mut reader, &mut writer)
                .with_context(|| format!("writing sample to {}", output.display()))?;
            eprintln!(
                "Sampled {} of {} eligible records ({} read, {} unreadable)",
                stats.written, stats.eligible, stats.records, stats.errors
            );
        },
    }

    Ok(())
}
