//! logvec CLI
//!
//! Inspect and mutate a logvec sequence stored in a directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use logvec::{log, Config, Sequence, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// logvec CLI
#[derive(Parser, Debug)]
#[command(name = "logvec")]
#[command(about = "Durable log-backed sequence of byte records")]
#[command(version)]
struct Args {
    /// Data directory (created if missing)
    #[arg(short, long, default_value = "./logvec_data")]
    data_dir: PathBuf,

    /// How each append is forced to storage
    #[arg(short, long, value_enum, default_value_t = SyncArg::Data)]
    sync: SyncArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SyncArg {
    All,
    Data,
    Flush,
}

impl From<SyncArg> for SyncStrategy {
    fn from(arg: SyncArg) -> Self {
        match arg {
            SyncArg::All => SyncStrategy::All,
            SyncArg::Data => SyncStrategy::Data,
            SyncArg::Flush => SyncStrategy::Flush,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a value to the end of the sequence
    Push {
        /// The value to append
        value: String,
    },

    /// Print the value at an index
    Get {
        /// Zero-based position
        index: usize,
    },

    /// Remove the value at an index
    Erase {
        /// Zero-based position
        index: usize,
    },

    /// Print the number of values
    Len,

    /// Print every value with its index
    Dump,

    /// Decode the whole log and print record counts
    Verify,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,logvec=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> logvec::Result<()> {
    std::fs::create_dir_all(&args.data_dir)?;

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(args.sync.into())
        .build();

    let open = || Sequence::open(config.clone());

    match args.command {
        Commands::Push { value } => {
            let mut seq = open()?;
            seq.push_back(value)?;
            println!("{}", seq.len());
        }
        Commands::Get { index } => {
            let seq = open()?;
            println!("{}", String::from_utf8_lossy(seq.at(index)?));
        }
        Commands::Erase { index } => {
            let mut seq = open()?;
            seq.erase(index)?;
            println!("{}", seq.len());
        }
        Commands::Len => println!("{}", open()?.len()),
        Commands::Dump => {
            let seq = open()?;
            for (index, value) in seq.iter().enumerate() {
                println!("{}\t{}", index, String::from_utf8_lossy(value));
            }
        }
        // Decodes without building state or creating the log
        Commands::Verify => {
            let stats = log::verify(&config.log_path())?;
            println!(
                "records={} pushes={} erases={} content_bytes={} log_bytes={}",
                stats.records, stats.pushes, stats.erases, stats.content_bytes, stats.log_bytes
            );
        }
    }

    Ok(())
}
