use clap::{Parser, Subcommand};
use parray::{Int32Codec, PersistentArray, PersistentArrayConfigBuilder, RecordCodec, TracingSubscriber};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "prar", version = "1.0.0", about = "Persistent fixed-record array CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new backing file of null-initialized i32 records
    Create {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        length: i64,
        /// Bytes per record; must match the built-in Int32Codec's size (5)
        #[arg(short, long, default_value_t = 5)]
        record_size: usize,
    },
    /// Read one record
    Get {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        index: i64,
    },
    /// Write one record
    Set {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        index: i64,
        #[arg(short, long)]
        value: i32,
    },
    /// Set every record to the same value
    Fill {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        value: i32,
    },
    /// Show header metadata
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print a range of records, one per line
    Dump {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        from: Option<i64>,
        #[arg(long)]
        to: Option<i64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        // ── Create ───────────────────────────────────────────────────────────
        Commands::Create { output, length, record_size } => {
            let descriptor = Int32Codec.descriptor();
            if record_size != descriptor.record_size {
                return Err(format!(
                    "--record-size {record_size} does not match the built-in Int32Codec's size ({})",
                    descriptor.record_size
                )
                .into());
            }
            let config = PersistentArrayConfigBuilder::new(&output)
                .subscriber(Arc::new(TracingSubscriber))
                .build()?;
            let mut array = PersistentArray::create(length, Box::new(Int32Codec), config)?;
            array.close()?;
            let size = std::fs::metadata(&output)?.len();
            println!("Created: {}  ({} records, {} B on disk)", output.display(), length, size);
        }

        // ── Get ──────────────────────────────────────────────────────────────
        Commands::Get { input, index } => {
            let mut array = open_array(&input)?;
            match array.get(index)? {
                Some(v) => println!("{index} = {v}"),
                None => println!("{index} = null"),
            }
            array.close()?;
        }

        // ── Set ──────────────────────────────────────────────────────────────
        Commands::Set { input, index, value } => {
            let mut array = open_array(&input)?;
            array.set(index, value)?;
            array.close()?;
            println!("{index} := {value}");
        }

        // ── Fill ─────────────────────────────────────────────────────────────
        Commands::Fill { input, value } => {
            let mut array = open_array(&input)?;
            array.fill(value)?;
            let len = array.len();
            array.close()?;
            println!("Filled {len} record(s) with {value}");
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let header = parray::peek_header(&input)?;
            let file_size = std::fs::metadata(&input)?.len();

            println!("── Persistent array ─────────────────────────────────────");
            println!("  Path            {}", input.display());
            println!("  File size       {} B", file_size);
            println!("  Version         {}.{}.{}", header.critical, header.major, header.minor);
            println!("  Record layout   {}", if header.record_layout() == parray::header::LAYOUT_DD_FIXED { "fixed" } else { "variable (unsupported)" });
            println!("  Length          {} records", header.length);
            println!("  Record size     {} B", header.record_size);
        }

        // ── Dump ─────────────────────────────────────────────────────────────
        Commands::Dump { input, from, to } => {
            let mut array = open_array(&input)?;
            let from = from.unwrap_or(0);
            let to = to.unwrap_or(array.len());
            for i in from..to {
                match array.get(i)? {
                    Some(v) => println!("{i}\t{v}"),
                    None => println!("{i}\tnull"),
                }
            }
            array.close()?;
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn open_array(path: &PathBuf) -> Result<PersistentArray<i32>, Box<dyn std::error::Error>> {
    let config = PersistentArrayConfigBuilder::new(path)
        .subscriber(Arc::new(TracingSubscriber))
        .build()?;
    Ok(PersistentArray::open(Box::new(Int32Codec), config, &[])?)
}
