//! bloomstore CLI
//!
//! Command-line interface for on-disk Bloom filters.

use clap::{Parser, Subcommand};
use bloomstore::{BloomFilter, Config, Membership};
use tracing_subscriber::{fmt, EnvFilter};

/// bloomstore CLI
#[derive(Parser, Debug)]
#[command(name = "bloomstore-cli")]
#[command(about = "Create and query file-backed Bloom filters")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new filter file
    Create {
        /// Filter file path
        path: String,

        /// Number of elements the filter is sized for
        #[arg(short = 'n', long, default_value = "1000000")]
        elements: u64,

        /// Target false positive rate
        #[arg(short = 'p', long, default_value = "0.01")]
        rate: f32,
    },

    /// Add elements to a filter file
    Add {
        /// Filter file path
        path: String,

        /// Elements to add
        #[arg(required = true)]
        elements: Vec<String>,
    },

    /// Check elements against a filter file
    Check {
        /// Filter file path
        path: String,

        /// Elements to check
        #[arg(required = true)]
        elements: Vec<String>,
    },

    /// Print filter statistics
    Stats {
        /// Filter file path
        path: String,
    },

    /// Print the filter as a hex transcript
    ExportHex {
        /// Filter file path
        path: String,
    },

    /// Write a hex transcript to a filter file
    ImportHex {
        /// Destination filter file path
        path: String,

        /// Hex transcript
        hex: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bloomstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> bloomstore::Result<()> {
    match command {
        Commands::Create { path, elements, rate } => {
            let config = Config::builder()
                .estimated_elements(elements)
                .false_positive_rate(rate)
                .build();
            let filter = BloomFilter::create_on_disk_with_config(&path, &config)?;
            tracing::info!(
                "Created {} ({} bits, {} hashes)",
                path,
                filter.number_bits(),
                filter.number_hashes()
            );
            filter.destroy()
        }
        Commands::Add { path, elements } => {
            let filter = BloomFilter::open_on_disk(&path)?;
            for element in &elements {
                filter.add(element)?;
            }
            tracing::info!("Added {} elements to {}", elements.len(), path);
            filter.destroy()
        }
        Commands::Check { path, elements } => {
            let filter = BloomFilter::open_on_disk(&path)?;
            for element in &elements {
                let verdict = match filter.check(element)? {
                    Membership::PossiblyPresent => "possibly present",
                    Membership::DefinitelyAbsent => "absent",
                };
                println!("{}\t{}", element, verdict);
            }
            filter.destroy()
        }
        Commands::Stats { path } => {
            let filter = BloomFilter::open_on_disk(&path)?;
            println!("{}", filter.stats());
            filter.destroy()
        }
        Commands::ExportHex { path } => {
            let filter = BloomFilter::open_on_disk(&path)?;
            println!("{}", filter.export_to_hex());
            filter.destroy()
        }
        Commands::ImportHex { path, hex } => {
            let filter = BloomFilter::import_from_hex(hex.trim())?;
            filter.export_to_file(&path)?;
            tracing::info!("Wrote {} ({} bytes)", path, filter.export_size());
            Ok(())
        }
    }
}
