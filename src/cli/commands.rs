use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ratewatch", about = "Multi-source price quote ingestion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load categories, sources and symbols from a JSON seed file
    Seed {
        /// Path to the seed file
        file: String,
    },
    /// List configured data sources
    Sources,
    /// Run one fetch cycle across all active sources
    Fetch {
        /// Trigger type (scheduled, manual, cache-miss, cache-expired)
        #[arg(long, default_value = "manual")]
        trigger: String,
    },
    /// Read the latest aggregate, refreshing first if it is stale
    Latest {
        /// Freshness window in seconds
        #[arg(long, default_value = "3600")]
        ttl_secs: i64,
    },
    /// Show price history statistics
    Stats,
}
