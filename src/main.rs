use clap::Parser;
use ratewatch::cli::commands::{Cli, Commands};
use ratewatch::domain::entities::catalog::CatalogSeed;
use ratewatch::domain::values::trigger::TriggerType;
use ratewatch::RateWatch;

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let db_path = std::env::var("RATEWATCH_DB").unwrap_or_else(|_| "./ratewatch.db".into());

    let rw = match RateWatch::new(&db_path) {
        Ok(rw) => rw,
        Err(e) => {
            eprintln!("Error initializing ratewatch: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(rw, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(rw: RateWatch, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Seed { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let seed: CatalogSeed = serde_json::from_str(&raw)?;
            let report = rw.seed(&seed)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Sources => {
            let sources = rw.sources()?;
            println!("{}", serde_json::to_string_pretty(&sources)?);
        }
        Commands::Fetch { trigger } => {
            let trigger: TriggerType = trigger.parse().map_err(|e: String| e)?;
            let summary = rw.run_fetch(trigger).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if !summary.success {
                std::process::exit(1);
            }
        }
        Commands::Latest { ttl_secs } => {
            let view = rw.fresh_data(ttl_secs).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Stats => {
            let stats = rw.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
