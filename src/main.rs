use anyhow::Context;
use clap::{Parser, Subcommand};
use speed_chart::config::Config;
use speed_chart::storage::ChartStore;
use speed_chart::{logging, pipeline};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "speed_chart")]
#[command(about = "Dance music speed chart scraper and report builder")]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults to ./speed_chart.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the chart page and save the raw HTML
    Fetch,
    /// Extract chart rows from the saved HTML into the raw JSON file
    Parse,
    /// Clean the raw records into the normalized JSON file
    Normalize,
    /// Create the database schema and load the normalized records
    Load,
    /// Look up video links for songs that do not have one yet
    Enrich,
    /// Render the HTML report from the database
    Report,
    /// Fetch, parse, normalize, load and report in one go
    Run,
}

fn print_store_overview(store: &ChartStore) -> anyhow::Result<()> {
    let counts = store.counts()?;
    println!("\nDatabase populated successfully!");
    println!("  Songs: {}", counts.songs);
    println!("  Dances: {}", counts.dances);
    println!("  Song-Dance relationships: {}", counts.song_dances);

    println!("\n=== Sample query: Songs for Swing ===");
    for song in store.songs_for_dance("Swing", 5)? {
        println!("  {} by {} ({} BPM)", song.title, song.artist, song.tempo);
    }

    println!("\n=== Sample query: All dances for 'In the Mood' ===");
    for dance in store.dances_for_title("In the Mood")? {
        println!("  {}", dance);
    }

    println!("\n=== All dances available ===");
    for dance in store.dance_names()? {
        println!("  {}", dance);
    }
    Ok(())
}

async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Fetch => {
            let summary = pipeline::fetch_stage(config).await.context("fetching chart page")?;
            println!("Raw HTML saved to {}", config.paths.raw_html.display());
            println!("HTML length: {} characters", summary.html_len);
            println!("Found {} table elements, {} pre elements", summary.tables, summary.pre_blocks);
        }
        Commands::Parse => {
            let records = pipeline::parse_stage(config).context("parsing chart page")?;
            println!("Saved {} records to {}", records.len(), config.paths.raw_json.display());
        }
        Commands::Normalize => {
            let records = pipeline::normalize_stage(config).context("normalizing records")?;
            println!("Normalized {} records", records.len());
        }
        Commands::Load => {
            let (store, summary) = pipeline::load_stage(config).context("loading database")?;
            if !summary.skipped_dances.is_empty() {
                println!("Skipped {} unresolved dance links", summary.skipped_dances.len());
            }
            print_store_overview(&store)?;
            println!("\nDatabase saved to {}", config.paths.database.display());
        }
        Commands::Enrich => {
            let summary = pipeline::enrich_stage(config).await.context("enriching songs")?;
            if summary.processed == 0 {
                println!("All songs have video links!");
            } else {
                println!("\nAdded {} video links ({} skipped)", summary.linked, summary.skipped.len());
            }
        }
        Commands::Report => {
            let rows = pipeline::report_stage(config).context("rendering report")?;
            println!("Generated {} with {} songs", config.paths.report.display(), rows);
        }
        Commands::Run => {
            let summary = pipeline::run_all(config).await.context("running pipeline")?;
            println!("\nPipeline results:");
            println!("   Raw records: {}", summary.raw_records);
            println!("   Normalized: {}", summary.normalized_records);
            println!("   Songs inserted: {}", summary.songs_inserted);
            println!("   Dances: {}", summary.dances);
            println!("   Song-Dance relationships: {}", summary.associations);
            println!("   Report rows: {}", summary.report_rows);
            println!("   Report file: {}", config.paths.report.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref()).context("loading configuration")?;

    if let Err(e) = run(cli.command, &config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
