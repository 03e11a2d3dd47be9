mod browser;
mod color;
mod error;
mod model;
mod scraper;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "paint_scraper", about = "Miniature paint catalog scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a vendor catalog and write the records as JSON
    Scrape {
        /// Vendor scraper to run
        #[arg(short, long, default_value = "citadel")]
        vendor: String,
        /// Output file (default: data/<vendor>/paints.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },
    /// List known vendor scrapers
    Vendors,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { vendor, out, headed } => {
            let mut scraper = scraper::by_name(&vendor, !headed).await?;
            let records = scraper.parse().await?;

            let path = out.unwrap_or_else(|| {
                PathBuf::from(store::DATA_ROOT)
                    .join(scraper.slug())
                    .join("paints.json")
            });
            store::save(&records, &path)?;
            println!(
                "Scraped {} paints -> {} ({:.1}s)",
                records.len(),
                path.display(),
                t0.elapsed().as_secs_f64()
            );
        }
        Commands::Vendors => {
            for (name, display) in scraper::VENDORS {
                println!("{:<12} {}", name, display);
            }
        }
    }

    Ok(())
}
