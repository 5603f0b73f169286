use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use nycfinder::collector::{self, DelayRange};
use nycfinder::config;
use nycfinder::fetch::HttpFetcher;
use nycfinder::models::Category;
use nycfinder::normalize;
use nycfinder::store::Store;
use nycfinder::sync;
use nycfinder::utils;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Craigslist apartment search for the New York regions")]
struct Args {
    /// Connection string for the persistent store (falls back to DATABASE_PATH)
    #[clap(short, long)]
    database: Option<String>,

    /// Minimum listing price passed to the source search
    #[clap(long, default_value_t = config::DEFAULT_MIN_PRICE)]
    min_price: i64,

    /// Minimum politeness delay before each region fetch, in seconds
    #[clap(long, default_value_t = 1)]
    min_delay: u64,

    /// Maximum politeness delay before each region fetch, in seconds
    #[clap(long, default_value_t = 5)]
    max_delay: u64,

    /// Directory to export the accumulated tables as CSV after syncing
    #[clap(long)]
    export_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let database = match &args.database {
        Some(database) => database.clone(),
        None => std::env::var("DATABASE_PATH")
            .context("No --database given and DATABASE_PATH is not set")?,
    };
    let delay = DelayRange::new(args.min_delay, args.max_delay)?;

    println!("Craigslist Apartment Search");
    println!("===========================");

    let fetcher = HttpFetcher::new()?;
    let mut store = Store::open(&database)?;
    store.ensure_schema()?;

    // Categories run one after another; a failure in one is reported and
    // must not stop the other.
    for category in Category::ALL {
        println!("\nsearching for {}s...", category.label());
        if let Err(e) = run_category(&fetcher, &mut store, category, &args, delay) {
            eprintln!("error updating the {} table: {:#}", category.table(), e);
            eprintln!("{} records not updated.", category.label());
        }
    }

    println!(
        "\ncraigslist apartment searches complete at {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

fn run_category(
    fetcher: &HttpFetcher,
    store: &mut Store,
    category: Category,
    args: &Args,
    delay: DelayRange,
) -> Result<()> {
    let searches = config::category_searches(category, args.min_price);
    let collected = collector::collect_category(fetcher, &searches, delay)?;

    let ingestion_date = Local::now().date_naive();
    let records = normalize::normalize_listings(collected, ingestion_date)?;

    let added = sync::sync_category(store, category, &records)?;
    if added > 0 {
        println!(
            "craigslist {} database successfully updated with {} new posts.",
            category.label(),
            added
        );
    }

    if let Some(dir) = &args.export_csv {
        let stored = store.load_listings(category)?;
        utils::export_category_csv(dir, category, &stored)?;
    }

    Ok(())
}
