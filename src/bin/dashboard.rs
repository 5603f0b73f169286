use anyhow::{Context, Result};
use clap::Parser;
use nycfinder::dashboard::{self, Snapshot};
use nycfinder::models::Category;
use nycfinder::store::Store;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Read-only dashboard API over the accumulated listing tables")]
struct Args {
    /// Connection string for the persistent store (falls back to DATABASE_PATH)
    #[clap(short, long)]
    database: Option<String>,

    /// Address to listen on
    #[clap(short, long, default_value = "127.0.0.1:8050")]
    listen: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let database = match &args.database {
        Some(database) => database.clone(),
        None => std::env::var("DATABASE_PATH")
            .context("No --database given and DATABASE_PATH is not set")?,
    };

    // One-time snapshot load; restart the server to pick up new records.
    let snapshot = {
        let store = Store::open(&database)?;
        store.ensure_schema()?;
        Snapshot::load(&store)?
    };
    println!(
        "loaded {} room share and {} apartment records",
        snapshot.listings(Category::RoomShares).len(),
        snapshot.listings(Category::Apartments).len()
    );

    dashboard::serve(snapshot, &args.listen).await
}
