use crate::models::{ListingRecord, RawListing};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Normalize collected rows into persistable records: clean the
/// neighborhood text, parse the posting timestamp, and derive the
/// date-scoped identity key.
///
/// Pure transformation; nothing is dropped or reordered here. The
/// ingestion date is computed once by the caller (the date the run
/// executes, not the post's own date) so this stage stays deterministic.
pub fn normalize_listings(
    raw: Vec<RawListing>,
    ingestion_date: NaiveDate,
) -> Result<Vec<ListingRecord>> {
    raw.into_iter()
        .map(|listing| {
            let post_datetime = parse_post_datetime(&listing.post_datetime)
                .with_context(|| format!("Unparseable post timestamp on {}", listing.post_link))?;

            Ok(ListingRecord {
                id: derive_id(&listing.post_link, ingestion_date),
                region: listing.region,
                post_datetime,
                neighborhood: clean_neighborhood(&listing.neighborhood),
                title: listing.title,
                price: listing.price,
                post_link: listing.post_link,
            })
        })
        .collect()
}

/// Date-scoped identity: the same link scraped on different days yields
/// different ids, while repeat scrapes within one day collapse to one.
pub fn derive_id(post_link: &str, ingestion_date: NaiveDate) -> String {
    format!("{}_{}", post_link, ingestion_date.format("%Y_%m_%d"))
}

/// Strip the enclosing parenthesis characters and leading whitespace the
/// source wraps neighborhood annotations in.
fn clean_neighborhood(raw: &str) -> String {
    raw.replace(['(', ')'], "").trim_start().to_string()
}

fn parse_post_datetime(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| anyhow::anyhow!("'{}': {}", raw, e))
}
