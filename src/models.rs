use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Listing category. Each category is searched separately and persisted
/// to its own table, with identical processing logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    RoomShares,
    Apartments,
}

impl Category {
    /// Processing order for a run: room shares first, then apartments.
    pub const ALL: [Category; 2] = [Category::RoomShares, Category::Apartments];

    /// Name of the table the category's records are persisted to.
    pub fn table(&self) -> &'static str {
        match self {
            Category::RoomShares => "rooms",
            Category::Apartments => "apartments",
        }
    }

    /// Craigslist search section for the category.
    pub fn search_section(&self) -> &'static str {
        match self {
            Category::RoomShares => "roo",
            Category::Apartments => "apa",
        }
    }

    /// Human-readable name used in status messages.
    pub fn label(&self) -> &'static str {
        match self {
            Category::RoomShares => "room share",
            Category::Apartments => "apartment",
        }
    }

    pub fn from_table(name: &str) -> Option<Category> {
        match name {
            "rooms" => Some(Category::RoomShares),
            "apartments" => Some(Category::Apartments),
            _ => None,
        }
    }
}

/// One result node as extracted from a search results page, before
/// normalization. The neighborhood is verbatim source text (usually
/// wrapped in parentheses) and the timestamp is the source's string.
#[derive(Debug, Clone)]
pub struct RawListing {
    pub region: String,
    pub post_datetime: String,
    pub neighborhood: String,
    pub title: String,
    pub price: i64,
    pub post_link: String,
}

/// A normalized listing as persisted to the store.
///
/// `id` is the date-scoped identity key: the post link concatenated with
/// the ingestion run's calendar date. Records are append-only, never
/// updated or deleted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    pub region: String,
    pub post_datetime: NaiveDateTime,
    pub neighborhood: String,
    pub title: String,
    pub price: i64,
    pub post_link: String,
}
