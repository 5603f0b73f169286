use crate::models::ListingRecord;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Records whose price falls inside the inclusive [low, high] range.
pub fn filter_price_range(records: &[ListingRecord], low: i64, high: i64) -> Vec<ListingRecord> {
    records
        .iter()
        .filter(|r| r.price >= low && r.price <= high)
        .cloned()
        .collect()
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PostCount {
    pub post_date: NaiveDate,
    pub neighborhood: String,
    pub posts: usize,
}

/// Count of posts per calendar date per neighborhood, ordered by date
/// then neighborhood.
pub fn posts_per_date(records: &[ListingRecord]) -> Vec<PostCount> {
    let mut counts: BTreeMap<(NaiveDate, &str), usize> = BTreeMap::new();
    for record in records {
        let key = (record.post_datetime.date(), record.neighborhood.as_str());
        *counts.entry(key).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((post_date, neighborhood), posts)| PostCount {
            post_date,
            neighborhood: neighborhood.to_string(),
            posts,
        })
        .collect()
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MedianPrice {
    pub post_date: NaiveDate,
    pub neighborhood: String,
    pub median_price: f64,
}

/// Median posting price per calendar date per neighborhood.
pub fn median_price_per_date(records: &[ListingRecord]) -> Vec<MedianPrice> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<i64>> = BTreeMap::new();
    for record in records {
        let key = (record.post_datetime.date(), record.neighborhood.as_str());
        groups.entry(key).or_default().push(record.price);
    }

    groups
        .into_iter()
        .map(|((post_date, neighborhood), mut prices)| MedianPrice {
            post_date,
            neighborhood: neighborhood.to_string(),
            median_price: median(&mut prices),
        })
        .collect()
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PriceSummary {
    pub neighborhood: String,
    pub median_price: f64,
    pub mean_price: f64,
}

/// All-time median and mean price per neighborhood, rounded to whole
/// currency units.
pub fn all_time_prices(records: &[ListingRecord]) -> Vec<PriceSummary> {
    let mut groups: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.neighborhood.as_str())
            .or_default()
            .push(record.price);
    }

    groups
        .into_iter()
        .map(|(neighborhood, mut prices)| {
            let mean = prices.iter().sum::<i64>() as f64 / prices.len() as f64;
            PriceSummary {
                neighborhood: neighborhood.to_string(),
                median_price: median(&mut prices).round(),
                mean_price: mean.round(),
            }
        })
        .collect()
}

/// Midpoint-average median; `prices` is never empty (groups only exist
/// with at least one member).
fn median(prices: &mut [i64]) -> f64 {
    prices.sort_unstable();
    let n = prices.len();
    if n % 2 == 1 {
        prices[n / 2] as f64
    } else {
        (prices[n / 2 - 1] + prices[n / 2]) as f64 / 2.0
    }
}

/// Unit size inferred from a post title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSize {
    Studio,
    OneBedroom,
    TwoBedroom,
    ThreeBedroom,
    FourBedroom,
    FiveBedroom,
    Other,
}

impl UnitSize {
    pub const ALL: [UnitSize; 7] = [
        UnitSize::Studio,
        UnitSize::OneBedroom,
        UnitSize::TwoBedroom,
        UnitSize::ThreeBedroom,
        UnitSize::FourBedroom,
        UnitSize::FiveBedroom,
        UnitSize::Other,
    ];
}

/// Classify a post title into a unit size by case-insensitive keyword
/// match: "studio", then digit or spelled-out bedroom counts ("2br",
/// "2 bedroom", "two bedroom"). Titles matching nothing are Other.
pub fn classify_unit_size(title: &str) -> UnitSize {
    let bedroom_patterns = [
        (UnitSize::Studio, r"(?i)\bstudio\b"),
        (UnitSize::OneBedroom, r"(?i)\b(1\s*(br|bd|bed|bedroom)s?|one\s+bedroom)\b"),
        (UnitSize::TwoBedroom, r"(?i)\b(2\s*(br|bd|bed|bedroom)s?|two\s+bedroom)\b"),
        (UnitSize::ThreeBedroom, r"(?i)\b(3\s*(br|bd|bed|bedroom)s?|three\s+bedroom)\b"),
        (UnitSize::FourBedroom, r"(?i)\b(4\s*(br|bd|bed|bedroom)s?|four\s+bedroom)\b"),
        (UnitSize::FiveBedroom, r"(?i)\b(5\s*(br|bd|bed|bedroom)s?|five\s+bedroom)\b"),
    ];

    for (size, pattern) in bedroom_patterns {
        if Regex::new(pattern).unwrap().is_match(title) {
            return size;
        }
    }

    UnitSize::Other
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UnitSizeCount {
    pub unit_size: UnitSize,
    pub posts: usize,
}

/// Post counts by inferred unit size, in size order.
pub fn unit_size_counts(records: &[ListingRecord]) -> Vec<UnitSizeCount> {
    UnitSize::ALL
        .iter()
        .map(|&unit_size| UnitSizeCount {
            unit_size,
            posts: records
                .iter()
                .filter(|r| classify_unit_size(&r.title) == unit_size)
                .count(),
        })
        .collect()
}
