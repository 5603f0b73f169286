use crate::models::{Category, ListingRecord};
use crate::stats;
use crate::store::{Store, StoreError};
use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Immutable dataset snapshot held by the serving component.
///
/// Loaded once at startup; picking up newly ingested records requires a
/// restart. The store handle is not retained, so ingestion runs can
/// write while the dashboard serves.
pub struct Snapshot {
    rooms: Vec<ListingRecord>,
    apartments: Vec<ListingRecord>,
}

impl Snapshot {
    pub fn load(store: &Store) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            rooms: store.load_listings(Category::RoomShares)?,
            apartments: store.load_listings(Category::Apartments)?,
        })
    }

    pub fn listings(&self, category: Category) -> &[ListingRecord] {
        match category {
            Category::RoomShares => &self.rooms,
            Category::Apartments => &self.apartments,
        }
    }
}

/// Optional filters accepted by every endpoint: an inclusive price range
/// and a comma-separated neighborhood selection.
#[derive(Debug, Default, Deserialize)]
pub struct ListingFilter {
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub neighborhoods: Option<String>,
}

impl ListingFilter {
    fn apply(&self, records: &[ListingRecord]) -> Vec<ListingRecord> {
        let low = self.min_price.unwrap_or(i64::MIN);
        let high = self.max_price.unwrap_or(i64::MAX);
        let mut filtered = stats::filter_price_range(records, low, high);

        let wanted: Vec<String> = self
            .neighborhoods
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !wanted.is_empty() {
            filtered.retain(|r| wanted.iter().any(|w| *w == r.neighborhood.to_lowercase()));
        }

        filtered
    }
}

pub fn router(snapshot: Arc<Snapshot>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/:category/listings", get(listings))
        .route("/api/:category/posts-per-date", get(posts_per_date))
        .route("/api/:category/median-price-per-date", get(median_price_per_date))
        .route("/api/:category/price-summary", get(price_summary))
        .route("/api/:category/unit-sizes", get(unit_sizes))
        .with_state(snapshot)
}

/// Serve the read-only dashboard API until interrupted.
pub async fn serve(snapshot: Snapshot, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    println!("dashboard serving on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(snapshot)))
        .await
        .context("Dashboard server failed")?;
    Ok(())
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "categories": ["rooms", "apartments"],
        "endpoints": [
            "/api/{category}/listings",
            "/api/{category}/posts-per-date",
            "/api/{category}/median-price-per-date",
            "/api/{category}/price-summary",
            "/api/{category}/unit-sizes",
        ],
        "filters": ["min_price", "max_price", "neighborhoods"],
    }))
}

fn filtered(
    snapshot: &Snapshot,
    category: &str,
    filter: &ListingFilter,
) -> Result<Vec<ListingRecord>, StatusCode> {
    let category = Category::from_table(category).ok_or(StatusCode::NOT_FOUND)?;
    Ok(filter.apply(snapshot.listings(category)))
}

async fn listings(
    State(snapshot): State<Arc<Snapshot>>,
    Path(category): Path<String>,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<Vec<ListingRecord>>, StatusCode> {
    let records = filtered(&snapshot, &category, &filter)?;
    Ok(Json(records))
}

async fn posts_per_date(
    State(snapshot): State<Arc<Snapshot>>,
    Path(category): Path<String>,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<Vec<stats::PostCount>>, StatusCode> {
    let records = filtered(&snapshot, &category, &filter)?;
    Ok(Json(stats::posts_per_date(&records)))
}

async fn median_price_per_date(
    State(snapshot): State<Arc<Snapshot>>,
    Path(category): Path<String>,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<Vec<stats::MedianPrice>>, StatusCode> {
    let records = filtered(&snapshot, &category, &filter)?;
    Ok(Json(stats::median_price_per_date(&records)))
}

async fn price_summary(
    State(snapshot): State<Arc<Snapshot>>,
    Path(category): Path<String>,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<Vec<stats::PriceSummary>>, StatusCode> {
    let records = filtered(&snapshot, &category, &filter)?;
    Ok(Json(stats::all_time_prices(&records)))
}

async fn unit_sizes(
    State(snapshot): State<Arc<Snapshot>>,
    Path(category): Path<String>,
    Query(filter): Query<ListingFilter>,
) -> Result<Json<Vec<stats::UnitSizeCount>>, StatusCode> {
    let records = filtered(&snapshot, &category, &filter)?;
    Ok(Json(stats::unit_size_counts(&records)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn listing(neighborhood: &str, price: i64) -> ListingRecord {
        ListingRecord {
            id: format!("https://x/{}_{}", neighborhood, price),
            region: "brooklyn".to_string(),
            post_datetime: NaiveDate::from_ymd_opt(2020, 4, 8)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            neighborhood: neighborhood.to_string(),
            title: "a room".to_string(),
            price,
            post_link: format!("https://x/{}_{}", neighborhood, price),
        }
    }

    #[test]
    fn no_filters_keeps_everything() {
        let records = vec![listing("Williamsburg", 1500), listing("Astoria", 1200)];

        let filtered = ListingFilter::default().apply(&records);

        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn neighborhood_filter_is_case_insensitive() {
        let records = vec![listing("Williamsburg", 1500), listing("Astoria", 1200)];
        let filter = ListingFilter {
            neighborhoods: Some("williamsburg, SOHO".to_string()),
            ..Default::default()
        };

        let filtered = filter.apply(&records);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].neighborhood, "Williamsburg");
    }

    #[test]
    fn price_and_neighborhood_filters_combine() {
        let records = vec![
            listing("Williamsburg", 1500),
            listing("Williamsburg", 3500),
            listing("Astoria", 1500),
        ];
        let filter = ListingFilter {
            min_price: Some(1000),
            max_price: Some(2000),
            neighborhoods: Some("Williamsburg".to_string()),
        };

        let filtered = filter.apply(&records);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].price, 1500);
    }

    #[test]
    fn unknown_category_is_not_found() {
        let snapshot = Snapshot {
            rooms: Vec::new(),
            apartments: Vec::new(),
        };

        let result = filtered(&snapshot, "condos", &ListingFilter::default());

        assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
    }
}
