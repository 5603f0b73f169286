use crate::models::{Category, ListingRecord};
use crate::store::{Store, StoreError};
use std::collections::HashSet;

/// Reconcile freshly collected records against the persisted table and
/// append only the genuinely new ones.
///
/// A record is new when its date-scoped id is not stored yet AND its post
/// link has never been stored under any earlier id — the second check is
/// the cross-date guard against the same posting reappearing with a fresh
/// synthetic id. When one run carries duplicate ids, the first-seen row
/// wins. Returns the number of rows appended.
pub fn sync_category(
    store: &mut Store,
    category: Category,
    records: &[ListingRecord],
) -> Result<usize, StoreError> {
    println!("reading the {} database... ", category.label());
    let existing = store.existing_keys(category)?;
    let existing_ids: HashSet<&str> = existing.iter().map(|(id, _)| id.as_str()).collect();
    let existing_links: HashSet<&str> = existing.iter().map(|(_, link)| link.as_str()).collect();

    let mut seen_ids = HashSet::new();
    let mut new_records = Vec::new();

    for record in records {
        if existing_ids.contains(record.id.as_str()) {
            continue;
        }
        if !seen_ids.insert(record.id.as_str()) {
            continue;
        }
        if existing_links.contains(record.post_link.as_str()) {
            continue;
        }
        new_records.push(record.clone());
    }

    if new_records.is_empty() {
        println!("no new records to add.");
        return Ok(0);
    }

    println!("{} new records will be added.", new_records.len());
    store.append_listings(category, &new_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, post_link: &str, title: &str) -> ListingRecord {
        ListingRecord {
            id: id.to_string(),
            region: "queens".to_string(),
            post_datetime: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            neighborhood: "Astoria".to_string(),
            title: title.to_string(),
            price: 1200,
            post_link: post_link.to_string(),
        }
    }

    fn open_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    #[test]
    fn empty_store_takes_every_distinct_record() {
        let mut store = open_store();
        let records: Vec<ListingRecord> = (1..=5)
            .map(|i| {
                record(
                    &format!("https://x/{}_2024_01_01", i),
                    &format!("https://x/{}", i),
                    "room",
                )
            })
            .collect();

        let added = sync_category(&mut store, Category::RoomShares, &records).unwrap();

        assert_eq!(added, 5);
        assert_eq!(store.load_listings(Category::RoomShares).unwrap().len(), 5);
    }

    #[test]
    fn second_identical_run_adds_nothing() {
        let mut store = open_store();
        let records = vec![
            record("https://x/1_2024_01_01", "https://x/1", "room"),
            record("https://x/2_2024_01_01", "https://x/2", "room"),
        ];

        sync_category(&mut store, Category::RoomShares, &records).unwrap();
        let added = sync_category(&mut store, Category::RoomShares, &records).unwrap();

        assert_eq!(added, 0);
        assert_eq!(store.load_listings(Category::RoomShares).unwrap().len(), 2);
    }

    #[test]
    fn stored_link_is_never_readded_under_a_new_date() {
        let mut store = open_store();
        let first_run = vec![record("https://x/1_2024_01_01", "https://x/1", "room")];
        sync_category(&mut store, Category::RoomShares, &first_run).unwrap();

        // Next day's run derives a different id for the same link.
        let second_run = vec![record("https://x/1_2024_01_02", "https://x/1", "room")];
        let added = sync_category(&mut store, Category::RoomShares, &second_run).unwrap();

        assert_eq!(added, 0);
    }

    #[test]
    fn duplicate_ids_within_a_run_keep_the_first_row() {
        let mut store = open_store();
        let records = vec![
            record("https://x/1_2024_01_01", "https://x/1", "first posting"),
            record("https://x/1_2024_01_01", "https://x/1", "second posting"),
        ];

        let added = sync_category(&mut store, Category::RoomShares, &records).unwrap();

        assert_eq!(added, 1);
        let stored = store.load_listings(Category::RoomShares).unwrap();
        assert_eq!(stored[0].title, "first posting");
    }

    #[test]
    fn categories_do_not_see_each_others_records() {
        let mut store = open_store();
        let records = vec![record("https://x/1_2024_01_01", "https://x/1", "room")];

        sync_category(&mut store, Category::RoomShares, &records).unwrap();
        let added = sync_category(&mut store, Category::Apartments, &records).unwrap();

        // Same link, but the apartments table has its own invariants.
        assert_eq!(added, 1);
    }
}
