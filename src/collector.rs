use crate::fetch::PageFetcher;
use crate::models::RawListing;
use crate::parser;
use anyhow::{Context, Result};
use rand::Rng;
use std::time::Duration;

/// Inclusive range of whole seconds slept before each region fetch, a
/// politeness measure against source-side rate limiting.
#[derive(Debug, Clone, Copy)]
pub struct DelayRange {
    min_secs: u64,
    max_secs: u64,
}

impl DelayRange {
    pub fn new(min_secs: u64, max_secs: u64) -> Result<DelayRange> {
        anyhow::ensure!(
            min_secs <= max_secs,
            "delay range {}-{} is inverted",
            min_secs,
            max_secs
        );
        Ok(DelayRange { min_secs, max_secs })
    }

    /// No sleeping at all; tests use this.
    pub fn none() -> DelayRange {
        DelayRange {
            min_secs: 0,
            max_secs: 0,
        }
    }

    fn sleep(&self) {
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        if secs > 0 {
            std::thread::sleep(Duration::from_secs(secs));
        }
    }
}

/// Fetch and parse every configured region search for one category,
/// concatenating the parsed rows into a single in-memory table.
///
/// Regions are processed strictly one at a time, sleeping a random delay
/// from `delay` before each fetch. A fetch failure aborts the whole
/// collection; there is no retry beyond the politeness delay.
pub fn collect_category<F: PageFetcher>(
    fetcher: &F,
    searches: &[(String, String)],
    delay: DelayRange,
) -> Result<Vec<RawListing>> {
    let mut listings = Vec::new();

    for (region, url) in searches {
        delay.sleep();

        let html = fetcher
            .fetch(url)
            .with_context(|| format!("Failed to fetch search results for {}", region))?;

        let parsed = parser::parse_result_page(&html, region);
        println!("location: {}\nposts found: {}\n", region, parsed.len());

        listings.extend(parsed);
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct CannedFetcher {
        pages: HashMap<String, String>,
    }

    impl PageFetcher for CannedFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("connection refused: {}", url))
        }
    }

    fn page_with_rows(rows: &[(&str, &str, i64)]) -> String {
        let mut body = String::new();
        for (link, hood, price) in rows {
            body.push_str(&format!(
                r#"<li class="result-row">
                    <a href="{link}"><span class="result-price">${price}</span></a>
                    <p><time class="result-date" datetime="2020-04-08 09:01">Apr 8</time>
                    <a href="{link}" class="result-title hdrlnk">A room</a>
                    <span class="result-hood"> ({hood})</span></p>
                </li>"#
            ));
        }
        // Trailing row standing in for the source's paging element.
        body.push_str(r##"<li class="result-row"><a href="#next">more</a></li>"##);
        format!("<html><body><ul>{}</ul></body></html>", body)
    }

    #[test]
    fn accumulates_rows_across_regions_in_order() {
        let searches = vec![
            ("manhattan".to_string(), "https://s/mnh".to_string()),
            ("brooklyn".to_string(), "https://s/brk".to_string()),
        ];
        let mut pages = HashMap::new();
        pages.insert(
            "https://s/mnh".to_string(),
            page_with_rows(&[("https://x/1", "Harlem", 1400)]),
        );
        pages.insert(
            "https://s/brk".to_string(),
            page_with_rows(&[
                ("https://x/2", "Williamsburg", 1500),
                ("https://x/3", "Bushwick", 1100),
            ]),
        );
        let fetcher = CannedFetcher { pages };

        let listings = collect_category(&fetcher, &searches, DelayRange::none()).unwrap();

        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0].region, "manhattan");
        assert_eq!(listings[1].region, "brooklyn");
        assert_eq!(listings[2].post_link, "https://x/3");
    }

    #[test]
    fn fetch_failure_aborts_the_collection() {
        let searches = vec![
            ("manhattan".to_string(), "https://s/mnh".to_string()),
            ("brooklyn".to_string(), "https://s/brk".to_string()),
        ];
        // Only brooklyn resolves; the earlier manhattan fetch must fail
        // the whole run before brooklyn is attempted.
        let mut pages = HashMap::new();
        pages.insert(
            "https://s/brk".to_string(),
            page_with_rows(&[("https://x/2", "Williamsburg", 1500)]),
        );
        let fetcher = CannedFetcher { pages };

        let result = collect_category(&fetcher, &searches, DelayRange::none());

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("manhattan"));
    }

    #[test]
    fn inverted_delay_range_is_rejected() {
        assert!(DelayRange::new(5, 1).is_err());
        assert!(DelayRange::new(1, 5).is_ok());
        assert!(DelayRange::new(2, 2).is_ok());
    }
}
