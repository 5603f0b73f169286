use crate::models::RawListing;
use scraper::{ElementRef, Html, Selector};

struct RowSelectors {
    row: Selector,
    date: Selector,
    title: Selector,
    hood: Selector,
    anchor: Selector,
}

impl RowSelectors {
    fn new() -> RowSelectors {
        RowSelectors {
            row: Selector::parse("li.result-row").unwrap(),
            date: Selector::parse("time.result-date").unwrap(),
            title: Selector::parse("a.result-title.hdrlnk").unwrap(),
            hood: Selector::parse("span.result-hood").unwrap(),
            anchor: Selector::parse("a").unwrap(),
        }
    }
}

/// Parse one search results page into listing rows for the given region.
///
/// One pass over the document, no input mutation. The final result row of
/// each page is excluded: the source's result lists end with a trailing
/// non-listing element. Rows missing a neighborhood annotation and rows
/// whose price text does not parse as a whole number are skipped, not
/// errors.
pub fn parse_result_page(html: &str, region: &str) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    let selectors = RowSelectors::new();

    let rows: Vec<ElementRef> = document.select(&selectors.row).collect();
    let candidate_count = rows.len().saturating_sub(1);

    rows.into_iter()
        .take(candidate_count)
        .filter_map(|row| parse_result_row(row, region, &selectors))
        .collect()
}

fn parse_result_row(row: ElementRef, region: &str, selectors: &RowSelectors) -> Option<RawListing> {
    // A row without a neighborhood annotation is unusable, skip it.
    let hood = row.select(&selectors.hood).next()?;

    let time = row.select(&selectors.date).next()?;
    let post_datetime = time.value().attr("datetime")?;

    let title = row.select(&selectors.title).next()?;
    let post_link = title.value().attr("href")?;
    let title_text = title.text().collect::<String>().trim().to_string();

    // The first anchor in a row carries the price text.
    let price_anchor = row.select(&selectors.anchor).next()?;
    let price = parse_price(&price_anchor.text().collect::<String>())?;

    Some(RawListing {
        region: region.to_string(),
        post_datetime: post_datetime.to_string(),
        neighborhood: hood.text().collect::<String>(),
        title: title_text,
        price,
        post_link: post_link.to_string(),
    })
}

/// Parse a price like "$1500" into a whole number of dollars. Anything
/// that is not an integer after stripping the currency symbol and
/// surrounding whitespace is rejected.
fn parse_price(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let stripped = trimmed.strip_prefix('$').unwrap_or(trimmed);
    stripped.trim().parse::<i64>().ok()
}
