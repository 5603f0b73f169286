use crate::models::Category;

const BASE_URL: &str = "https://newyork.craigslist.org";

/// Region name to Craigslist area code, covering the fixed set of regions
/// every run collects.
pub const REGIONS: [(&str, &str); 5] = [
    ("manhattan", "mnh"),
    ("brooklyn", "brk"),
    ("new_jersey", "jsy"),
    ("queens", "que"),
    ("bronx", "brx"),
];

/// Postings below this price are mostly scams or parking spots.
pub const DEFAULT_MIN_PRICE: i64 = 800;

/// Build the ordered (region, search URL) pairs for one category.
pub fn category_searches(category: Category, min_price: i64) -> Vec<(String, String)> {
    REGIONS
        .iter()
        .map(|(region, area)| {
            let url = format!(
                "{}/search/{}/{}?min_price={}",
                BASE_URL,
                area,
                category.search_section(),
                min_price
            );
            (region.to_string(), url)
        })
        .collect()
}
