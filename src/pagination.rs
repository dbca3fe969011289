/// Pagination helper
///
/// Turns an unbounded ordered collection into fixed-size pages of ten items.
/// Out-of-range page numbers clamp to the nearest valid page instead of
/// failing; a missing or non-numeric `page` value means page one. Purely a
/// view over the collection: callers pass the total row count and receive the
/// LIMIT/OFFSET window to fetch.
use serde::Serialize;

/// Fixed page size for every listing view.
pub const PAGE_SIZE: i64 = 10;

/// A resolved page window over a collection of `total_items` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl PageRequest {
    /// Resolve a raw `page` query value against the collection size.
    pub fn resolve(raw: Option<&str>, total_items: i64) -> Self {
        let total_pages = total_pages(total_items);
        let requested = match raw.map(str::trim) {
            None | Some("") => 1,
            Some(value) => match value.parse::<i64>() {
                Ok(n) => n,
                // All-digit input too large for i64 is past the end, not garbage.
                Err(_) if value.bytes().all(|b| b.is_ascii_digit()) => i64::MAX,
                Err(_) => 1,
            },
        };
        let number = requested.clamp(1, total_pages);
        Self {
            number,
            total_items,
            total_pages,
        }
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * PAGE_SIZE
    }

    /// Attach the fetched items to produce the page object handed to views.
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            has_next: self.number < self.total_pages,
            has_previous: self.number > 1,
            number: self.number,
            total_items: self.total_items,
            total_pages: self.total_pages,
            items,
        }
    }
}

/// A bounded page: the items plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// An empty collection still has exactly one (empty) page.
fn total_pages(total_items: i64) -> i64 {
    if total_items <= 0 {
        1
    } else {
        (total_items + PAGE_SIZE - 1) / PAGE_SIZE
    }
}
