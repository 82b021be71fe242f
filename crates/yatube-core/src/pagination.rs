//! Fixed-size pagination over ordered post listings.
//!
//! Page numbers are 1-based. Requests that cannot be honoured are clamped
//! rather than rejected: a missing or non-numeric page falls back to the first
//! page, a number outside `1..=num_pages` falls back to the last one.

use serde::Serialize;

use crate::domain::PostDetails;
use crate::error::RepoError;
use crate::ports::{PostFilter, PostRepository};

/// Page size used by every post listing.
pub const POSTS_PER_PAGE: u64 = 10;

/// Splits a collection of `count` items into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    /// A zero page size is treated as one item per page.
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty collection still has one (empty) page.
    pub fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.per_page).max(1)
    }

    /// Resolve the raw `page` query parameter to a valid page number.
    pub fn resolve(&self, requested: Option<&str>, count: u64) -> u64 {
        let last = self.num_pages(count);
        match requested.map(|raw| raw.trim().parse::<i64>()) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && (n as u64) <= last => n as u64,
            Some(Ok(_)) => last,
        }
    }

    /// Offset and limit of a (valid) page.
    pub fn bounds(&self, number: u64) -> (u64, u64) {
        ((number.max(1) - 1) * self.per_page, self.per_page)
    }

    /// Page over an in-memory, already ordered collection.
    pub fn page_of<T: Clone>(&self, items: &[T], requested: Option<&str>) -> Page<T> {
        let count = items.len() as u64;
        let number = self.resolve(requested, count);
        let (offset, limit) = self.bounds(number);
        let slice = items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Page::new(slice, number, self.num_pages(count), count)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

/// One page of results plus the metadata templates need for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64, count: u64) -> Self {
        let has_next = number < num_pages;
        let has_previous = number > 1;
        Self {
            items,
            number,
            num_pages,
            count,
            has_next,
            has_previous,
            next_page_number: has_next.then(|| number + 1),
            previous_page_number: has_previous.then(|| number - 1),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fetch one page of a post listing.
pub async fn paginate_posts(
    posts: &dyn PostRepository,
    filter: PostFilter,
    paginator: &Paginator,
    requested: Option<&str>,
) -> Result<Page<PostDetails>, RepoError> {
    let count = posts.count(filter).await?;
    let number = paginator.resolve(requested, count);
    let (offset, limit) = paginator.bounds(number);
    let items = posts.list(filter, offset, limit).await?;
    Ok(Page::new(items, number, paginator.num_pages(count), count))
}
