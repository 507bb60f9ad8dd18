//! Paging contract for server-side listings.

use serde::{Deserialize, Serialize};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Position and size of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items the server should return.
    pub max_items: u32,
    /// Number of items to skip from the start of the listing.
    pub skip_count: u64,
}

impl PageRequest {
    pub fn new(max_items: u32, skip_count: u64) -> Self {
        Self {
            max_items,
            skip_count,
        }
    }

    /// Returns the request for the page following one with `received` items.
    #[must_use]
    pub fn next(&self, received: usize) -> Self {
        Self {
            max_items: self.max_items,
            skip_count: self.skip_count + received as u64,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}

/// One page of a listing.
///
/// `num_items` is the server's estimate of the full listing size; it may be
/// absent and is not exact when other clients mutate the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more_items: bool,
    pub num_items: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_more_items: bool, num_items: Option<u64>) -> Self {
        Self {
            items,
            has_more_items,
            num_items,
        }
    }

    /// Applies `f` to every item.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more_items: self.has_more_items,
            num_items: self.num_items,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new(), false, Some(0))
    }
}
