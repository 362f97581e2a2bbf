use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated remote listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedContent<T> {
    pub content: Vec<T>,
    /// Opaque reference to the following page, usually a URL.
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> PagedContent<T> {
    pub fn new(content: Vec<T>, next: Option<String>) -> Self {
        Self { content, next }
    }

    /// A page with no successor.
    pub fn last(content: Vec<T>) -> Self {
        Self {
            content,
            next: None,
        }
    }
}

impl<T> Default for PagedContent<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}

/// Offset based page descriptor for reading local records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// The `index`-th page (zero based) of pages holding `size` records each.
    pub fn nth(index: usize, size: usize) -> Self {
        Self {
            offset: index.saturating_mul(size),
            size,
        }
    }
}
