//! Drains cursor-paginated remote listings into the local store.

use std::collections::HashSet;
use std::future::Future;

use crate::models::PagedContent;

/// Outcome of draining a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkSummary {
    /// Number of pages that were persisted.
    pub pages: usize,
    /// Number of records across all persisted pages.
    pub records: usize,
}

/// Persists `first` and every page reachable through its `next` links.
///
/// A page is only followed after its content was persisted successfully, so
/// an interrupted walk leaves every earlier page durable. The first error
/// from either closure stops the walk and is returned unchanged.
///
/// A `next` reference that was already followed during this walk is treated
/// as the end of the listing, so cycles of any length terminate.
pub async fn walk_pages<T, E, Persist, PersistFut, Fetch, FetchFut>(
    first: PagedContent<T>,
    mut persist: Persist,
    mut fetch_next: Fetch,
) -> Result<WalkSummary, E>
where
    Persist: FnMut(Vec<T>) -> PersistFut,
    PersistFut: Future<Output = Result<(), E>>,
    Fetch: FnMut(String) -> FetchFut,
    FetchFut: Future<Output = Result<PagedContent<T>, E>>,
{
    let mut summary = WalkSummary::default();
    let mut followed: HashSet<String> = HashSet::new();
    let mut page = first;

    loop {
        let PagedContent { content, next } = page;
        let records = content.len();

        persist(content).await?;
        summary.pages += 1;
        summary.records += records;

        let next = match next {
            Some(next) => next,
            None => break,
        };
        if followed.contains(&next) {
            tracing::warn!(next = %next, "Remote repeated an already followed next-page link, stopping");
            break;
        }

        tracing::debug!(page = summary.pages + 1, next = %next, "Fetching next page");
        page = fetch_next(next.clone()).await?;
        followed.insert(next);
    }

    Ok(summary)
}
