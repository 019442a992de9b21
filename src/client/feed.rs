//! Accumulated page state shared by the load-more lists: post feeds,
//! search results and notifications.

use std::future::Future;

/// Results gathered so far for one filtered list, plus the bookkeeping the
/// next page request needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedSet<T> {
    pub results: Vec<T>,
    /// Server-reported total at the last count query.
    pub total_docs: i64,
    /// Last fetched page number.
    pub page: i64,
    /// Items removed client-side since the count was fetched; the next
    /// page's skip is corrected by this amount.
    pub deleted_doc_count: i64,
}

impl<T> PaginatedSet<T> {
    /// Whether the server still holds items beyond what is accumulated.
    pub fn has_more(&self) -> bool {
        self.total_docs > self.results.len() as i64
    }

    /// Drops one accumulated item and records the deletion so later page
    /// requests can correct their skip offset.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.results.len() {
            return None;
        }
        let item = self.results.remove(index);
        self.total_docs -= 1;
        self.deleted_doc_count += 1;
        Some(item)
    }
}

/// Folds a freshly fetched page into the accumulated state.
///
/// Pages come from strictly increasing skip offsets, so appending without
/// id-level de-duplication is sound. The total is always refreshed through
/// `fetch_count` (queried with the same filter as the page itself) rather
/// than derived from page sizes: concurrent deletions can shrink the true
/// total between requests.
pub async fn merge_page<T, E, F, Fut>(
    state: Option<PaginatedSet<T>>,
    data: Vec<T>,
    page: i64,
    fetch_count: F,
    replace: bool,
) -> Result<PaginatedSet<T>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<i64, E>>,
{
    let total_docs = fetch_count().await?;

    Ok(match state {
        Some(mut prev) if !replace => {
            prev.results.extend(data);
            prev.page = page;
            prev.total_docs = total_docs;
            prev
        }
        _ => PaginatedSet {
            results: data,
            total_docs,
            page,
            deleted_doc_count: 0,
        },
    })
}

/// Skip offset for the given page, corrected for client-side deletions.
///
/// Deleting accumulated items shifts the server-side ordinals of everything
/// not yet fetched; without the correction the next page would silently
/// drop that many items.
pub fn next_skip(page: i64, limit: i64, deleted_doc_count: i64) -> i64 {
    ((page - 1) * limit - deleted_doc_count).max(0)
}
