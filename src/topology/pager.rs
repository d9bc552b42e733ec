//! Continuation-token pagination cursor.
//!
//! # Responsibilities
//! - Drain a paged query to completion by chasing continuation tokens
//! - Stop on the first empty token
//! - Propagate the first error without partial silent success
//!
//! # Design Decisions
//! - The fetch function owns transport details; the cursor only loops
//! - An empty-string token is treated the same as an absent one (the REST
//!   API reports the last page as `"ContinuationToken": ""`)
//! - No page-count bound; callers enforce transport-level limits if needed

use std::future::Future;

/// One page of a paged query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub continuation_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation, i.e. the last one.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            continuation_token: None,
        }
    }

    /// A page followed by more results under `token`.
    pub fn with_token(items: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            items,
            continuation_token: Some(token.into()),
        }
    }
}

/// Repeatedly invoke `fetch` with the previous page's continuation token
/// (starting with none) and accumulate items until a page comes back with an
/// empty token.
pub async fn drain_pages<T, E, F, Fut>(mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);
        match page.continuation_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(items),
        }
    }
}
