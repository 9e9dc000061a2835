//! Paginated session history bridge
//!
//! Completed sessions come from the reservation REST API as immutable
//! pages; live sessions come from the feed. The two sets are time-disjoint
//! by construction (completion removes a session from the live set), so
//! merging for display is concatenation plus a defensive identity check.

use crate::api::types::SessionRecord;
use crate::error::{ArgusError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Query parameters for a history page fetch.
///
/// Pages are 1-indexed throughout, matching the consuming UI; the bridge
/// passes the number through unmodified so chunking here and pagination on
/// the server never disagree about page boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Restrict to sessions owned by this user
    pub user_id: Option<i64>,

    /// Restrict by completion state
    pub is_completed: Option<bool>,

    /// Page number, 1-indexed
    pub page: u32,

    /// Rows per page
    pub size: u32,
}

impl HistoryQuery {
    /// Query the first page of completed sessions
    pub fn completed(page: u32, size: u32) -> Self {
        Self {
            user_id: None,
            is_completed: Some(true),
            page,
            size,
        }
    }

    /// Query every session of one user
    pub fn for_user(user_id: i64, page: u32, size: u32) -> Self {
        Self {
            user_id: Some(user_id),
            is_completed: None,
            page,
            size,
        }
    }

    /// Check pagination parameters
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(ArgusError::validation("page", "pages are 1-indexed"));
        }
        if self.size == 0 {
            return Err(ArgusError::validation("size", "page size must be positive"));
        }
        Ok(())
    }
}

/// One page of results in the server's envelope.
///
/// Totals are reported unmodified from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
    pub number_of_elements: u32,
    pub first: bool,
    pub last: bool,
}

/// A fetched page of charging session history
pub type HistoryPage = Page<SessionRecord>;

/// Source of paginated session history.
///
/// Implemented by the REST client; test code substitutes fixtures.
#[async_trait]
pub trait SessionHistory: Send + Sync {
    /// Fetch one page matching the query
    async fn fetch_page(&self, query: &HistoryQuery) -> Result<HistoryPage>;
}

/// Merge live rows with a completed-history page for one display list.
///
/// Live rows come first. A completed row whose id is currently live is
/// skipped so a completion racing a stale page fetch cannot double-count
/// the session.
pub fn merge_for_display(live: &[SessionRecord], page: &HistoryPage) -> Vec<SessionRecord> {
    let mut rows: Vec<SessionRecord> = live.to_vec();
    for record in &page.content {
        if live.iter().any(|l| l.id == record.id) {
            continue;
        }
        rows.push(record.clone());
    }
    rows
}
