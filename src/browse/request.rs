//! Browse request bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cursor::PageToken;
use crate::envelope::SortSpec;
use crate::query::{RawFilter, TableRef};

fn default_true() -> bool {
    true
}

/// Stateless page fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPageRequest {
    pub keyspace: String,
    pub table: String,
    #[serde(default)]
    pub filter: Option<RawFilter>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    /// Falls back to the configured default page size
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Continuation from a previous envelope's `next_token`
    #[serde(default)]
    pub page_token: Option<PageToken>,
    /// Explicit full-scan opt-in
    #[serde(default)]
    pub allow_filtering: bool,
    #[serde(default = "default_true")]
    pub include_count: bool,
}

impl FetchPageRequest {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
            filter: None,
            sort: None,
            page_size: None,
            page_token: None,
            allow_filtering: false,
            include_count: true,
        }
    }

    pub fn with_filter(mut self, filter: RawFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_page_token(mut self, token: PageToken) -> Self {
        self.page_token = Some(token);
        self
    }

    pub fn without_count(mut self) -> Self {
        self.include_count = false;
        self
    }

    pub fn target(&self) -> TableRef {
        TableRef::new(&self.keyspace, &self.table)
    }
}

/// Count request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRequest {
    pub keyspace: String,
    pub table: String,
    #[serde(default)]
    pub filter: Option<RawFilter>,
}

impl CountRequest {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: RawFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn target(&self) -> TableRef {
        TableRef::new(&self.keyspace, &self.table)
    }
}

/// Cursor movement within a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
    /// Reset and fetch the first page
    First,
    /// Fetch the page after the current one
    Next,
    /// Replay the page before the current one
    Previous,
    /// Re-fetch the current page
    #[default]
    Current,
}

/// Session navigation. The view fields select what is browsed; changing any
/// of them restarts the session at the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigateRequest {
    #[serde(default)]
    pub action: NavAction,
    pub keyspace: String,
    pub table: String,
    #[serde(default)]
    pub filter: Option<RawFilter>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub allow_filtering: bool,
    #[serde(default = "default_true")]
    pub include_count: bool,
}

impl NavigateRequest {
    pub fn new(action: NavAction, keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            action,
            keyspace: keyspace.into(),
            table: table.into(),
            filter: None,
            sort: None,
            page_size: None,
            allow_filtering: false,
            include_count: true,
        }
    }

    pub fn with_filter(mut self, filter: RawFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn without_count(mut self) -> Self {
        self.include_count = false;
        self
    }

    /// Same request with another action
    pub fn action(mut self, action: NavAction) -> Self {
        self.action = action;
        self
    }

    pub fn target(&self) -> TableRef {
        TableRef::new(&self.keyspace, &self.table)
    }
}

/// Ad-hoc statement from the query box, forwarded verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub statement: String,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub page_token: Option<PageToken>,
}

/// Response to session creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}
