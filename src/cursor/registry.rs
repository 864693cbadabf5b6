//! Per-session cursor registry
//!
//! Each browsing session owns one [`CursorSession`]. Navigation takes an
//! exclusive lease on it without waiting: a second navigation arriving while
//! the first is still in flight is rejected instead of queued, so two
//! interleaved transitions can never corrupt the history.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::query::{FilterSpec, TableRef};

use super::errors::{CursorError, CursorResult};
use super::history::CursorHistory;
use super::token::PageToken;

/// Everything that shapes the underlying query.
///
/// A change in any field invalidates the cursor. Sorting is not part of the
/// view because it never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewKey {
    pub target: TableRef,
    pub filter: Option<FilterSpec>,
    pub page_size: u32,
    pub allow_filtering: bool,
}

/// Cursor state of one session
#[derive(Debug)]
pub struct CursorSession {
    view: Option<ViewKey>,
    history: CursorHistory,
    next_token: Option<PageToken>,
    last_used: Instant,
}

impl CursorSession {
    fn new() -> Self {
        Self {
            view: None,
            history: CursorHistory::new(),
            next_token: None,
            last_used: Instant::now(),
        }
    }

    /// Working copy of the history for `view`; a fresh one if the view changed.
    pub fn history_for(&self, view: &ViewKey) -> CursorHistory {
        if self.view.as_ref() == Some(view) {
            self.history.clone()
        } else {
            CursorHistory::new()
        }
    }

    /// Continuation of the page last shown for `view`
    pub fn next_token_for(&self, view: &ViewKey) -> Option<PageToken> {
        if self.view.as_ref() == Some(view) {
            self.next_token.clone()
        } else {
            None
        }
    }

    /// Whether `view` differs from the one the history belongs to
    pub fn is_new_view(&self, view: &ViewKey) -> bool {
        self.view.as_ref() != Some(view)
    }

    /// Install the outcome of a successful fetch
    pub fn commit(&mut self, view: ViewKey, history: CursorHistory, next_token: Option<PageToken>) {
        self.view = Some(view);
        self.history = history;
        self.next_token = next_token;
        self.last_used = Instant::now();
    }

    pub fn history(&self) -> &CursorHistory {
        &self.history
    }
}

/// Exclusive access to one session's cursor
pub type CursorLease = OwnedMutexGuard<CursorSession>;

/// All live sessions
pub struct CursorRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<CursorSession>>>>,
    idle_timeout: Duration,
}

impl CursorRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Register a new session and return its id
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.write()
            .insert(id.clone(), Arc::new(Mutex::new(CursorSession::new())));
        id
    }

    /// Take the session's cursor.
    ///
    /// Fails with `UnknownSession` for ids not held (never created, closed,
    /// or evicted) and with `ConcurrentCursorMutation` if another lease is held.
    pub fn lease(&self, session_id: &str) -> CursorResult<CursorLease> {
        self.evict_idle();

        let slot = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session_id)
            .cloned()
            .ok_or_else(|| CursorError::UnknownSession(session_id.to_string()))?;

        let mut lease = slot
            .try_lock_owned()
            .map_err(|_| CursorError::ConcurrentCursorMutation(session_id.to_string()))?;
        lease.last_used = Instant::now();
        Ok(lease)
    }

    /// Drop a session; returns whether it existed
    pub fn remove(&self, session_id: &str) -> bool {
        self.write().remove(session_id).is_some()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle longer than the timeout. Leased sessions stay.
    pub fn evict_idle(&self) -> usize {
        let idle_timeout = self.idle_timeout;
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(session) => session.last_used.elapsed() < idle_timeout,
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle cursor sessions");
        }
        evicted
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Mutex<CursorSession>>>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CursorRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }
}
