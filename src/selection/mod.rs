// Shared selection of entity keys, kept in sync across the comparison charts

use log::{debug, warn};

use crate::errors::StatsError;
use crate::normalize::normalize_key;

/// Handle returned by [`SelectionStore::subscribe`], used to unsubscribe
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[String]) + Send>;

/// Ordered, bounded list of selected entity keys with change listeners.
///
/// Ids are stored normalized (trimmed, lower-cased) and never repeat. Every
/// mutation that changes the list calls each listener once with the complete
/// new list before returning; mutations that change nothing notify nobody.
pub struct SelectionStore {
    max: usize,
    selection: Vec<String>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl SelectionStore {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            selection: Vec::new(),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Current selection in insertion order
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn contains(&self, id: &str) -> bool {
        let key = normalize_key(id);
        self.selection.contains(&key)
    }

    /// Replace the whole selection.
    ///
    /// Returns `Ok(false)` without notifying when the new list equals the current
    /// one element by element. Lists longer than the cap are rejected and leave
    /// the selection unchanged.
    pub fn set_selection<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<bool, StatsError> {
        let mut next: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let key = normalize_key(id.as_ref());
            if !key.is_empty() && !next.contains(&key) {
                next.push(key);
            }
        }
        if next.len() > self.max {
            warn!(
                "Rejecting selection of {} entries, at most {} allowed",
                next.len(),
                self.max
            );
            return Err(StatsError::SelectionLimitExceeded { max: self.max });
        }
        if next == self.selection {
            return Ok(false);
        }
        self.selection = next;
        self.notify();
        Ok(true)
    }

    /// Append an id. Returns `Ok(false)` when it is already selected.
    pub fn add(&mut self, id: &str) -> Result<bool, StatsError> {
        let key = normalize_key(id);
        if key.is_empty() || self.selection.contains(&key) {
            return Ok(false);
        }
        if self.selection.len() >= self.max {
            warn!("Cannot select {}: maximum of {} reached", key, self.max);
            return Err(StatsError::SelectionLimitExceeded { max: self.max });
        }
        self.selection.push(key);
        self.notify();
        Ok(true)
    }

    /// Remove an id. Returns `false` when it was not selected.
    pub fn remove(&mut self, id: &str) -> bool {
        let key = normalize_key(id);
        match self.selection.iter().position(|s| *s == key) {
            Some(index) => {
                self.selection.remove(index);
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Remove the id when selected, add it otherwise
    pub fn toggle(&mut self, id: &str) -> Result<bool, StatsError> {
        if self.contains(id) {
            Ok(self.remove(id))
        } else {
            self.add(id)
        }
    }

    pub fn clear(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.selection.clear();
        self.notify();
        true
    }

    /// Register a listener called with the full selection after every change
    pub fn subscribe(&mut self, listener: impl FnMut(&[String]) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        debug!(
            "Selection changed to {:?}, notifying {} listeners",
            self.selection,
            self.listeners.len()
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.selection);
        }
    }
}
