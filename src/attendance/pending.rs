use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::AttendanceStatus;

/// Identifies one in-flight write: a person and the status being sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub person_id: String,
    pub status: AttendanceStatus,
}

impl ActionKey {
    pub fn new(person_id: impl Into<String>, status: AttendanceStatus) -> Self {
        Self {
            person_id: person_id.into(),
            status,
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.person_id, self.status)
    }
}

#[derive(Default)]
struct Slots {
    next_ticket: u64,
    held: HashMap<ActionKey, u64>,
}

/// In-flight action keys. Each acquired key is released by its guard.
#[derive(Clone, Default)]
pub struct PendingActions {
    slots: Arc<Mutex<Slots>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `None` while the same key is still held.
    pub fn try_acquire(&self, key: ActionKey) -> Option<PendingGuard> {
        let mut slots = self.slots();
        if slots.held.contains_key(&key) {
            return None;
        }
        slots.next_ticket += 1;
        let ticket = slots.next_ticket;
        slots.held.insert(key.clone(), ticket);
        Some(PendingGuard {
            slots: Arc::clone(&self.slots),
            key,
            ticket,
        })
    }

    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.slots().held.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots().held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every key. Guards still alive for dropped keys release nothing.
    pub fn reset(&self) {
        self.slots().held.clear();
    }
}

pub struct PendingGuard {
    slots: Arc<Mutex<Slots>>,
    key: ActionKey,
    ticket: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // A reset followed by a new acquire of the same key must survive this drop.
        if slots.held.get(&self.key) == Some(&self.ticket) {
            slots.held.remove(&self.key);
        }
    }
}
