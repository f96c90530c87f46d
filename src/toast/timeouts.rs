use std::collections::HashMap;

use tokio::time::Instant;

use crate::types::ToastId;

/// What a fired deadline asks the manager to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The toast's display time ran out.
    Dismiss(ToastId),
    /// The exit transition is over, drop the toast.
    Remove(ToastId),
}

/// Deadlines keyed by toast id.
///
/// A toast owns at most one auto-dismiss deadline and at most one removal
/// deadline. Cancelling only deletes the entry, so a cancelled deadline can
/// never be reported by [`TimeoutService::take_expired`].
#[derive(Debug, Default)]
pub struct TimeoutService {
    dismiss: HashMap<ToastId, Instant>,
    removal: HashMap<ToastId, Instant>,
}

impl TimeoutService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an earlier deadline for the same toast was replaced.
    pub fn schedule_dismiss(&mut self, id: ToastId, at: Instant) -> bool {
        self.dismiss.insert(id, at).is_some()
    }

    pub fn cancel_dismiss(&mut self, id: &ToastId) -> bool {
        self.dismiss.remove(id).is_some()
    }

    /// Keeps an already pending removal so repeated dismissals do not push it
    /// back.
    pub fn schedule_removal(&mut self, id: ToastId, at: Instant) {
        self.removal.entry(id).or_insert(at);
    }

    #[must_use]
    pub fn dismiss_deadline(&self, id: &ToastId) -> Option<Instant> {
        self.dismiss.get(id).copied()
    }

    #[must_use]
    pub fn removal_deadline(&self, id: &ToastId) -> Option<Instant> {
        self.removal.get(id).copied()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.dismiss.values().chain(self.removal.values()).min().copied()
    }

    /// Drains every deadline at or before `now`, earliest first. On a tie the
    /// dismissal is reported before the removal.
    pub fn take_expired(&mut self, now: Instant) -> Vec<Expiry> {
        let mut due: Vec<(Instant, Expiry)> = Vec::new();
        self.dismiss.retain(|id, at| {
            let keep = *at > now;
            if !keep {
                due.push((*at, Expiry::Dismiss(*id)));
            }
            keep
        });
        self.removal.retain(|id, at| {
            let keep = *at > now;
            if !keep {
                due.push((*at, Expiry::Remove(*id)));
            }
            keep
        });
        due.sort_by_key(|(at, expiry)| (*at, matches!(expiry, Expiry::Remove(_))));
        due.into_iter().map(|(_, expiry)| expiry).collect()
    }

    /// Drops deadlines of toasts that are no longer queued.
    pub fn retain(&mut self, mut keep: impl FnMut(&ToastId) -> bool) {
        self.dismiss.retain(|id, _| keep(id));
        self.removal.retain(|id, _| keep(id));
    }

    /// Cancels everything, returning how many deadlines were pending.
    pub fn clear(&mut self) -> usize {
        let pending = self.len();
        self.dismiss.clear();
        self.removal.clear();
        pending
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dismiss.len() + self.removal.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dismiss.is_empty() && self.removal.is_empty()
    }
}
