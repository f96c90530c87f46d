//! Pure queue transitions. Nothing here touches timers or the clock; every
//! timestamp arrives inside the [`Action`].

use tokio::time::Instant;

use super::{Toast, ToastUpdate};
use crate::types::ToastId;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert at the head, truncating the tail past the limit.
    Add(Box<Toast>),
    Update { id: ToastId, update: ToastUpdate },
    /// `None` closes every toast.
    Dismiss { id: Option<ToastId> },
    Remove { id: ToastId },
    Pause { id: ToastId, at: Instant },
    Resume { id: ToastId, at: Instant },
}

/// Toasts ordered newest first, never longer than `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastState {
    toasts: Vec<Toast>,
    limit: usize,
}

impl ToastState {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            toasts: Vec::with_capacity(limit + 1),
            limit,
        }
    }

    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    #[must_use]
    pub fn get(&self, id: &ToastId) -> Option<&Toast> {
        self.toasts.iter().find(|toast| toast.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ToastId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Applies one transition in place. Unknown ids leave the state as is.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Add(toast) => {
                // Ids are unique; re-adding an existing id replaces it.
                self.toasts.retain(|existing| existing.id != toast.id);
                self.toasts.insert(0, *toast);
                self.toasts.truncate(self.limit);
            }
            Action::Update { id, update } => {
                if let Some(toast) = self.get_mut(&id) {
                    update.merge_into(toast);
                }
            }
            Action::Dismiss { id: Some(id) } => {
                if let Some(toast) = self.get_mut(&id) {
                    toast.visible = false;
                }
            }
            Action::Dismiss { id: None } => {
                for toast in &mut self.toasts {
                    toast.visible = false;
                }
            }
            Action::Remove { id } => {
                self.toasts.retain(|toast| toast.id != id);
            }
            Action::Pause { id, at } => {
                if let Some(toast) = self.get_mut(&id) {
                    if toast.visible && toast.paused_at.is_none() {
                        toast.paused_at = Some(at.max(toast.created_at));
                    }
                }
            }
            Action::Resume { id, at } => {
                if let Some(toast) = self.get_mut(&id) {
                    if !toast.visible {
                        return;
                    }
                    if let Some(paused_at) = toast.paused_at.take() {
                        let elapsed = paused_at.saturating_duration_since(toast.created_at);
                        toast.created_at = at.checked_sub(elapsed).unwrap_or(at);
                    }
                }
            }
        }
    }

    fn get_mut(&mut self, id: &ToastId) -> Option<&mut Toast> {
        self.toasts.iter_mut().find(|toast| toast.id == *id)
    }
}

/// `(state, action) -> state`.
#[must_use]
pub fn reduce(mut state: ToastState, action: Action) -> ToastState {
    state.apply(action);
    state
}

#[cfg(test)]
mod tests {
    use super::{Action, ToastState, reduce};
    use crate::config::ToastConfig;
    use crate::toast::{Toast, ToastSpec, ToastUpdate};
    use crate::types::{ToastId, Variant};
    use std::time::Duration;
    use tokio::time::Instant;

    fn toast(now: Instant) -> Toast {
        Toast::from_spec(
            ToastId::generate(),
            ToastSpec::new().duration(Duration::from_millis(1000)),
            &ToastConfig::default(),
            now,
        )
    }

    fn add(state: ToastState, toast: &Toast) -> ToastState {
        reduce(state, Action::Add(Box::new(toast.clone())))
    }

    fn ids(state: &ToastState) -> Vec<ToastId> {
        state.toasts().iter().map(|t| t.id).collect()
    }

    #[test]
    fn newest_toast_is_at_the_head() {
        let now = Instant::now();
        let (a, b) = (toast(now), toast(now));
        let state = add(add(ToastState::new(5), &a), &b);
        assert_eq!(ids(&state), vec![b.id, a.id]);
    }

    #[test]
    fn truncation_drops_the_oldest() {
        let now = Instant::now();
        let all: Vec<Toast> = (0..4).map(|_| toast(now)).collect();
        let state = all.iter().fold(ToastState::new(3), add);
        assert_eq!(ids(&state), vec![all[3].id, all[2].id, all[1].id]);
    }

    #[test]
    fn never_exceeds_the_limit() {
        let now = Instant::now();
        let mut state = ToastState::new(2);
        for _ in 0..10 {
            state = add(state, &toast(now));
            assert!(state.len() <= state.limit());
        }
    }

    #[test]
    fn zero_limit_is_clamped_to_one() {
        assert_eq!(ToastState::new(0).limit(), 1);
    }

    #[test]
    fn readding_an_id_keeps_ids_unique() {
        let now = Instant::now();
        let a = toast(now);
        let state = add(add(ToastState::new(5), &a), &a);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn dismiss_closes_only_the_target() {
        let now = Instant::now();
        let (a, b) = (toast(now), toast(now));
        let state = add(add(ToastState::new(5), &a), &b);
        let state = reduce(state, Action::Dismiss { id: Some(a.id) });
        assert_eq!(state.get(&a.id).map(|t| t.visible), Some(false));
        assert_eq!(state.get(&b.id).map(|t| t.visible), Some(true));
    }

    #[test]
    fn dismiss_is_idempotent_and_ignores_unknown_ids() {
        let now = Instant::now();
        let a = toast(now);
        let state = add(ToastState::new(5), &a);
        let once = reduce(state, Action::Dismiss { id: Some(a.id) });
        let twice = reduce(once.clone(), Action::Dismiss { id: Some(a.id) });
        assert_eq!(once, twice);

        let untouched = reduce(
            twice.clone(),
            Action::Dismiss {
                id: Some(ToastId::generate()),
            },
        );
        assert_eq!(untouched, twice);
    }

    #[test]
    fn bulk_dismiss_closes_everything() {
        let now = Instant::now();
        let state = (0..3)
            .map(|_| toast(now))
            .fold(ToastState::new(5), |state, t| add(state, &t));
        let state = reduce(state, Action::Dismiss { id: None });
        assert!(state.toasts().iter().all(|t| !t.visible));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn remove_deletes_by_id() {
        let now = Instant::now();
        let (a, b) = (toast(now), toast(now));
        let state = add(add(ToastState::new(5), &a), &b);
        let state = reduce(state, Action::Remove { id: a.id });
        assert_eq!(ids(&state), vec![b.id]);
    }

    #[test]
    fn update_is_a_noop_for_missing_ids() {
        let now = Instant::now();
        let a = toast(now);
        let state = add(ToastState::new(5), &a);
        let same = reduce(
            state.clone(),
            Action::Update {
                id: ToastId::generate(),
                update: ToastUpdate::new().title("ghost"),
            },
        );
        assert_eq!(same, state);

        let updated = reduce(
            state,
            Action::Update {
                id: a.id,
                update: ToastUpdate::new().variant(Variant::Warning),
            },
        );
        assert_eq!(updated.get(&a.id).map(|t| t.variant), Some(Variant::Warning));
    }

    #[test]
    fn pause_keeps_the_first_timestamp() {
        let start = Instant::now();
        let a = toast(start);
        let state = add(ToastState::new(5), &a);
        let first = start + Duration::from_millis(400);
        let state = reduce(state, Action::Pause { id: a.id, at: first });
        let state = reduce(
            state,
            Action::Pause {
                id: a.id,
                at: start + Duration::from_millis(800),
            },
        );
        assert_eq!(state.get(&a.id).and_then(|t| t.paused_at), Some(first));
    }

    #[test]
    fn resume_shifts_created_at_by_the_pause() {
        let start = Instant::now();
        let a = toast(start);
        let state = add(ToastState::new(5), &a);
        let state = reduce(
            state,
            Action::Pause {
                id: a.id,
                at: start + Duration::from_millis(400),
            },
        );
        let resumed_at = start + Duration::from_millis(1000);
        let state = reduce(
            state,
            Action::Resume {
                id: a.id,
                at: resumed_at,
            },
        );

        let resumed = match state.get(&a.id) {
            Some(toast) => toast,
            None => panic!("toast disappeared on resume"),
        };
        assert!(resumed.paused_at.is_none());
        assert_eq!(resumed.created_at, start + Duration::from_millis(600));
        assert_eq!(resumed.remaining(resumed_at), Duration::from_millis(600));
    }

    #[test]
    fn resume_without_pause_changes_nothing() {
        let start = Instant::now();
        let a = toast(start);
        let state = add(ToastState::new(5), &a);
        let same = reduce(
            state.clone(),
            Action::Resume {
                id: a.id,
                at: start + Duration::from_millis(50),
            },
        );
        assert_eq!(same, state);
    }

    #[test]
    fn closed_toasts_cannot_be_paused() {
        let start = Instant::now();
        let a = toast(start);
        let state = add(ToastState::new(5), &a);
        let state = reduce(state, Action::Dismiss { id: Some(a.id) });
        let state = reduce(
            state,
            Action::Pause {
                id: a.id,
                at: start + Duration::from_millis(10),
            },
        );
        let closed = state.get(&a.id);
        assert_eq!(closed.map(|t| t.visible), Some(false));
        assert_eq!(closed.map(Toast::is_paused), Some(false));
    }

    #[test]
    fn pause_never_predates_creation() {
        let now = Instant::now();
        let created = now + Duration::from_secs(1);
        let t = toast(created);
        let state = reduce(
            add(ToastState::new(5), &t),
            Action::Pause { id: t.id, at: now },
        );
        let paused = state.get(&t.id).and_then(|toast| toast.paused_at);
        assert_eq!(paused, Some(created));
        assert_eq!(
            state.get(&t.id).map(|toast| toast.remaining(created)),
            Some(Duration::from_millis(1000))
        );
    }
}
