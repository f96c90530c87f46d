//! In-process toast notification queue.
//!
//! The queue is split the same way as any reducer-driven UI store:
//! [`state`] holds the pure transition function, [`timeouts`] the per-id
//! deadlines, [`manager`] the task that owns both and the public
//! [`Toaster`] handle, and [`layout`] the projection the view layer renders.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::ToastConfig;
use crate::types::{Position, ToastId, Variant};

pub mod layout;
pub mod manager;
pub mod state;
pub mod timeouts;

pub use manager::{ToastHandle, Toaster};

/// Display fields passed through untouched to the view layer.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Button rendered next to a toast. `command` is interpreted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToastAction {
    pub label: String,
    pub command: String,
}

impl ToastAction {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// Options accepted by [`Toaster::notify`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub action: Option<ToastAction>,
    pub variant: Variant,
    pub duration: Option<Duration>,
    pub position: Option<Position>,
    pub extra: Extra,
}

impl ToastSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub const fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub const fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub const fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Partial display update merged into an existing toast.
///
/// Lifecycle fields (visibility, timing) are deliberately absent: an update
/// can never reopen a closing toast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub action: Option<ToastAction>,
    pub variant: Option<Variant>,
    pub position: Option<Position>,
    pub extra: Extra,
}

impl ToastUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub const fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    #[must_use]
    pub const fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    fn merge_into(self, toast: &mut Toast) {
        if let Some(title) = self.title {
            toast.title = Some(title);
        }
        if let Some(description) = self.description {
            toast.description = Some(description);
        }
        if let Some(action) = self.action {
            toast.action = Some(action);
        }
        if let Some(variant) = self.variant {
            toast.variant = variant;
        }
        if let Some(position) = self.position {
            toast.position = position;
        }
        toast.extra.extend(self.extra);
    }
}

/// A toast as held by the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub action: Option<ToastAction>,
    pub variant: Variant,
    pub position: Position,
    pub duration: Duration,
    /// `false` once dismissed; the toast is then waiting for removal.
    pub visible: bool,
    /// Shifted forward on resume so `now - created_at` only counts running
    /// time.
    pub created_at: Instant,
    pub paused_at: Option<Instant>,
    pub extra: Extra,
}

impl Toast {
    pub(crate) fn from_spec(id: ToastId, spec: ToastSpec, config: &ToastConfig, now: Instant) -> Self {
        Self {
            id,
            title: spec.title,
            description: spec.description,
            action: spec.action,
            variant: spec.variant,
            position: spec.position.unwrap_or_else(|| config.default_position()),
            duration: spec.duration.unwrap_or_else(|| config.default_duration()),
            visible: true,
            created_at: now,
            paused_at: None,
            extra: spec.extra,
        }
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Countdown time already consumed, frozen while paused.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.paused_at
            .unwrap_or(now)
            .saturating_duration_since(self.created_at)
    }

    /// Time left before auto-dismissal, zero once overdue.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration.saturating_sub(self.elapsed(now))
    }
}
