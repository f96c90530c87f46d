//! Grouping of the queue into on-screen stacks. Read-only: nothing here
//! feeds back into the queue.

use serde::Serialize;
use tokio::time::Instant;

use super::manager::millis;
use super::{Extra, Toast, ToastAction};
use crate::types::{Position, ToastId, Variant};

/// Render-ready copy of a toast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToastView {
    pub id: ToastId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ToastAction>,
    pub variant: Variant,
    pub state: ViewState,
    pub paused: bool,
    pub duration_ms: u64,
    pub remaining_ms: u64,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: Extra,
}

/// Mirrors the open/closed styling hook of the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    Open,
    Closed,
}

impl ToastView {
    #[must_use]
    pub fn new(toast: &Toast, now: Instant) -> Self {
        Self {
            id: toast.id,
            title: toast.title.clone(),
            description: toast.description.clone(),
            action: toast.action.clone(),
            variant: toast.variant,
            state: if toast.visible {
                ViewState::Open
            } else {
                ViewState::Closed
            },
            paused: toast.is_paused(),
            duration_ms: millis(toast.duration),
            remaining_ms: millis(toast.remaining(now)),
            extra: toast.extra.clone(),
        }
    }
}

/// Toasts sharing one screen anchor, listed top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stack {
    pub position: Position,
    pub toasts: Vec<ToastView>,
}

/// Splits a newest-first queue into per-position stacks.
///
/// Top anchors list newest first so the newest sits against the top edge;
/// bottom anchors list oldest first so the newest sits against the bottom
/// edge. Stacks follow [`Position::ALL`] order and empty ones are omitted.
#[must_use]
pub fn stacks(toasts: &[Toast], now: Instant) -> Vec<Stack> {
    Position::ALL
        .into_iter()
        .filter_map(|position| {
            let mut views: Vec<ToastView> = toasts
                .iter()
                .filter(|toast| toast.position == position)
                .map(|toast| ToastView::new(toast, now))
                .collect();
            if views.is_empty() {
                return None;
            }
            if !position.is_top() {
                views.reverse();
            }
            Some(Stack {
                position,
                toasts: views,
            })
        })
        .collect()
}
