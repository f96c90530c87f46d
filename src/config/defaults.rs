use std::time::Duration;

use crate::types::Position;

pub(super) const fn default_limit() -> usize {
    5
}

pub(super) const fn default_duration() -> Duration {
    Duration::from_secs(3)
}

pub(super) const fn default_position() -> Position {
    Position::TopCenter
}

pub(super) const fn default_exit_delay() -> Duration {
    Duration::from_millis(300)
}
