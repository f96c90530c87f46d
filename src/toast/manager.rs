use std::future::pending;
use std::time::Duration;

use async_channel::{Receiver, Sender, unbounded};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use super::state::{Action, ToastState};
use super::timeouts::{Expiry, TimeoutService};
use super::{Toast, ToastSpec, ToastUpdate};
use crate::Result;
use crate::config::ToastConfig;
use crate::error::UsageError;
use crate::types::ToastId;

enum Command {
    Notify { id: ToastId, spec: ToastSpec },
    Update { id: ToastId, update: ToastUpdate },
    Dismiss { id: Option<ToastId> },
    Pause { id: ToastId },
    Resume { id: ToastId },
    Snapshot(oneshot::Sender<Vec<Toast>>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle to a running toast manager.
///
/// Every operation is queued to the manager task in call order and returns
/// without waiting. Operations on toasts that no longer exist are ignored;
/// only a stopped manager is reported as an error.
#[derive(Debug, Clone)]
pub struct Toaster {
    tx: Sender<Command>,
    feed: watch::Receiver<Vec<Toast>>,
    config: ToastConfig,
}

impl Toaster {
    /// Starts the manager task on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::NoRuntime`] when called outside a runtime.
    pub fn spawn(config: ToastConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| UsageError::NoRuntime)?;
        let (tx, rx) = unbounded();
        let (feed_tx, feed) = watch::channel(Vec::new());

        info!(
            limit = config.limit(),
            default_duration_ms = millis(config.default_duration()),
            default_position = %config.default_position(),
            "toast manager started"
        );
        let manager = ToastManager::new(config.clone(), feed_tx);
        runtime.spawn(manager.run(rx));

        Ok(Self { tx, feed, config })
    }

    /// Queues a new toast and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn notify(&self, spec: ToastSpec) -> Result<ToastHandle> {
        let id = ToastId::generate();
        self.send(Command::Notify { id, spec })?;
        Ok(ToastHandle {
            id,
            toaster: self.clone(),
        })
    }

    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn update(&self, id: ToastId, update: ToastUpdate) -> Result<()> {
        self.send(Command::Update { id, update })
    }

    /// Closes one toast; it is removed after the exit delay.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn dismiss(&self, id: ToastId) -> Result<()> {
        self.send(Command::Dismiss { id: Some(id) })
    }

    /// Closes every toast currently queued.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn dismiss_all(&self) -> Result<()> {
        self.send(Command::Dismiss { id: None })
    }

    /// Freezes the auto-dismiss countdown, typically while hovered.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn pause(&self, id: ToastId) -> Result<()> {
        self.send(Command::Pause { id })
    }

    /// Restarts a paused countdown with whatever time was left.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn resume(&self, id: ToastId) -> Result<()> {
        self.send(Command::Resume { id })
    }

    /// Current toasts, newest first, after every operation queued so far.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub async fn toasts(&self) -> Result<Vec<Toast>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        rx.await.map_err(|_| UsageError::Stopped.into())
    }

    /// Render feed, republished after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.feed.clone()
    }

    #[must_use]
    pub const fn config(&self) -> &ToastConfig {
        &self.config
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Cancels all pending timers and stops the manager. Stopping twice is
    /// fine.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.send(Command::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .try_send(command)
            .map_err(|_| UsageError::Stopped.into())
    }
}

/// Returned by [`Toaster::notify`] to act on that one toast later.
#[derive(Debug, Clone)]
pub struct ToastHandle {
    id: ToastId,
    toaster: Toaster,
}

impl ToastHandle {
    #[must_use]
    pub const fn id(&self) -> ToastId {
        self.id
    }

    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn dismiss(&self) -> Result<()> {
        self.toaster.dismiss(self.id)
    }

    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn update(&self, update: ToastUpdate) -> Result<()> {
        self.toaster.update(self.id, update)
    }

    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn pause(&self) -> Result<()> {
        self.toaster.pause(self.id)
    }

    /// # Errors
    ///
    /// Returns [`UsageError::Stopped`] once the manager has shut down.
    pub fn resume(&self) -> Result<()> {
        self.toaster.resume(self.id)
    }
}

struct ToastManager {
    config: ToastConfig,
    state: ToastState,
    timers: TimeoutService,
    feed: watch::Sender<Vec<Toast>>,
}

impl ToastManager {
    fn new(config: ToastConfig, feed: watch::Sender<Vec<Toast>>) -> Self {
        Self {
            state: ToastState::new(config.limit()),
            timers: TimeoutService::new(),
            config,
            feed,
        }
    }

    async fn run(mut self, rx: Receiver<Command>) {
        let queue = CommandQueue(rx);
        loop {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                biased;
                command = queue.0.recv() => match command {
                    Ok(Command::Shutdown(ack)) => {
                        let _ = ack.send(());
                        break;
                    }
                    Ok(command) => {
                        // Timers that are already due go first.
                        let now = Instant::now();
                        self.expire(now);
                        self.handle(command, now);
                    }
                    Err(_) => break,
                },
                () = wait_until(deadline) => self.expire(Instant::now()),
            }
        }

        drop(queue);
        let cancelled = self.timers.clear();
        info!(cancelled, remaining = self.state.len(), "toast manager stopped");
    }

    fn handle(&mut self, command: Command, now: Instant) {
        match command {
            Command::Notify { id, spec } => self.notify(id, spec, now),
            Command::Update { id, update } => {
                if !self.state.contains(&id) {
                    debug!(toast_id = %id, "update for unknown toast ignored");
                    return;
                }
                self.state.apply(Action::Update { id, update });
            }
            Command::Dismiss { id: Some(id) } => self.dismiss(id, now),
            Command::Dismiss { id: None } => self.dismiss_all(now),
            Command::Pause { id } => self.pause(id, now),
            Command::Resume { id } => self.resume(id, now),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.state.toasts().to_vec());
                return;
            }
            Command::Shutdown(_) => return,
        }
        self.publish();
    }

    fn notify(&mut self, id: ToastId, spec: ToastSpec, now: Instant) {
        let toast = Toast::from_spec(id, spec, &self.config, now);
        debug!(
            toast_id = %id,
            position = %toast.position,
            variant = %toast.variant,
            duration_ms = millis(toast.duration),
            "toast added"
        );
        if let Some(at) = now.checked_add(toast.duration) {
            self.timers.schedule_dismiss(id, at);
        }
        self.state.apply(Action::Add(Box::new(toast)));

        let before = self.timers.len();
        let state = &self.state;
        self.timers.retain(|id| state.contains(id));
        let dropped = before - self.timers.len();
        if dropped > 0 {
            debug!(dropped, limit = self.state.limit(), "queue full, oldest toasts dropped");
        }
    }

    fn dismiss(&mut self, id: ToastId, now: Instant) {
        self.timers.cancel_dismiss(&id);
        match self.state.get(&id) {
            Some(toast) if toast.visible => {
                self.state.apply(Action::Dismiss { id: Some(id) });
                if let Some(at) = now.checked_add(self.config.exit_delay()) {
                    self.timers.schedule_removal(id, at);
                }
                debug!(toast_id = %id, "toast dismissed");
            }
            Some(_) => debug!(toast_id = %id, "toast already dismissed"),
            None => debug!(toast_id = %id, "dismiss for unknown toast ignored"),
        }
    }

    /// Every toast closed here leaves at the same instant.
    fn dismiss_all(&mut self, now: Instant) {
        let remove_at = now.checked_add(self.config.exit_delay());
        let open: Vec<ToastId> = self
            .state
            .toasts()
            .iter()
            .filter(|toast| toast.visible)
            .map(|toast| toast.id)
            .collect();
        for id in &open {
            self.timers.cancel_dismiss(id);
            if let Some(at) = remove_at {
                self.timers.schedule_removal(*id, at);
            }
        }
        self.state.apply(Action::Dismiss { id: None });
        debug!(count = open.len(), "all toasts dismissed");
    }

    fn pause(&mut self, id: ToastId, now: Instant) {
        self.timers.cancel_dismiss(&id);
        self.state.apply(Action::Pause { id, at: now });
        debug!(toast_id = %id, "toast paused");
    }

    fn resume(&mut self, id: ToastId, now: Instant) {
        let paused = self
            .state
            .get(&id)
            .is_some_and(|toast| toast.visible && toast.is_paused());
        if !paused {
            debug!(toast_id = %id, "resume for toast that is not paused ignored");
            return;
        }

        self.state.apply(Action::Resume { id, at: now });
        if let Some(toast) = self.state.get(&id) {
            let remaining = toast.remaining(now);
            if let Some(at) = now.checked_add(remaining) {
                self.timers.schedule_dismiss(id, at);
            }
            debug!(toast_id = %id, remaining_ms = millis(remaining), "toast resumed");
        }
    }

    fn expire(&mut self, now: Instant) {
        let expired = self.timers.take_expired(now);
        if expired.is_empty() {
            return;
        }
        for expiry in expired {
            match expiry {
                Expiry::Dismiss(id) => {
                    debug!(toast_id = %id, "toast timed out");
                    self.dismiss(id, now);
                }
                Expiry::Remove(id) => {
                    self.state.apply(Action::Remove { id });
                    debug!(toast_id = %id, "toast removed");
                }
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.feed.send_replace(self.state.toasts().to_vec());
    }
}

/// Closes and drains the command channel when the manager stops, even by
/// panic, so pending replies fail with [`UsageError::Stopped`] instead of
/// hanging.
struct CommandQueue(Receiver<Command>);

impl Drop for CommandQueue {
    fn drop(&mut self) {
        self.0.close();
        while self.0.try_recv().is_ok() {}
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
