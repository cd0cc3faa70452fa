// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The idle debouncer (§4.D): at most one armed timer per child, firing a
//! "stable idle" callback into the supervisor after a period of continuous
//! idleness.
//!
//! Grounded on the teacher's timer-map pattern in
//! `oj-engine::runtime::handlers::timer`, but with only one timer kind there
//! is no need for its string-prefixed `TimerId` dispatch table — a plain
//! `HashMap<ChildSessionId, JoinHandle<()>>` behind a `parking_lot::Mutex`
//! is enough. Arming spawns a `tokio::time::sleep` task that invokes the
//! callback through a trait object, keeping the debouncer decoupled from
//! the concrete supervisor type the same way the teacher routes timer fires
//! back through `Runtime<S, A, N, C>` by id rather than a direct reference.

use async_trait::async_trait;
use orch_core::ChildSessionId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Invoked when a child has been stably idle for the debounce window with
/// at least one pending forward request.
#[async_trait]
pub trait IdleCallback: Send + Sync + 'static {
    async fn on_stable_idle(&self, child_id: ChildSessionId);
}

/// Per-child idle timer, decoupled from the supervisor via [`IdleCallback`].
pub struct IdleDebouncer {
    timers: Arc<Mutex<HashMap<ChildSessionId, JoinHandle<()>>>>,
    duration: Duration,
    callback: Arc<dyn IdleCallback>,
}

impl IdleDebouncer {
    pub fn new(callback: Arc<dyn IdleCallback>) -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            duration: orch_core::config::debounce_duration(),
            callback,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    fn cancel(&self, child_id: &ChildSessionId) {
        if let Some(handle) = self.timers.lock().remove(child_id) {
            handle.abort();
            debug!(child_id = %child_id, "idle timer cancelled");
        }
    }

    /// `busy` event: cancel any armed timer.
    pub fn on_busy(&self, child_id: &ChildSessionId) {
        self.cancel(child_id);
    }

    /// `idle` event: cancel any armed timer, then re-arm only if the caller
    /// reports at least one pending forward request for this child.
    pub fn on_idle(&self, child_id: &ChildSessionId, has_pending: bool) {
        self.cancel(child_id);
        if !has_pending {
            return;
        }

        let id = child_id.clone();
        let fire_id = child_id.clone();
        let timers = Arc::clone(&self.timers);
        let callback = Arc::clone(&self.callback);
        let duration = self.duration;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            timers.lock().remove(&fire_id);
            callback.on_stable_idle(fire_id).await;
        });
        debug!(child_id = %id, ms = duration.as_millis(), "idle timer armed");
        self.timers.lock().insert(id, handle);
    }

    /// `error` event: cancel any armed timer. The error path itself is
    /// handled synchronously by the supervisor, not scheduled here.
    pub fn on_error(&self, child_id: &ChildSessionId) {
        self.cancel(child_id);
    }
}

#[cfg(test)]
#[path = "debouncer_tests.rs"]
mod tests;
