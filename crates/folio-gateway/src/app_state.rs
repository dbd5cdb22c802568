//! Shared application state for the presence gateway.
//!
//! Built once per process: the realtime substrate, the presence dispatcher
//! task that exclusively owns the registry, and the metrics registry. Also
//! owns the process lifecycle: the drain signal sessions watch and the
//! dispatcher task handle awaited on shutdown.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use folio_core::error::{FolioError, Result};

use crate::config::GatewayConfig;
use crate::dispatch::{self, DispatcherHandle, EventDispatcher, PresenceStats};
use crate::obs::GatewayMetrics;
use crate::presence::PresenceCounter;
use crate::realtime::RealtimeCore;

type PresenceTask = JoinHandle<EventDispatcher<Arc<RealtimeCore>>>;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    realtime: Arc<RealtimeCore>,
    presence: DispatcherHandle,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    drain: watch::Sender<bool>,
    open_sessions: watch::Sender<usize>,
    presence_task: Mutex<Option<PresenceTask>>,
}

/// Counts a transport session as open until dropped.
pub struct SessionGuard {
    inner: Arc<AppStateInner>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.inner
            .open_sessions
            .send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl AppState {
    /// Build application state and start the dispatcher task.
    /// Must be called from within a tokio runtime.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        let realtime = Arc::new(RealtimeCore::new());
        let metrics = Arc::new(GatewayMetrics::default());

        let dispatcher = EventDispatcher::new(
            Arc::clone(&realtime),
            PresenceCounter::new(cfg.presence.count_policy()),
            cfg.presence.room_names(),
            Arc::clone(&metrics),
        );
        let (presence, task) = dispatch::spawn(dispatcher, cfg.presence.command_queue);

        tracing::info!(
            policy = ?cfg.presence.count_policy(),
            admin_room = %cfg.presence.admin_room,
            "presence gateway state ready"
        );

        let (drain, _) = watch::channel(false);
        let (open_sessions, _) = watch::channel(0);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                drain,
                open_sessions,
                presence_task: Mutex::new(Some(task)),
            }),
            realtime,
            presence,
            metrics,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn realtime(&self) -> Arc<RealtimeCore> {
        Arc::clone(&self.realtime)
    }

    pub fn presence(&self) -> &DispatcherHandle {
        &self.presence
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Extra metric lines owned by the substrate.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("folio_egress_drops_total", self.realtime.egress_drop_count()),
            ("folio_substrate_rooms", self.realtime.rooms.room_count() as u64),
            ("folio_substrate_sessions", self.realtime.sessions.len() as u64),
        ]
    }

    pub fn session_guard(&self) -> SessionGuard {
        self.inner.open_sessions.send_modify(|n| *n += 1);
        SessionGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn open_sessions(&self) -> usize {
        *self.inner.open_sessions.borrow()
    }

    /// Resolves once draining has begun.
    pub fn drain_signal(&self) -> watch::Receiver<bool> {
        self.inner.drain.subscribe()
    }

    /// Flip readiness and tell every open session to close.
    pub fn begin_drain(&self) {
        self.metrics.set_draining();
        self.inner.drain.send_replace(true);
    }

    /// Drain sessions (bounded by `gateway.shutdown_grace_ms`), then stop the
    /// dispatcher once their disconnects are applied. Returns the final stats.
    pub async fn shutdown(&self) -> Result<PresenceStats> {
        self.begin_drain();

        let grace = Duration::from_millis(self.cfg().gateway.shutdown_grace_ms);
        let mut open = self.inner.open_sessions.subscribe();
        if tokio::time::timeout(grace, sessions_closed(&mut open))
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = self.open_sessions(),
                "shutdown grace elapsed with sessions still open"
            );
        }

        let task = self
            .inner
            .presence_task
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        let Some(task) = task else {
            return Err(FolioError::Unavailable);
        };

        self.presence.shutdown().await?;
        let dispatcher = task
            .await
            .map_err(|e| FolioError::Internal(format!("presence dispatcher: {e}")))?;
        Ok(dispatcher.stats())
    }
}

async fn sessions_closed(open: &mut watch::Receiver<usize>) {
    let _ = open.wait_for(|n| *n == 0).await;
}
