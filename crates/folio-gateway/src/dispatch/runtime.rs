//! Single owning task for the presence dispatcher.
//!
//! Commands from every transport session funnel through one bounded channel
//! and are applied strictly one at a time. Nothing inside `apply` awaits, so
//! no other command can observe a half-applied event.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use folio_core::error::{FolioError, Result};
use folio_core::ConnectionId;

use super::dispatcher::{EventDispatcher, PresenceStats};
use crate::realtime::Transport;

#[derive(Debug)]
pub enum Command {
    Connect { conn: ConnectionId },
    Frame { conn: ConnectionId, text: String },
    TransportError { conn: ConnectionId, detail: String },
    Disconnect { conn: ConnectionId },
    Stats { reply: oneshot::Sender<PresenceStats> },
    /// Stop after every command queued before it has been applied.
    Shutdown,
}

/// Cloneable sender side of the dispatcher task.
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<Command>,
}

impl DispatcherHandle {
    pub async fn connect(&self, conn: ConnectionId) -> Result<()> {
        self.send(Command::Connect { conn }).await
    }

    pub async fn frame(&self, conn: ConnectionId, text: String) -> Result<()> {
        self.send(Command::Frame { conn, text }).await
    }

    pub async fn transport_error(&self, conn: ConnectionId, detail: String) -> Result<()> {
        self.send(Command::TransportError { conn, detail }).await
    }

    pub async fn disconnect(&self, conn: ConnectionId) -> Result<()> {
        self.send(Command::Disconnect { conn }).await
    }

    pub async fn stats(&self) -> Result<PresenceStats> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stats { reply }).await?;
        rx.await.map_err(|_| FolioError::Unavailable)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).await.map_err(|_| FolioError::Unavailable)
    }
}

/// Move the dispatcher into its own task. The task ends on `Shutdown` or once
/// every handle is dropped, and yields the dispatcher back for inspection.
pub fn spawn<T>(
    dispatcher: EventDispatcher<T>,
    queue: usize,
) -> (DispatcherHandle, JoinHandle<EventDispatcher<T>>)
where
    T: Transport + 'static,
{
    let (tx, mut rx) = mpsc::channel(queue.max(1));
    let task = tokio::spawn(async move {
        let mut dispatcher = dispatcher;
        tracing::info!("presence dispatcher started");
        while let Some(cmd) = rx.recv().await {
            if let Command::Shutdown = cmd {
                rx.close();
                break;
            }
            apply(&mut dispatcher, cmd);
        }
        tracing::info!(
            connections = dispatcher.registry().connections.len(),
            "presence dispatcher stopped"
        );
        dispatcher
    });
    (DispatcherHandle { tx }, task)
}

fn apply<T: Transport>(dispatcher: &mut EventDispatcher<T>, cmd: Command) {
    match cmd {
        Command::Connect { conn } => dispatcher.connect(conn),
        Command::Frame { conn, text } => dispatcher.handle_frame(conn, &text),
        Command::TransportError { conn, detail } => dispatcher.transport_error(conn, &detail),
        Command::Disconnect { conn } => dispatcher.disconnect(conn),
        Command::Stats { reply } => {
            // requester may have gone away
            let _ = reply.send(dispatcher.stats());
        }
        Command::Shutdown => {}
    }
}
