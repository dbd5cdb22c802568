//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Allocate a connection id + outbound queue in the realtime substrate
//! - Forward text frames to the presence dispatcher, in arrival order
//! - Lifecycle: ping + idle timeout + drain on shutdown
//! - Send exactly one `Disconnect` when the session ends, however it ends

use axum::{
    extract::{ws::Message, ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use folio_core::error::Result;
use folio_core::ConnectionId;

use crate::app_state::AppState;
use crate::realtime::Transport;
use crate::transport::codec::{classify, Inbound};

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if app.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }
    app.metrics().ws_upgrades.inc(&[]);
    ws.on_upgrade(move |socket| {
        let span = tracing::info_span!("ws", conn = tracing::field::Empty);
        async move {
            let (ws_tx, ws_rx) = socket.split();
            if let Err(e) = run_session(app, ws_tx, ws_rx).await {
                tracing::debug!(error = %e, "session ended with error");
            }
        }
        .instrument(span)
    })
}

/// Drive one client session over any message sink/stream pair.
pub async fn run_session<S, R>(app: AppState, ws_tx: S, ws_rx: R) -> Result<()>
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = std::result::Result<Message, axum::Error>> + Unpin,
{
    let _open = app.session_guard();
    let realtime = app.realtime();
    let (conn, out_rx) = realtime.open_session(app.cfg().gateway.outbound_queue);
    tracing::Span::current().record("conn", tracing::field::display(conn));

    app.metrics().ws_sessions.inc(&[]);
    let result = session_loop(&app, conn, ws_tx, ws_rx, out_rx).await;

    // The dispatcher releases the substrate after cleanup; if it is gone, do it here.
    if app.presence().disconnect(conn).await.is_err() {
        realtime.release(conn);
    }
    app.metrics().ws_sessions.dec(&[]);
    result
}

async fn session_loop<S, R>(
    app: &AppState,
    conn: ConnectionId,
    mut ws_tx: S,
    mut ws_rx: R,
    mut out_rx: mpsc::Receiver<Message>,
) -> Result<()>
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = std::result::Result<Message, axum::Error>> + Unpin,
{
    let presence = app.presence();
    presence.connect(conn).await?;

    let mut drain = app.drain_signal();

    let gw = &app.cfg().gateway;
    let ping_every = Duration::from_millis(gw.ping_interval_ms);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let msg = match incoming {
                    Ok(msg) => msg,
                    Err(e) => {
                        presence.transport_error(conn, e.to_string()).await?;
                        break;
                    }
                };

                last_activity = Instant::now();

                match classify(msg) {
                    Inbound::Event(text) => presence.frame(conn, text).await?,
                    Inbound::Unsupported { bytes_len } => {
                        app.metrics().malformed_frames.inc(&[("code", "BAD_REQUEST")]);
                        tracing::warn!(bytes_len, "binary frame ignored");
                    }
                    Inbound::Ping(payload) => {
                        if ws_tx.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Inbound::Pong => {}
                    Inbound::Close => break,
                }
            }

            // ping
            _ = ping_tick.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    tracing::debug!("idle timeout");
                    break;
                }
            }

            // shutdown
            _ = drained(&mut drain) => {
                tracing::debug!("gateway draining, closing session");
                break;
            }
        }
    }

    let _ = ws_tx.close().await;
    Ok(())
}

async fn drained(drain: &mut watch::Receiver<bool>) {
    // a dropped sender means the state is gone; treat it as draining
    let _ = drain.wait_for(|draining| *draining).await;
}
