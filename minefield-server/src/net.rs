//! Websocket transport: one pump task per socket, one command channel into
//! the single server context.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::sync::{mpsc, oneshot};

use crate::protocol::ClientMsg;
use crate::room::{ConnId, Outbound};
use crate::server::GameServer;

/// Everything the net layer asks of the server context.
#[derive(Debug)]
pub enum Command {
    Connect { conn: ConnId, tx: mpsc::UnboundedSender<Outbound> },
    Disconnect { conn: ConnId },
    Inbound { conn: ConnId, msg: ClientMsg },
    Malformed { conn: ConnId, description: String },
    Tick,
    Dump { reply: oneshot::Sender<String> },
    Stop,
}

#[derive(Clone)]
struct AppState {
    cmd_tx: mpsc::UnboundedSender<Command>,
    next_conn: Arc<AtomicU64>,
}

/// Runs the whole server: the command loop owning `GameServer`, the 1 Hz
/// ticker, and the HTTP listener. Returns after ctrl-c once the final
/// snapshot is written.
pub async fn serve(mut server: GameServer, host: &str, port: u16) -> Result<()> {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();

    // All server/room/game mutation happens inside this one task.
    let server_task = tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Connect { conn, tx } => server.connect(conn, tx),
                Command::Disconnect { conn } => server.disconnect(conn),
                Command::Inbound { conn, msg } => server.handle(conn, msg),
                Command::Malformed { conn, description } => {
                    server.protocol_error(conn, &description)
                }
                Command::Tick => server.beat(),
                Command::Dump { reply } => {
                    let _ = reply.send(server.dump());
                }
                Command::Stop => {
                    server.stop();
                    break;
                }
            }
        }
    });

    let ticker_tx = cmd_tx.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if ticker_tx.send(Command::Tick).is_err() {
                break;
            }
        }
    });

    let state = AppState { cmd_tx: cmd_tx.clone(), next_conn: Arc::new(AtomicU64::new(1)) };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/dump", get(dump_handler))
        .with_state(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    log::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("shutdown requested");
        })
        .await?;

    ticker.abort();
    cmd_tx.send(Command::Stop).ok();
    server_task.await.ok();
    Ok(())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let conn = state.next_conn.fetch_add(1, Ordering::Relaxed);
    let cmd_tx = state.cmd_tx.clone();
    ws.on_upgrade(move |socket| pump_socket(socket, conn, cmd_tx))
}

async fn dump_handler(State(state): State<AppState>) -> String {
    let (reply, answer) = oneshot::channel();
    if state.cmd_tx.send(Command::Dump { reply }).is_err() {
        return "server stopped\n".into();
    }
    answer.await.unwrap_or_else(|_| "server stopped\n".into())
}

/// Shuttles frames between one websocket and the server context until either
/// side closes.
async fn pump_socket(mut socket: WebSocket, conn: ConnId, cmd_tx: mpsc::UnboundedSender<Command>) {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();
    if cmd_tx.send(Command::Connect { conn, tx: out_tx }).is_err() {
        return;
    }

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let cmd = match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(msg) => Command::Inbound { conn, msg },
                            Err(e) => Command::Malformed { conn, description: e.to_string() },
                        };
                        if cmd_tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary: ignored
                    Some(Err(e)) => {
                        log::debug!("[{conn}] socket error: {e}");
                        break;
                    }
                }
            }
            outbound = out_rx.recv() => {
                match outbound {
                    Some(Outbound::Msg(msg)) => {
                        let text = match serde_json::to_string(&msg) {
                            Ok(text) => text,
                            Err(e) => {
                                log::error!("[{conn}] unserializable message: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Evicted by a rejoin, or the room aborted.
                    Some(Outbound::Close) | None => break,
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
    let _ = cmd_tx.send(Command::Disconnect { conn });
}
