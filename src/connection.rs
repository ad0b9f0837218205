//! Per-connection glue: one reader task, one writer task, both talking to
//! the central actor purely over channels.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::actor::Event;
use crate::framer::LineFramer;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Accept one connection: split the socket, spawn a writer task fed by an
/// outbound channel, spawn a reader task that frames lines and forwards
/// them to the actor, and report the new connection to the actor.
pub fn handle_connection(socket: TcpStream, addr: SocketAddr, actor_tx: UnboundedSender<Event>) {
    let id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
    let (read_half, write_half) = socket.into_split();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(run_writer(write_half, out_rx));

    let reader_handle = tokio::spawn(run_reader(read_half, id, actor_tx.clone()));

    let _ = actor_tx.send(Event::Connected {
        id,
        addr,
        outbox: out_tx,
        reader_handle,
    });
}

async fn run_writer(mut write_half: tokio::net::tcp::OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(msg) = rx.recv().await {
        if write_half.write_all(msg.as_bytes()).await.is_err() {
            break;
        }
    }
}

async fn run_reader(
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    id: u64,
    actor_tx: UnboundedSender<Event>,
) {
    let mut framer = LineFramer::new();
    let mut chunk = [0u8; 256];

    loop {
        let room = framer.room();
        if room == 0 {
            let _ = actor_tx.send(Event::Oversized { id });
            framer.reset();
            continue;
        }
        let to_read = room.min(chunk.len());
        let n = match read_half.read(&mut chunk[..to_read]).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        framer.feed(&chunk[..n]);
        while let Some(line) = framer.consume_line() {
            if actor_tx.send(Event::Line { id, line }).is_err() {
                return;
            }
        }
    }

    let _ = actor_tx.send(Event::Disconnected { id });
}
