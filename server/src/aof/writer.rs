/*
 * Created on Tue Jul 30 2026
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2020, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! The append-only-file writer: a bounded queue drained by one background
//! task that serializes payloads as command frames, inserting a `SELECT`
//! frame whenever the database in use changes.

use crate::wire::{writer as framewriter, Frame};
use bytes::Bytes;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Notify, RwLock};

/// Bounds how far a bursty writer can outrun the background flush task.
pub const AOF_QUEUE_CAPACITY: usize = 1 << 16;

struct Payload {
    db_index: usize,
    cmd_line: Vec<Bytes>,
}

/// Whether the engine is replaying its log at startup or serving live
/// traffic. `AddAof` is a no-op while `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Loading,
    Serving,
}

/// A cheaply cloneable handle handlers use to append to the log. Disabled
/// entirely when persistence is off, and gated to a no-op while the engine
/// is replaying its own log at startup.
#[derive(Clone)]
pub struct AofHandle {
    tx: mpsc::Sender<PayloadMsg>,
    loading: Arc<AtomicBool>,
    /// Acquired shared by every write, exclusively by a future log-rewrite
    /// coordinator to quiesce the writer while it snapshots.
    pub pause: Arc<RwLock<()>>,
}

enum PayloadMsg {
    Write(Payload),
}

impl AofHandle {
    pub fn set_state(&self, state: EngineState) {
        self.loading.store(state == EngineState::Loading, Ordering::SeqCst);
    }

    /// Appends `cmd_line` for `db_index`. Waits for queue capacity rather
    /// than dropping the write when the writer is behind: a client has
    /// already been told a write succeeded, so losing it here would break
    /// recovery. Only a no-op while the engine is replaying its own log.
    pub async fn add(&self, db_index: usize, cmd_line: &[Bytes]) {
        if self.loading.load(Ordering::SeqCst) {
            return;
        }
        let payload = Payload {
            db_index,
            cmd_line: cmd_line.to_vec(),
        };
        if self.tx.send(PayloadMsg::Write(payload)).await.is_err() {
            log::warn!("AOF writer has shut down, dropping a write");
        }
    }
}

pub struct AofWriter {
    rx: mpsc::Receiver<PayloadMsg>,
    pause: Arc<RwLock<()>>,
    file: tokio::fs::File,
    current_db: usize,
    finished: Arc<Notify>,
}

/// Opens (creating if absent) the AOF file append-only with mode 0600 and
/// returns a handle plus the background writer, not yet spawned.
pub async fn open(path: &Path) -> std::io::Result<(AofHandle, AofWriter, Arc<Notify>)> {
    let file = open_append_create(path).await?;
    let (tx, rx) = mpsc::channel(AOF_QUEUE_CAPACITY);
    let pause = Arc::new(RwLock::new(()));
    let finished = Arc::new(Notify::new());
    let handle = AofHandle {
        tx,
        loading: Arc::new(AtomicBool::new(true)),
        pause: pause.clone(),
    };
    let writer = AofWriter {
        rx,
        pause,
        file,
        current_db: 0,
        finished: finished.clone(),
    };
    Ok((handle, writer, finished))
}

#[cfg(unix)]
async fn open_append_create(path: &Path) -> std::io::Result<tokio::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .append(true)
        .create(true)
        .mode(0o600)
        .open(path)
        .await
}

#[cfg(not(unix))]
async fn open_append_create(path: &Path) -> std::io::Result<tokio::fs::File> {
    OpenOptions::new().append(true).create(true).open(path).await
}

impl AofWriter {
    /// Drains the queue until every sender has dropped, writing each
    /// payload in order, then notifies anyone waiting on shutdown.
    pub async fn run(mut self) {
        while let Some(PayloadMsg::Write(payload)) = self.rx.recv().await {
            let _lease = self.pause.read().await;
            let mut buf = Vec::new();
            if payload.db_index != self.current_db {
                let select = Frame::from_command_line(&[
                    Bytes::from_static(b"SELECT"),
                    Bytes::from(payload.db_index.to_string()),
                ]);
                framewriter::encode(&select, &mut buf);
                self.current_db = payload.db_index;
            }
            let frame = Frame::from_command_line(&payload.cmd_line);
            framewriter::encode(&frame, &mut buf);
            if let Err(err) = self.file.write_all(&buf).await {
                log::warn!("AOF write failed, dropping this entry: {}", err);
            }
        }
        let _ = self.file.flush().await;
        self.finished.notify_one();
    }
}
