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

//! Per-client connection state: the selected database, the read side of
//! the wire stream, and a write side serialized behind a mutex with a
//! waiting-reply counter so `close` can drain in-flight writes.

use super::wait::WaitGroup;
use crate::runtime::ConnState;
use crate::wire::{writer, Frame, FrameStream, NextFrame};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Connection {
    peer_addr: SocketAddr,
    reader: FrameStream<OwnedReadHalf>,
    writer_half: Mutex<OwnedWriteHalf>,
    waiting_reply: WaitGroup,
    selected_db: usize,
}

impl Connection {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            peer_addr,
            reader: FrameStream::new(read_half),
            writer_half: Mutex::new(write_half),
            waiting_reply: WaitGroup::new(),
            selected_db: 0,
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub async fn read_next(&mut self) -> std::io::Result<NextFrame> {
        self.reader.next_frame().await
    }

    pub async fn write_reply(&self, frame: &Frame) -> std::io::Result<()> {
        self.waiting_reply.add(1);
        let bytes = writer::to_bytes(frame);
        let result = {
            let mut w = self.writer_half.lock().await;
            w.write_all(&bytes).await
        };
        self.waiting_reply.done();
        result
    }

    /// Waits up to ten seconds for in-flight reply writes to finish before
    /// the caller tears down the socket.
    pub async fn drain_before_close(&self) {
        if self.waiting_reply.wait_with_timeout(CLOSE_DRAIN_TIMEOUT).await {
            log::warn!(
                "connection to {} closed with a reply write still in flight",
                self.peer_addr
            );
        }
    }
}

impl ConnState for Connection {
    fn db_index(&self) -> usize {
        self.selected_db
    }
    fn select_db(&mut self, index: usize) {
        self.selected_db = index;
    }
}
