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

//! A single connection to a peer node: synchronous request/response from
//! the caller's point of view, no pipelining within one borrowed client.

use crate::wire::{writer, Frame, FrameStream, NextFrame};
use bytes::Bytes;
use tokio::net::TcpStream;

pub struct PeerClient {
    addr: String,
    reader: FrameStream<tokio::net::tcp::OwnedReadHalf>,
    writer_half: tokio::net::tcp::OwnedWriteHalf,
}

impl PeerClient {
    pub async fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            addr: addr.to_owned(),
            reader: FrameStream::new(read_half),
            writer_half: write_half,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Sends one command line and returns the single reply frame that
    /// comes back for it.
    pub async fn send(&mut self, cmd_line: &[Bytes]) -> std::io::Result<Frame> {
        use tokio::io::AsyncWriteExt;
        let frame = Frame::from_command_line(cmd_line);
        let bytes = writer::to_bytes(&frame);
        self.writer_half.write_all(&bytes).await?;
        match self.reader.next_frame().await? {
            NextFrame::Frame(reply) => Ok(reply),
            NextFrame::Eof => Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            )),
            NextFrame::Invalid(reason) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                reason,
            )),
        }
    }
}
