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

//! Bridges the synchronous [`parser`](super::parser) to an async byte
//! stream, buffering partial reads until a complete frame is available.

use super::frame::Frame;
use super::parser::{self, ParseError};
use libsky::BUF_CAP;
use tokio::io::{AsyncRead, AsyncReadExt};

pub enum NextFrame {
    /// A complete frame was read
    Frame(Frame),
    /// The stream ended cleanly between frames
    Eof,
    /// The stream is not a valid continuation of the protocol
    Invalid(String),
}

/// Buffers bytes read from `stream` and yields one [`Frame`] at a time.
pub struct FrameStream<S> {
    stream: S,
    buf: Vec<u8>,
    cursor: usize,
}

impl<S: AsyncRead + Unpin> FrameStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: Vec::with_capacity(BUF_CAP),
            cursor: 0,
        }
    }

    /// Read and return the next complete frame, pulling more bytes from the
    /// underlying stream as needed.
    pub async fn next_frame(&mut self) -> std::io::Result<NextFrame> {
        loop {
            if self.cursor < self.buf.len() {
                match parser::parse(&self.buf[self.cursor..]) {
                    Ok((frame, consumed)) => {
                        self.cursor += consumed;
                        self.compact();
                        return Ok(NextFrame::Frame(frame));
                    }
                    Err(ParseError::Invalid(reason)) => {
                        return Ok(NextFrame::Invalid(reason));
                    }
                    Err(ParseError::Incomplete) => {
                        // fall through to read more bytes
                    }
                }
            }
            let had_pending = self.cursor < self.buf.len();
            let mut tmp = [0u8; BUF_CAP];
            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                return if had_pending {
                    Ok(NextFrame::Invalid(
                        "connection closed mid-frame".to_owned(),
                    ))
                } else {
                    Ok(NextFrame::Eof)
                };
            }
            self.buf.extend_from_slice(&tmp[..n]);
        }
    }

    fn compact(&mut self) {
        if self.cursor == self.buf.len() {
            self.buf.clear();
            self.cursor = 0;
        } else if self.cursor > BUF_CAP {
            self.buf.drain(0..self.cursor);
            self.cursor = 0;
        }
    }
}
