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

//! The `Frame` is the in-memory representation of a single RESP-style message,
//! either a parsed client command or a reply on its way back out.

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Bytes>),
    Array(Option<Vec<Frame>>),
}

impl Frame {
    pub fn ok() -> Self {
        Frame::Simple("OK".into())
    }
    pub fn pong() -> Self {
        Frame::Simple("PONG".into())
    }
    pub fn error(msg: impl Into<String>) -> Self {
        Frame::Error(msg.into())
    }
    pub fn null_bulk() -> Self {
        Frame::Bulk(None)
    }
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Frame::Bulk(Some(data.into()))
    }
    pub fn integer(n: i64) -> Self {
        Frame::Integer(n)
    }
    pub fn array(items: Vec<Frame>) -> Self {
        Frame::Array(Some(items))
    }
    pub fn empty_array() -> Self {
        Frame::Array(Some(Vec::new()))
    }

    /// Returns the command line (array of bulk strings) as owned byte vectors,
    /// or `None` if this frame isn't shaped like a command.
    pub fn into_command_line(self) -> Option<Vec<Bytes>> {
        match self {
            Frame::Array(Some(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Frame::Bulk(Some(b)) => out.push(b),
                        _ => return None,
                    }
                }
                Some(out)
            }
            _ => None,
        }
    }

    pub fn from_command_line(args: &[Bytes]) -> Self {
        Frame::array(args.iter().cloned().map(Frame::bulk).collect())
    }
}
