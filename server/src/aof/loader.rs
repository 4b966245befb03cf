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

//! Replays an existing AOF file through the engine at startup, via a
//! synthetic connection that tracks a selected database and discards
//! replies.

use super::writer::{AofHandle, EngineState};
use crate::runtime::{ConnState, StandaloneEngine};
use crate::wire::parser::{self, ParseError};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// A connection-shaped stand-in with no socket: used only to carry the
/// selected-db state `SELECT` frames mutate during replay.
struct FakeConn {
    db: usize,
}

impl ConnState for FakeConn {
    fn db_index(&self) -> usize {
        self.db
    }
    fn select_db(&mut self, index: usize) {
        self.db = index;
    }
}

/// Loads and replays `path` against `engine`. Absence of the file is not an
/// error. `max_bytes` of zero means unbounded.
pub async fn load(
    path: &Path,
    max_bytes: usize,
    engine: &StandaloneEngine,
    aof: Option<&AofHandle>,
) -> std::io::Result<()> {
    if let Some(handle) = aof {
        handle.set_state(EngineState::Loading);
    }
    let result = load_inner(path, max_bytes, engine).await;
    if let Some(handle) = aof {
        handle.set_state(EngineState::Serving);
    }
    result
}

async fn load_inner(
    path: &Path,
    max_bytes: usize,
    engine: &StandaloneEngine,
) -> std::io::Result<()> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    let mut buf = Vec::new();
    if max_bytes > 0 {
        file.take(max_bytes as u64).read_to_end(&mut buf).await?;
    } else {
        file.read_to_end(&mut buf).await?;
    }

    let mut conn = FakeConn { db: 0 };
    let mut pos = 0usize;
    loop {
        if pos >= buf.len() {
            break;
        }
        match parser::parse(&buf[pos..]) {
            Ok((frame, consumed)) => {
                pos += consumed;
                match frame.into_command_line() {
                    Some(cmd_line) if !cmd_line.is_empty() => {
                        let _ = engine.exec(&mut conn, &cmd_line).await;
                    }
                    _ => {
                        log::warn!("AOF replay: skipped a non-command-array frame");
                    }
                }
            }
            Err(ParseError::Incomplete) => {
                log::warn!("AOF replay: stopping at a truncated trailing frame");
                break;
            }
            Err(ParseError::Invalid(reason)) => {
                log::warn!("AOF replay: stopping on a malformed frame: {}", reason);
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{writer, Frame};
    use bytes::Bytes;

    #[tokio::test]
    async fn replays_set_and_select() {
        let dir = std::env::temp_dir().join(format!(
            "kvd-aof-test-{}",
            std::process::id()
        ));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("replay.aof");
        let mut bytes = Vec::new();
        writer::encode(
            &Frame::from_command_line(&[Bytes::from_static(b"SET"), Bytes::from_static(b"a"), Bytes::from_static(b"1")]),
            &mut bytes,
        );
        writer::encode(
            &Frame::from_command_line(&[Bytes::from_static(b"SELECT"), Bytes::from_static(b"1")]),
            &mut bytes,
        );
        writer::encode(
            &Frame::from_command_line(&[Bytes::from_static(b"SET"), Bytes::from_static(b"b"), Bytes::from_static(b"2")]),
            &mut bytes,
        );
        tokio::fs::write(&path, &bytes).await.unwrap();

        let engine = StandaloneEngine::new(16, None);
        load(&path, 0, &engine, None).await.unwrap();

        let mut probe = FakeConn { db: 0 };
        let reply = engine
            .exec(&mut probe, &[Bytes::from_static(b"GET"), Bytes::from_static(b"a")])
            .await;
        assert_eq!(reply, Frame::bulk(Bytes::from_static(b"1")));

        let mut probe1 = FakeConn { db: 1 };
        let reply = engine
            .exec(&mut probe1, &[Bytes::from_static(b"GET"), Bytes::from_static(b"b")])
            .await;
        assert_eq!(reply, Frame::bulk(Bytes::from_static(b"2")));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let engine = StandaloneEngine::new(16, None);
        let path = std::env::temp_dir().join("kvd-aof-definitely-missing.aof");
        let _ = tokio::fs::remove_file(&path).await;
        assert!(load(&path, 0, &engine, None).await.is_ok());
    }
}
