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

//! The standalone engine: a fixed vector of keyspaces plus the command
//! registry, wired so that handlers can append to the AOF. This is the
//! node-local execution core; [`crate::cluster`] composes one of these per
//! node and adds routing on top.

use crate::aof::writer::AofHandle;
use crate::cmd::{HandlerCtx, Registry};
use crate::store::Corestore;
use crate::wire::Frame;
use bytes::Bytes;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Per-connection state the engine needs: which database is selected.
/// Implemented by real client connections ([`crate::net::Connection`]) and
/// by the synthetic connection the AOF loader replays through.
pub trait ConnState {
    fn db_index(&self) -> usize;
    fn select_db(&mut self, index: usize);
}

pub struct StandaloneEngine {
    store: Corestore,
    registry: Registry,
    aof: Option<AofHandle>,
}

impl StandaloneEngine {
    pub fn new(databases: usize, aof: Option<AofHandle>) -> Self {
        Self {
            store: Corestore::new(databases),
            registry: Registry::build(),
            aof,
        }
    }

    pub fn database_count(&self) -> usize {
        self.store.len()
    }

    /// Executes one command line (name at index 0) against `conn`'s
    /// selected keyspace. Never panics: handler panics are caught and
    /// turned into an opaque internal-error reply.
    pub async fn exec(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        if cmd_line.is_empty() {
            return Frame::error("ERR empty command");
        }
        let name = String::from_utf8_lossy(&cmd_line[0]).to_lowercase();
        if name == "select" {
            return self.exec_select(conn, cmd_line);
        }
        let db_index = conn.db_index();
        let Some(keyspace) = self.store.keyspace(db_index) else {
            return Frame::error("ERR DB index is out of range");
        };
        let ctx = HandlerCtx::new(keyspace);
        let registry = &self.registry;
        let result = catch_unwind(AssertUnwindSafe(|| registry.dispatch(&ctx, cmd_line)));
        let frame = match result {
            Ok(Ok(frame)) => frame,
            Ok(Err(dispatch_err)) => dispatch_err.into_frame(),
            Err(_) => {
                log::error!("recovered from a panic while executing '{}'", name);
                return Frame::error("ERR internal error");
            }
        };
        if let Some(log_line) = ctx.take_pending_aof() {
            if let Some(handle) = &self.aof {
                handle.add(db_index, &log_line).await;
            }
        }
        frame
    }

    fn exec_select(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        if cmd_line.len() != 2 {
            return Frame::error("ERR wrong number of arguments for 'select' command");
        }
        let idx_str = String::from_utf8_lossy(&cmd_line[1]);
        let idx: i64 = match idx_str.parse() {
            Ok(n) => n,
            Err(_) => return Frame::error("ERR invalid DB index"),
        };
        if idx < 0 || idx as usize >= self.store.len() {
            return Frame::error("ERR DB index is out of range");
        }
        conn.select_db(idx as usize);
        Frame::ok()
    }
}
