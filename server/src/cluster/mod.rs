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

//! Clustered execution: a standalone engine for local data plus a routing
//! layer that relays single-key commands to the node that owns the key,
//! and broadcasts multi-key commands to every node.
//!
//! This redesigns consistent hashing away from this crate's earlier Maglev
//! groundwork in favor of the simpler sorted-ring design; see DESIGN.md.

pub mod client;
pub mod pool;
pub mod ring;

use crate::runtime::{ConnState, StandaloneEngine};
use crate::wire::Frame;
use bytes::Bytes;
use pool::PeerPool;
use ring::NodeMap;
use std::collections::HashMap;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Drives `inner`, catching a panic from any single `poll` instead of
/// letting it unwind the connection task. `catch_unwind` can't wrap an
/// `async fn` body directly because it would need to span suspended
/// `.await` points, so this polls the boxed future by hand and guards each
/// poll individually.
struct CatchUnwind<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future<Output = Frame>> Future for CatchUnwind<F> {
    type Output = Frame;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Frame> {
        let this = self.get_mut();
        match catch_unwind(AssertUnwindSafe(|| this.inner.as_mut().poll(cx))) {
            Ok(poll) => poll,
            Err(_) => {
                log::error!("recovered from a panic while executing a cluster command");
                Poll::Ready(Frame::error("ERR internal error"))
            }
        }
    }
}

async fn catch_panics<F: Future<Output = Frame>>(fut: F) -> Frame {
    CatchUnwind { inner: Box::pin(fut) }.await
}

pub struct ClusterEngine {
    standalone: StandaloneEngine,
    self_name: String,
    nodes: Vec<String>,
    ring: NodeMap,
    pools: HashMap<String, Arc<PeerPool>>,
}

impl ClusterEngine {
    pub fn new(standalone: StandaloneEngine, self_name: String, peers: Vec<String>) -> Self {
        let mut nodes = peers.clone();
        nodes.push(self_name.clone());
        let mut ring = NodeMap::new();
        ring.add_nodes(nodes.iter().map(String::as_str));
        let pools = peers
            .iter()
            .map(|p| (p.clone(), Arc::new(PeerPool::new(p.clone()))))
            .collect();
        Self {
            standalone,
            self_name,
            nodes,
            ring,
            pools,
        }
    }

    pub async fn exec(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        catch_panics(self.route(conn, cmd_line)).await
    }

    /// The cluster-specific dispatch: decides whether a command is served
    /// locally, relayed to the node that owns a key, or broadcast. Always
    /// called through [`catch_panics`] so a panic anywhere in here is
    /// contained the same way [`StandaloneEngine::exec`] contains one.
    async fn route(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        if cmd_line.is_empty() {
            return Frame::error("ERR empty command");
        }
        let name = String::from_utf8_lossy(&cmd_line[0]).to_lowercase();
        match name.as_str() {
            "ping" | "select" => self.standalone.exec(conn, cmd_line).await,
            "set" | "setnx" | "get" | "getset" | "exists" | "type" => {
                self.default_relay(conn, cmd_line).await
            }
            "del" => self.broadcast_sum(conn, cmd_line).await,
            "flushdb" => self.broadcast_ok(conn, cmd_line).await,
            "rename" | "renamenx" => self.same_slot_relay(conn, cmd_line).await,
            _ => Frame::error(format!(
                "ERR unknown command '{}', or not supported in cluster mode",
                name
            )),
        }
    }

    async fn default_relay(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        if cmd_line.len() < 2 {
            return Frame::error("ERR wrong number of arguments");
        }
        let key = String::from_utf8_lossy(&cmd_line[1]);
        let peer = self.ring.pick_node(&key);
        self.relay(&peer, conn, cmd_line).await
    }

    async fn same_slot_relay(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        if cmd_line.len() != 3 {
            let name = String::from_utf8_lossy(&cmd_line[0]).to_lowercase();
            return Frame::error(format!(
                "ERR wrong number of arguments for '{}' command",
                name
            ));
        }
        let src = String::from_utf8_lossy(&cmd_line[1]);
        let dst = String::from_utf8_lossy(&cmd_line[2]);
        let src_peer = self.ring.pick_node(&src);
        let dst_peer = self.ring.pick_node(&dst);
        if src_peer != dst_peer {
            return Frame::error("ERR rename must within one slot in cluster mode");
        }
        self.relay(&src_peer, conn, cmd_line).await
    }

    async fn broadcast_sum(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        let replies = self.broadcast(conn, cmd_line).await;
        let mut total = 0i64;
        for reply in replies.values() {
            if let Frame::Error(msg) = reply {
                return Frame::error(format!("error occurs: {}", msg));
            }
            if let Frame::Integer(n) = reply {
                total += n;
            }
        }
        Frame::integer(total)
    }

    async fn broadcast_ok(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        let replies = self.broadcast(conn, cmd_line).await;
        for reply in replies.values() {
            if let Frame::Error(msg) = reply {
                return Frame::error(format!("error occurs: {}", msg));
            }
        }
        Frame::ok()
    }

    async fn broadcast(
        &self,
        conn: &mut dyn ConnState,
        cmd_line: &[Bytes],
    ) -> HashMap<String, Frame> {
        let mut out = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let reply = self.relay(node, conn, cmd_line).await;
            out.insert(node.clone(), reply);
        }
        out
    }

    async fn relay(&self, peer: &str, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        if peer == self.self_name {
            return self.standalone.exec(conn, cmd_line).await;
        }
        let Some(pool) = self.pools.get(peer) else {
            return Frame::error(format!("ERR connection pool not found for peer '{}'", peer));
        };
        let mut client = match pool.borrow().await {
            Ok(c) => c,
            Err(err) => {
                return Frame::error(format!("ERR failed to reach peer '{}': {}", peer, err))
            }
        };
        let select = vec![
            Bytes::from_static(b"SELECT"),
            Bytes::from(conn.db_index().to_string()),
        ];
        if let Err(err) = client.send(&select).await {
            return Frame::error(format!("ERR failed to reach peer '{}': {}", peer, err));
        }
        let reply = match client.send(cmd_line).await {
            Ok(r) => r,
            Err(err) => {
                return Frame::error(format!("ERR failed to reach peer '{}': {}", peer, err))
            }
        };
        pool.give_back(client).await;
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aof::writer::AofHandle;

    fn cmd(parts: &[&str]) -> Vec<Bytes> {
        parts
            .iter()
            .map(|p| Bytes::copy_from_slice(p.as_bytes()))
            .collect()
    }

    struct TestConn {
        db: usize,
    }
    impl ConnState for TestConn {
        fn db_index(&self) -> usize {
            self.db
        }
        fn select_db(&mut self, index: usize) {
            self.db = index;
        }
    }

    fn engine() -> ClusterEngine {
        let standalone = StandaloneEngine::new(16, None::<AofHandle>);
        ClusterEngine::new(standalone, "self".into(), vec![])
    }

    #[tokio::test]
    async fn single_node_del_broadcast_sums_local_deletes() {
        let e = engine();
        let mut conn = TestConn { db: 0 };
        e.exec(&mut conn, &cmd(&["SET", "a", "1"])).await;
        e.exec(&mut conn, &cmd(&["SET", "b", "1"])).await;
        let reply = e.exec(&mut conn, &cmd(&["DEL", "a", "b", "c"])).await;
        assert_eq!(reply, Frame::integer(2));
    }

    #[tokio::test]
    async fn rename_same_slot_on_single_node_succeeds() {
        let e = engine();
        let mut conn = TestConn { db: 0 };
        e.exec(&mut conn, &cmd(&["SET", "src", "1"])).await;
        let reply = e.exec(&mut conn, &cmd(&["RENAME", "src", "dst"])).await;
        assert_eq!(reply, Frame::ok());
    }

    #[tokio::test]
    async fn unknown_command_is_rejected() {
        let e = engine();
        let mut conn = TestConn { db: 0 };
        let reply = e.exec(&mut conn, &cmd(&["NOPE"])).await;
        match reply {
            Frame::Error(msg) => assert!(msg.contains("not supported in cluster mode")),
            _ => panic!("expected error"),
        }
    }
}
