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

//! A consistent-hash ring for single-key routing: one point per node (no
//! virtual nodes), sorted by hash, with `pick_node` resolving a key to the
//! least point whose hash is not smaller than the key's, wrapping around.

use crc::{Crc, CRC_32_ISO_HDLC};

static CHECKSUM: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

fn default_hash(s: &str) -> u32 {
    CHECKSUM.checksum(s.as_bytes())
}

pub struct NodeMap {
    points: Vec<(u32, String)>,
    hash_fn: fn(&str) -> u32,
}

impl NodeMap {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            hash_fn: default_hash,
        }
    }

    #[cfg(test)]
    pub fn with_hash(hash_fn: fn(&str) -> u32) -> Self {
        Self {
            points: Vec::new(),
            hash_fn,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn add_node(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        let hash = (self.hash_fn)(name);
        self.points.push((hash, name.to_owned()));
        self.points.sort_by_key(|(h, _)| *h);
    }

    pub fn add_nodes<'a, I: IntoIterator<Item = &'a str>>(&mut self, names: I) {
        for name in names {
            self.add_node(name);
        }
    }

    /// Returns the name of the node owning `key`, or the empty string if
    /// the ring has no nodes.
    pub fn pick_node(&self, key: &str) -> String {
        if self.points.is_empty() {
            return String::new();
        }
        let hash = (self.hash_fn)(key);
        let idx = self.points.partition_point(|(h, _)| *h < hash);
        let idx = if idx == self.points.len() { 0 } else { idx };
        self.points[idx].1.clone()
    }
}

impl Default for NodeMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_returns_empty_string() {
        let ring = NodeMap::new();
        assert_eq!(ring.pick_node("anything"), "");
    }

    #[test]
    fn picks_a_registered_node() {
        let mut ring = NodeMap::new();
        ring.add_nodes(["a", "b", "c"]);
        for key in ["k1", "k2", "k3", "hello", "world"] {
            let node = ring.pick_node(key);
            assert!(["a", "b", "c"].contains(&node.as_str()));
        }
    }

    #[test]
    fn pick_node_is_deterministic() {
        let mut ring = NodeMap::new();
        ring.add_nodes(["a", "b", "c"]);
        assert_eq!(ring.pick_node("stable-key"), ring.pick_node("stable-key"));
    }

    #[test]
    fn ignores_empty_names() {
        let mut ring = NodeMap::new();
        ring.add_node("");
        assert!(ring.is_empty());
    }

    #[test]
    fn most_assignments_survive_adding_a_node() {
        let mut before = NodeMap::new();
        before.add_nodes(["a", "b", "c"]);
        let keys: Vec<String> = (0..1000).map(|i| format!("key-{}", i)).collect();
        let before_assign: Vec<String> = keys.iter().map(|k| before.pick_node(k)).collect();

        let mut after = NodeMap::new();
        after.add_nodes(["a", "b", "c", "d"]);
        let after_assign: Vec<String> = keys.iter().map(|k| after.pick_node(k)).collect();

        let stable = before_assign
            .iter()
            .zip(after_assign.iter())
            .filter(|(a, b)| a == b)
            .count();
        assert!(stable * 100 >= keys.len() * 50, "only {} of {} stable", stable, keys.len());
    }
}
