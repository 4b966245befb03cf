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

//! The in-memory store: a fixed-size vector of logically independent
//! [`Keyspace`]s, indexed by the client's currently selected database.

pub mod data;
pub mod keyspace;

pub use data::{Data, DataType};
pub use keyspace::Keyspace;

/// Owns every keyspace on this node. Does not itself know about
/// connections, persistence or clustering; those are layered on top in
/// [`crate::engine`].
pub struct Corestore {
    keyspaces: Vec<Keyspace>,
}

impl Corestore {
    pub fn new(count: usize) -> Self {
        let mut keyspaces = Vec::with_capacity(count);
        keyspaces.resize_with(count, Keyspace::new);
        Self { keyspaces }
    }

    pub fn len(&self) -> usize {
        self.keyspaces.len()
    }

    pub fn keyspace(&self, index: usize) -> Option<&Keyspace> {
        self.keyspaces.get(index)
    }
}
