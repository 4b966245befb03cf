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

//! Picks which engine a node runs: standalone when there is no peer list,
//! clustered when `self` and a non-empty peer list are both configured.

use crate::cluster::ClusterEngine;
use crate::runtime::{ConnState, StandaloneEngine};
use crate::wire::Frame;
use bytes::Bytes;

pub enum Engine {
    Standalone(StandaloneEngine),
    Cluster(ClusterEngine),
}

impl Engine {
    pub async fn exec(&self, conn: &mut dyn ConnState, cmd_line: &[Bytes]) -> Frame {
        match self {
            Engine::Standalone(e) => e.exec(conn, cmd_line).await,
            Engine::Cluster(e) => e.exec(conn, cmd_line).await,
        }
    }
}
