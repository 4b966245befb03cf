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

//! A bounded pool of long-lived connections to one peer node. The factory
//! opens a fresh connection on demand; the validator is a no-op (every
//! borrowed client is assumed healthy, matching the pattern in the source
//! this was grounded on).

use super::client::PeerClient;
use tokio::sync::Mutex;

const DEFAULT_POOL_SIZE: usize = 8;

pub struct PeerPool {
    addr: String,
    idle: Mutex<Vec<PeerClient>>,
    max_size: usize,
}

impl PeerPool {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            idle: Mutex::new(Vec::new()),
            max_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Returns an idle client if one is available, else dials a new one.
    pub async fn borrow(&self) -> std::io::Result<PeerClient> {
        if let Some(client) = self.idle.lock().await.pop() {
            return Ok(client);
        }
        PeerClient::connect(&self.addr).await
    }

    /// Returns `client` to the idle set, subject to the pool's capacity;
    /// over capacity, the client is simply dropped and closed.
    pub async fn give_back(&self, client: PeerClient) {
        let mut idle = self.idle.lock().await;
        if idle.len() < self.max_size {
            idle.push(client);
        }
    }
}
