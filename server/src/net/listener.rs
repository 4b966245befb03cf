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

//! The TCP accept loop: bounds concurrent connections with a semaphore and
//! relays a broadcast shutdown signal into every live connection so they
//! close instead of lingering past a graceful shutdown.

use super::connection::Connection;
use crate::service::Engine;
use crate::wire::NextFrame;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, Semaphore};

/// Default ceiling on concurrently open client connections.
pub const MAXIMUM_CONNECTION_LIMIT: usize = 50000;

pub struct Listener {
    tcp: TcpListener,
    climit: Arc<Semaphore>,
    shutdown_tx: broadcast::Sender<()>,
    terminate_tx: mpsc::Sender<()>,
    terminate_rx: mpsc::Receiver<()>,
}

impl Listener {
    pub async fn bind(addr: &str, max_connections: usize) -> std::io::Result<Self> {
        let tcp = TcpListener::bind(addr).await?;
        log::info!("server started on {}", addr);
        let (shutdown_tx, _) = broadcast::channel(1);
        let (terminate_tx, terminate_rx) = mpsc::channel(1);
        Ok(Self {
            tcp,
            climit: Arc::new(Semaphore::new(max_connections)),
            shutdown_tx,
            terminate_tx,
            terminate_rx,
        })
    }

    /// Accepts connections until `shutdown` resolves, then stops accepting,
    /// signals every live connection to close, and waits for them to drain.
    pub async fn run(mut self, engine: Arc<Engine>, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                accepted = self.tcp.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let permit = match self.climit.clone().try_acquire_owned() {
                                Ok(p) => p,
                                Err(_) => {
                                    log::warn!("rejected connection from {}: connection limit reached", addr);
                                    continue;
                                }
                            };
                            let engine = engine.clone();
                            let shutdown_rx = self.shutdown_tx.subscribe();
                            let terminate_tx = self.terminate_tx.clone();
                            tokio::spawn(async move {
                                let _permit = permit;
                                let _terminate_tx = terminate_tx;
                                handle_connection(stream, addr, engine, shutdown_rx).await;
                            });
                        }
                        Err(err) => log::error!("accept failed: {}", err),
                    }
                }
            }
        }
        log::info!("no longer accepting new connections, closing active ones");
        let _ = self.shutdown_tx.send(());
        drop(self.terminate_tx);
        let _ = self.terminate_rx.recv().await;
    }
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    addr: std::net::SocketAddr,
    engine: Arc<Engine>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut conn = Connection::new(stream, addr);
    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            read = conn.read_next() => {
                match read {
                    Ok(NextFrame::Frame(frame)) => {
                        match frame.into_command_line() {
                            Some(cmd_line) if !cmd_line.is_empty() => {
                                let reply = engine.exec(&mut conn, &cmd_line).await;
                                if conn.write_reply(&reply).await.is_err() {
                                    break;
                                }
                            }
                            _ => {
                                let reply = crate::wire::Frame::error(
                                    "ERR protocol error: expected a command array",
                                );
                                if conn.write_reply(&reply).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Ok(NextFrame::Eof) => break,
                    Ok(NextFrame::Invalid(reason)) => {
                        let reply = crate::wire::Frame::error(format!("ERR protocol error: {}", reason));
                        let _ = conn.write_reply(&reply).await;
                        break;
                    }
                    Err(err) => {
                        log::debug!("connection {} closed: {}", addr, err);
                        break;
                    }
                }
            }
        }
    }
    conn.drain_before_close().await;
    log::info!("connection closed: {}", addr);
}
