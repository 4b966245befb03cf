/*
 * Created on Thu Jul 02 2020
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

//! # kvd
//!
//! An in-memory key-value server speaking a RESP-like wire protocol, with
//! sixteen logically independent keyspaces per node, optional append-only
//! persistence, and an optional sharded cluster mode.

mod aof;
mod cluster;
mod cmd;
mod config;
mod net;
mod runtime;
mod service;
mod store;
mod wire;

use clap::Parser;
use config::{Cli, Config};
use libsky::util::terminal;
use service::Engine;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() {
    env_logger::Builder::new()
        .parse_filters(&std::env::var("KVD_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();

    let cli = Cli::parse();
    let config = match Config::load(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            log::error!("configuration error: {}", err);
            process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("kvd-worker")
        .enable_all()
        .build()
        .expect("failed to start the async runtime");

    let result = runtime.block_on(run(config));
    match result {
        Ok(()) => {
            let _ = terminal::write_info("Goodbye :)\n");
        }
        Err(err) => {
            log::error!("fatal startup error: {}", err);
            process::exit(1);
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    log::info!(
        "starting kvd ({} mode)",
        if config.is_clustered() { "cluster" } else { "standalone" }
    );

    let (aof_handle, aof_writer, aof_finished) = if config.appendonly {
        let path = PathBuf::from(&config.appendfilename);
        let (handle, writer, finished) = aof::writer::open(&path).await?;
        (Some(handle), Some(writer), Some(finished))
    } else {
        (None, None, None)
    };

    let standalone = runtime::StandaloneEngine::new(config.databases, aof_handle.clone());

    if config.appendonly {
        let path = PathBuf::from(&config.appendfilename);
        aof::loader::load(&path, 0, &standalone, aof_handle.as_ref()).await?;
    }
    if let Some(handle) = &aof_handle {
        handle.set_state(aof::EngineState::Serving);
    }

    let writer_join = aof_writer.map(|w| tokio::spawn(w.run()));

    let engine = if config.is_clustered() {
        let self_name = config.self_node.clone().unwrap();
        Engine::Cluster(cluster::ClusterEngine::new(
            standalone,
            self_name,
            config.peers.clone(),
        ))
    } else {
        Engine::Standalone(standalone)
    };
    let engine = Arc::new(engine);

    let listener = net::Listener::bind(&config.bind_addr(), config.max_connections).await?;
    listener.run(engine, shutdown_signal()).await;

    // The writer only sees its channel close, and so only notifies
    // `aof_finished`, once every `AofHandle` clone has been dropped. The
    // listener's own clone (held inside `engine`) is gone once `run` above
    // returns, but this one is still alive in scope, so it must be dropped
    // explicitly or the writer never drains and shutdown hangs forever.
    drop(aof_handle);

    if let Some(finished) = aof_finished {
        finished.notified().await;
    }
    if let Some(handle) = writer_join {
        let _ = handle.await;
    }

    Ok(())
}

/// Resolves once any of SIGHUP, SIGINT, SIGTERM or SIGQUIT is received.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut hangup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
    let mut interrupt = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut quit = signal(SignalKind::quit()).expect("failed to install SIGQUIT handler");
    tokio::select! {
        _ = hangup.recv() => log::info!("received SIGHUP, shutting down"),
        _ = interrupt.recv() => log::info!("received SIGINT, shutting down"),
        _ = terminate.recv() => log::info!("received SIGTERM, shutting down"),
        _ = quit.recv() => log::info!("received SIGQUIT, shutting down"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::info!("received ctrl-c, shutting down");
}
