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

//! The command table: a name-to-handler map built once at startup, with
//! arity validation done centrally before a handler ever runs. This is
//! deliberately an explicit, builder-constructed, immutable table rather
//! than a lazily-populated global registry.

use super::handlers;
use crate::store::Keyspace;
use crate::wire::Frame;
use bytes::Bytes;
use std::cell::RefCell;
use std::collections::HashMap;

/// Arity of a command: `Exact(n)` requires exactly `n` tokens including the
/// command name, `AtLeast(n)` requires at least `n`.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn is_satisfied_by(&self, len: usize) -> bool {
        match self {
            Arity::Exact(n) => len == *n,
            Arity::AtLeast(n) => len >= *n,
        }
    }
}

/// What a handler is given to do its work: the keyspace currently selected
/// by the connection, and a place to record a command for the append-only
/// log. Handlers only decide *what* (if anything) to log; the engine is the
/// one that actually sends it to the AOF writer once dispatch has returned,
/// since that send can suspend and a handler has no async context to do it
/// in.
pub struct HandlerCtx<'a> {
    pub keyspace: &'a Keyspace,
    pending_aof: RefCell<Option<Vec<Bytes>>>,
}

impl<'a> HandlerCtx<'a> {
    pub fn new(keyspace: &'a Keyspace) -> Self {
        Self {
            keyspace,
            pending_aof: RefCell::new(None),
        }
    }

    pub fn log_aof(&self, cmd_line: &[Bytes]) {
        *self.pending_aof.borrow_mut() = Some(cmd_line.to_vec());
    }

    /// Takes whatever the handler asked to log, if anything. Every command
    /// this registry dispatches logs at most once, so `Option` suffices.
    pub fn take_pending_aof(self) -> Option<Vec<Bytes>> {
        self.pending_aof.into_inner()
    }
}

pub type Handler = fn(&HandlerCtx, &[Bytes]) -> Frame;

struct Entry {
    handler: Handler,
    arity: Arity,
}

pub struct Registry {
    commands: HashMap<&'static str, Entry>,
}

pub struct RegistryBuilder {
    commands: HashMap<&'static str, Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn register(mut self, name: &'static str, arity: Arity, handler: Handler) -> Self {
        self.commands.insert(name, Entry { handler, arity });
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            commands: self.commands,
        }
    }
}

#[derive(Debug)]
pub enum DispatchError {
    UnknownCommand(String),
    WrongArity(String),
}

impl DispatchError {
    pub fn into_frame(self) -> Frame {
        match self {
            DispatchError::UnknownCommand(name) => {
                Frame::error(format!("ERR unknown command '{}'", name))
            }
            DispatchError::WrongArity(name) => Frame::error(format!(
                "ERR wrong number of arguments for '{}' command",
                name
            )),
        }
    }
}

impl Registry {
    /// Builds the full command table for this node. SELECT is handled one
    /// layer up (it mutates connection state the registry doesn't see), so
    /// it is deliberately absent here.
    pub fn build() -> Registry {
        RegistryBuilder::new()
            .register("ping", Arity::Exact(1), handlers::ping)
            .register("set", Arity::AtLeast(3), handlers::set)
            .register("setnx", Arity::Exact(3), handlers::setnx)
            .register("get", Arity::Exact(2), handlers::get)
            .register("getset", Arity::Exact(3), handlers::getset)
            .register("strlen", Arity::Exact(2), handlers::strlen)
            .register("del", Arity::AtLeast(2), handlers::del)
            .register("exists", Arity::AtLeast(2), handlers::exists)
            .register("keys", Arity::Exact(2), handlers::keys)
            .register("flushdb", Arity::AtLeast(1), handlers::flushdb)
            .register("type", Arity::Exact(2), handlers::type_of)
            .register("rename", Arity::Exact(3), handlers::rename)
            .register("renamenx", Arity::Exact(3), handlers::renamenx)
            .build()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Validates arity and dispatches. `cmd_line` includes the command name
    /// at index 0.
    pub fn dispatch(&self, ctx: &HandlerCtx, cmd_line: &[Bytes]) -> Result<Frame, DispatchError> {
        let name = String::from_utf8_lossy(&cmd_line[0]).to_lowercase();
        match self.commands.get(name.as_str()) {
            None => Err(DispatchError::UnknownCommand(name)),
            Some(entry) => {
                if !entry.arity.is_satisfied_by(cmd_line.len()) {
                    return Err(DispatchError::WrongArity(name));
                }
                Ok((entry.handler)(ctx, cmd_line))
            }
        }
    }
}
