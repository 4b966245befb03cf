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

//! Command handler bodies. Each takes the full command line (name at index
//! 0) and a [`HandlerCtx`] giving access to the selected keyspace and the
//! AOF sink; arity has already been validated by the registry.

use super::registry::HandlerCtx;
use super::wildcard;
use crate::store::Data;
use crate::wire::Frame;
use bytes::Bytes;

fn key_str(b: &Bytes) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(b)
}

pub fn ping(_ctx: &HandlerCtx, _cmd: &[Bytes]) -> Frame {
    Frame::pong()
}

pub fn set(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let key = key_str(&cmd[1]).into_owned();
    let value = Data::from_blob(cmd[2].clone());
    ctx.keyspace.put(key, value);
    ctx.log_aof(cmd);
    Frame::ok()
}

pub fn setnx(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let key = key_str(&cmd[1]).into_owned();
    let value = Data::from_blob(cmd[2].clone());
    let inserted = ctx.keyspace.put_if_absent(key, value);
    ctx.log_aof(cmd);
    Frame::integer(inserted as i64)
}

pub fn get(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let key = key_str(&cmd[1]);
    match ctx.keyspace.get(&key) {
        Some(data) => Frame::bulk(data.into_blob()),
        None => Frame::null_bulk(),
    }
}

pub fn getset(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let key = key_str(&cmd[1]);
    if !ctx.keyspace.contains(&key) {
        return Frame::null_bulk();
    }
    let old = ctx
        .keyspace
        .put_if_exists(&key, Data::from_blob(cmd[2].clone()));
    ctx.log_aof(cmd);
    match old {
        Some(data) => Frame::bulk(data.into_blob()),
        None => Frame::null_bulk(),
    }
}

pub fn strlen(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let key = key_str(&cmd[1]);
    match ctx.keyspace.get(&key) {
        Some(data) => Frame::integer(data.len() as i64),
        None => Frame::null_bulk(),
    }
}

pub fn del(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let keys: Vec<String> = cmd[1..].iter().map(|b| key_str(b).into_owned()).collect();
    let removed = ctx.keyspace.removes(keys.iter().map(String::as_str));
    if removed > 0 {
        ctx.log_aof(cmd);
    }
    Frame::integer(removed as i64)
}

pub fn exists(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let count = cmd[1..]
        .iter()
        .filter(|k| ctx.keyspace.contains(&key_str(k)))
        .count();
    Frame::integer(count as i64)
}

pub fn keys(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let pattern = &cmd[1];
    let mut matched = Vec::new();
    ctx.keyspace.for_each(|key, _value| {
        if wildcard::is_match(key.as_bytes(), pattern) {
            matched.push(Frame::bulk(Bytes::from(key.to_owned())));
        }
        true
    });
    Frame::array(matched)
}

pub fn flushdb(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    ctx.keyspace.clear();
    ctx.log_aof(cmd);
    Frame::ok()
}

pub fn type_of(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let key = key_str(&cmd[1]);
    match ctx.keyspace.get(&key) {
        Some(data) => Frame::Simple(data.kind().as_status().to_owned()),
        None => Frame::Simple("none".to_owned()),
    }
}

pub fn rename(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let src = key_str(&cmd[1]).into_owned();
    let dst = key_str(&cmd[2]).into_owned();
    match ctx.keyspace.get(&src) {
        None => Frame::error("no such key"),
        Some(data) => {
            ctx.keyspace.put(dst, data);
            ctx.keyspace.remove(&src);
            ctx.log_aof(cmd);
            Frame::ok()
        }
    }
}

pub fn renamenx(ctx: &HandlerCtx, cmd: &[Bytes]) -> Frame {
    let src = key_str(&cmd[1]).into_owned();
    let dst = key_str(&cmd[2]).into_owned();
    if ctx.keyspace.contains(&dst) {
        return Frame::integer(0);
    }
    match ctx.keyspace.get(&src) {
        None => Frame::error("no such key"),
        Some(data) => {
            ctx.keyspace.put(dst, data);
            ctx.keyspace.remove(&src);
            ctx.log_aof(cmd);
            Frame::integer(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Keyspace;

    fn ctx_no_aof(ks: &Keyspace) -> HandlerCtx {
        HandlerCtx::new(ks)
    }

    fn bcmd(parts: &[&str]) -> Vec<Bytes> {
        parts.iter().map(|p| Bytes::copy_from_slice(p.as_bytes())).collect()
    }

    #[test]
    fn set_then_get() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        set(&ctx, &bcmd(&["SET", "k", "v"]));
        assert_eq!(get(&ctx, &bcmd(&["GET", "k"])), Frame::bulk(Bytes::from_static(b"v")));
    }

    #[test]
    fn setnx_does_not_overwrite() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        set(&ctx, &bcmd(&["SET", "k", "v"]));
        let reply = setnx(&ctx, &bcmd(&["SETNX", "k", "w"]));
        assert_eq!(reply, Frame::integer(0));
        assert_eq!(get(&ctx, &bcmd(&["GET", "k"])), Frame::bulk(Bytes::from_static(b"v")));
    }

    #[test]
    fn rename_missing_src_errors_without_mutating() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        set(&ctx, &bcmd(&["SET", "dst", "v"]));
        let reply = rename(&ctx, &bcmd(&["RENAME", "missing", "dst"]));
        assert_eq!(reply, Frame::error("no such key"));
        assert_eq!(get(&ctx, &bcmd(&["GET", "dst"])), Frame::bulk(Bytes::from_static(b"v")));
    }

    #[test]
    fn renamenx_on_missing_src_does_not_fall_through() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        let reply = renamenx(&ctx, &bcmd(&["RENAMENX", "missing", "dst"]));
        assert_eq!(reply, Frame::error("no such key"));
        assert!(!ks.contains("dst"));
    }

    #[test]
    fn renamenx_rejects_existing_dst() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        set(&ctx, &bcmd(&["SET", "src", "1"]));
        set(&ctx, &bcmd(&["SET", "dst", "2"]));
        assert_eq!(renamenx(&ctx, &bcmd(&["RENAMENX", "src", "dst"])), Frame::integer(0));
    }

    #[test]
    fn getset_on_missing_key_does_not_write() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        let reply = getset(&ctx, &bcmd(&["GETSET", "k", "v"]));
        assert_eq!(reply, Frame::null_bulk());
        assert!(!ks.contains("k"));
    }

    #[test]
    fn del_counts_only_existing() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        set(&ctx, &bcmd(&["SET", "a", "1"]));
        let reply = del(&ctx, &bcmd(&["DEL", "a", "b"]));
        assert_eq!(reply, Frame::integer(1));
    }

    #[test]
    fn keys_matches_wildcard_pattern() {
        let ks = Keyspace::new();
        let ctx = ctx_no_aof(&ks);
        set(&ctx, &bcmd(&["SET", "abc", "1"]));
        set(&ctx, &bcmd(&["SET", "xyz", "1"]));
        let reply = keys(&ctx, &bcmd(&["KEYS", "a*"]));
        match reply {
            Frame::Array(Some(items)) => assert_eq!(items.len(), 1),
            _ => panic!("expected array"),
        }
    }
}
