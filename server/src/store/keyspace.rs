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

//! `Keyspace` is a single logically independent database: a concurrent
//! string-keyed dictionary of [`Data`] entries. A node owns a fixed-size
//! vector of these (see [`crate::store::Corestore`]).

use super::data::Data;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct Keyspace {
    inner: DashMap<String, Data>,
}

impl Keyspace {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Data> {
        self.inner.get(key).map(|kv| kv.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Unconditional insert. Returns `true` if this created a new entry,
    /// `false` if it overwrote an existing one.
    pub fn put(&self, key: String, value: Data) -> bool {
        self.inner.insert(key, value).is_none()
    }

    /// Insert only if absent. Returns `true` if inserted.
    pub fn put_if_absent(&self, key: String, value: Data) -> bool {
        match self.inner.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(value);
                true
            }
        }
    }

    /// Insert only if present, returning the previous value on success.
    pub fn put_if_exists(&self, key: &str, value: Data) -> Option<Data> {
        match self.inner.entry(key.to_owned()) {
            dashmap::mapref::entry::Entry::Occupied(mut o) => Some(o.insert(value)),
            dashmap::mapref::entry::Entry::Vacant(_) => None,
        }
    }

    /// Remove a single key. Returns `1` if it existed, `0` otherwise.
    pub fn remove(&self, key: &str) -> usize {
        if self.inner.remove(key).is_some() {
            1
        } else {
            0
        }
    }

    /// Remove each of `keys`, returning the total number removed.
    pub fn removes<'a, I: IntoIterator<Item = &'a str>>(&self, keys: I) -> usize {
        keys.into_iter().map(|k| self.remove(k)).sum()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Visit every key, stopping early if `visitor` returns `false`.
    pub fn for_each<F: FnMut(&str, &Data) -> bool>(&self, mut visitor: F) {
        for kv in self.inner.iter() {
            if !visitor(kv.key(), kv.value()) {
                break;
            }
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.iter().map(|kv| kv.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_roundtrip() {
        let ks = Keyspace::new();
        assert!(ks.put("k".into(), Data::from_blob("v".into())));
        assert_eq!(ks.get("k").unwrap().blob().as_ref(), b"v");
    }

    #[test]
    fn put_if_absent_respects_existing() {
        let ks = Keyspace::new();
        assert!(ks.put_if_absent("k".into(), Data::from_blob("v1".into())));
        assert!(!ks.put_if_absent("k".into(), Data::from_blob("v2".into())));
        assert_eq!(ks.get("k").unwrap().blob().as_ref(), b"v1");
    }

    #[test]
    fn remove_counts_correctly() {
        let ks = Keyspace::new();
        ks.put("a".into(), Data::from_blob("1".into()));
        assert_eq!(ks.remove("a"), 1);
        assert_eq!(ks.remove("a"), 0);
    }

    #[test]
    fn removes_sums_hits() {
        let ks = Keyspace::new();
        ks.put("a".into(), Data::from_blob("1".into()));
        ks.put("b".into(), Data::from_blob("1".into()));
        assert_eq!(ks.removes(["a", "b", "c"]), 2);
    }

    #[test]
    fn clear_empties_keyspace() {
        let ks = Keyspace::new();
        ks.put("a".into(), Data::from_blob("1".into()));
        ks.clear();
        assert_eq!(ks.len(), 0);
    }
}
