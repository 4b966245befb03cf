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

//! [`Data`] is the value half of a keyspace entry: an owned, reference
//! counted byte blob with a type tag. There's only one data type in this
//! core (byte strings), so the tag is fixed, but it is kept explicit so
//! `TYPE` has something principled to report.

use bytes::Bytes;
use std::borrow::Borrow;
use std::ops::Deref;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Str,
}

impl DataType {
    pub fn as_status(&self) -> &'static str {
        match self {
            DataType::Str => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    blob: Bytes,
    kind: DataType,
}

impl Data {
    pub fn from_blob(blob: Bytes) -> Self {
        Self {
            blob,
            kind: DataType::Str,
        }
    }

    pub fn blob(&self) -> &Bytes {
        &self.blob
    }

    pub fn into_blob(self) -> Bytes {
        self.blob
    }

    pub fn kind(&self) -> DataType {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.blob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }
}

impl Deref for Data {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.blob
    }
}

impl Borrow<[u8]> for Data {
    fn borrow(&self) -> &[u8] {
        &self.blob
    }
}

impl AsRef<[u8]> for Data {
    fn as_ref(&self) -> &[u8] {
        &self.blob
    }
}

impl<T: Into<Bytes>> From<T> for Data {
    fn from(value: T) -> Self {
        Data::from_blob(value.into())
    }
}
