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

//! Serializes [`Frame`]s back into wire bytes.

use super::frame::Frame;

/// Append the wire encoding of `frame` onto `out`.
pub fn encode(frame: &Frame, out: &mut Vec<u8>) {
    match frame {
        Frame::Simple(s) => {
            out.push(b'+');
            out.extend_from_slice(s.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        Frame::Error(s) => {
            out.push(b'-');
            out.extend_from_slice(s.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        Frame::Integer(n) => {
            out.push(b':');
            out.extend_from_slice(n.to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        Frame::Bulk(None) => {
            out.extend_from_slice(b"$-1\r\n");
        }
        Frame::Bulk(Some(b)) => {
            out.push(b'$');
            out.extend_from_slice(b.len().to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(b);
            out.extend_from_slice(b"\r\n");
        }
        Frame::Array(None) => {
            out.extend_from_slice(b"*-1\r\n");
        }
        Frame::Array(Some(items)) => {
            out.push(b'*');
            out.extend_from_slice(items.len().to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
            for item in items {
                encode(item, out);
            }
        }
    }
}

/// Convenience for callers that just want a fresh byte vector.
pub fn to_bytes(frame: &Frame) -> Vec<u8> {
    let mut buf = Vec::new();
    encode(frame, &mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn encodes_ok() {
        assert_eq!(to_bytes(&Frame::ok()), b"+OK\r\n");
    }

    #[test]
    fn encodes_integer() {
        assert_eq!(to_bytes(&Frame::integer(42)), b":42\r\n");
    }

    #[test]
    fn encodes_bulk() {
        assert_eq!(
            to_bytes(&Frame::bulk(Bytes::from_static(b"hi"))),
            b"$2\r\nhi\r\n"
        );
    }

    #[test]
    fn encodes_null_bulk() {
        assert_eq!(to_bytes(&Frame::null_bulk()), b"$-1\r\n");
    }

    #[test]
    fn encodes_empty_array() {
        assert_eq!(to_bytes(&Frame::empty_array()), b"*0\r\n");
    }

    #[test]
    fn encodes_nested_array() {
        let frame = Frame::array(vec![Frame::bulk(Bytes::from_static(b"a")), Frame::integer(1)]);
        assert_eq!(to_bytes(&frame), b"*2\r\n$1\r\na\r\n:1\r\n");
    }
}
