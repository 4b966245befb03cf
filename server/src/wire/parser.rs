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

//! A streaming parser for the RESP-style wire format used by this server.
//!
//! The parser operates over an explicit position cursor into a borrowed byte
//! slice, never recursing more than the frame nesting depth, and reports
//! three outcomes per attempt: a complete frame and the number of bytes it
//! consumed, a need for more bytes (`Incomplete`), or a protocol violation.

use super::frame::Frame;
use bytes::Bytes;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// More bytes are needed before a complete frame can be produced
    Incomplete,
    /// The stream will never produce a valid frame from this point; the
    /// connection should be closed
    Invalid(String),
}

pub type ParseResult = Result<(Frame, usize), ParseError>;

/// Attempt to parse exactly one frame starting at the beginning of `buf`.
///
/// On success, returns the frame along with how many bytes were consumed
/// from `buf`. On `Incomplete`, the caller should read more bytes and retry
/// from the start of the same buffer. On `Invalid`, the connection is beyond
/// recovery and should be torn down.
pub fn parse(buf: &[u8]) -> ParseResult {
    let mut pos = 0usize;
    let frame = parse_frame(buf, &mut pos)?;
    Ok((frame, pos))
}

fn parse_frame(buf: &[u8], pos: &mut usize) -> Result<Frame, ParseError> {
    let tag = peek_byte(buf, *pos)?;
    match tag {
        b'+' => {
            *pos += 1;
            let line = read_line(buf, pos)?;
            Ok(Frame::Simple(line))
        }
        b'-' => {
            *pos += 1;
            let line = read_line(buf, pos)?;
            Ok(Frame::Error(line))
        }
        b':' => {
            *pos += 1;
            let line = read_line(buf, pos)?;
            let n = line
                .parse::<i64>()
                .map_err(|_| ParseError::Invalid(format!("bad integer frame: {}", line)))?;
            Ok(Frame::Integer(n))
        }
        b'$' => {
            *pos += 1;
            let n = read_signed_len(buf, pos)?;
            if n < 0 {
                if n != -1 {
                    return Err(ParseError::Invalid("bad bulk length".into()));
                }
                return Ok(Frame::Bulk(None));
            }
            let n = n as usize;
            if buf.len() < *pos + n + 2 {
                return Err(ParseError::Incomplete);
            }
            let data = Bytes::copy_from_slice(&buf[*pos..*pos + n]);
            *pos += n;
            expect_crlf(buf, pos)?;
            Ok(Frame::Bulk(Some(data)))
        }
        b'*' => {
            *pos += 1;
            let n = read_signed_len(buf, pos)?;
            if n < 0 {
                if n != -1 {
                    return Err(ParseError::Invalid("bad array length".into()));
                }
                return Ok(Frame::Array(None));
            }
            let n = n as usize;
            let mut items = Vec::with_capacity(n);
            for _ in 0..n {
                items.push(parse_frame(buf, pos)?);
            }
            Ok(Frame::Array(Some(items)))
        }
        other => Err(ParseError::Invalid(format!(
            "unknown frame prefix byte {:#x}",
            other
        ))),
    }
}

fn peek_byte(buf: &[u8], pos: usize) -> Result<u8, ParseError> {
    buf.get(pos).copied().ok_or(ParseError::Incomplete)
}

/// Read up to but excluding the terminating CRLF, advancing `pos` past it.
fn read_line(buf: &[u8], pos: &mut usize) -> Result<String, ParseError> {
    let start = *pos;
    let mut i = start;
    loop {
        if i + 1 >= buf.len() {
            return Err(ParseError::Incomplete);
        }
        if buf[i] == b'\r' && buf[i + 1] == b'\n' {
            let line = std::str::from_utf8(&buf[start..i])
                .map_err(|_| ParseError::Invalid("non-utf8 line".into()))?
                .to_owned();
            *pos = i + 2;
            return Ok(line);
        }
        i += 1;
    }
}

fn read_signed_len(buf: &[u8], pos: &mut usize) -> Result<i64, ParseError> {
    let line = read_line(buf, pos)?;
    line.parse::<i64>()
        .map_err(|_| ParseError::Invalid(format!("bad length prefix: {}", line)))
}

fn expect_crlf(buf: &[u8], pos: &mut usize) -> Result<(), ParseError> {
    if buf.len() < *pos + 2 {
        return Err(ParseError::Incomplete);
    }
    if &buf[*pos..*pos + 2] != b"\r\n" {
        return Err(ParseError::Invalid("expected CRLF terminator".into()));
    }
    *pos += 2;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_string() {
        let (frame, consumed) = parse(b"+OK\r\n").unwrap();
        assert_eq!(frame, Frame::Simple("OK".into()));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn parses_error() {
        let (frame, _) = parse(b"-ERR bad\r\n").unwrap();
        assert_eq!(frame, Frame::Error("ERR bad".into()));
    }

    #[test]
    fn parses_integer() {
        let (frame, _) = parse(b":1000\r\n").unwrap();
        assert_eq!(frame, Frame::Integer(1000));
    }

    #[test]
    fn parses_bulk_string() {
        let (frame, consumed) = parse(b"$5\r\nhello\r\n").unwrap();
        assert_eq!(frame, Frame::Bulk(Some(Bytes::from_static(b"hello"))));
        assert_eq!(consumed, 11);
    }

    #[test]
    fn parses_null_bulk() {
        let (frame, _) = parse(b"$-1\r\n").unwrap();
        assert_eq!(frame, Frame::Bulk(None));
    }

    #[test]
    fn parses_command_array() {
        let input = b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n";
        let (frame, consumed) = parse(input).unwrap();
        assert_eq!(consumed, input.len());
        let cmd = frame.into_command_line().unwrap();
        assert_eq!(cmd.len(), 3);
        assert_eq!(&cmd[0][..], b"SET");
        assert_eq!(&cmd[1][..], b"k");
        assert_eq!(&cmd[2][..], b"v");
    }

    #[test]
    fn parses_null_array() {
        let (frame, _) = parse(b"*-1\r\n").unwrap();
        assert_eq!(frame, Frame::Array(None));
    }

    #[test]
    fn incomplete_on_partial_bulk() {
        let err = parse(b"$5\r\nhel").unwrap_err();
        assert_eq!(err, ParseError::Incomplete);
    }

    #[test]
    fn incomplete_on_partial_header() {
        let err = parse(b"*2\r\n$3\r\nfoo").unwrap_err();
        assert_eq!(err, ParseError::Incomplete);
    }

    #[test]
    fn invalid_on_bad_prefix() {
        let err = parse(b"!nope\r\n").unwrap_err();
        match err {
            ParseError::Invalid(_) => {}
            _ => panic!("expected Invalid"),
        }
    }

    #[test]
    fn invalid_on_bad_length() {
        let err = parse(b"$abc\r\n").unwrap_err();
        match err {
            ParseError::Invalid(_) => {}
            _ => panic!("expected Invalid"),
        }
    }
}
