//! RESP (REdis Serialization Protocol) framing.
//!
//! Requests arrive as arrays of bulk strings. Replies use simple strings,
//! errors, integers, bulk strings, arrays and two nil markers: the null
//! bulk string (`$-1\r\n`) and the RESP3 null (`_\r\n`).
//!
//! Parsing is incremental: frames are extracted from a growing [`BytesMut`]
//! buffer and partial frames leave the buffer untouched until more bytes
//! arrive.

use bytes::{Buf, BytesMut};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("unknown RESP type byte")]
    UnknownType,
    #[error("invalid length prefix")]
    InvalidLength,
    #[error("invalid bulk string")]
    InvalidBulkString,
    #[error("invalid integer")]
    InvalidInteger,
}

#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    /// The `$-1\r\n` nil used by list replies and blocking timeouts.
    NullBulkString,
    /// The `_\r\n` nil used by string replies.
    Null,
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Encodes this value into its wire representation.
    pub fn encode(&self) -> String {
        match self {
            RespValue::SimpleString(s) => format!("+{}\r\n", s),
            RespValue::Error(msg) => format!("-{}\r\n", msg),
            RespValue::Integer(n) => format!(":{}\r\n", n),
            RespValue::BulkString(s) => format!("${}\r\n{}\r\n", s.len(), s),
            RespValue::NullBulkString => "$-1\r\n".to_string(),
            RespValue::Null => "_\r\n".to_string(),
            RespValue::Array(elements) => {
                let mut out = format!("*{}\r\n", elements.len());
                for element in elements {
                    out.push_str(&element.encode());
                }
                out
            }
        }
    }

    /// Builds the framed image of a command: an array of bulk strings
    /// holding the command word followed by its literal arguments.
    pub fn command_frame(name: &str, arguments: &[String]) -> RespValue {
        let mut elements = Vec::with_capacity(arguments.len() + 1);
        elements.push(RespValue::BulkString(name.to_string()));
        for argument in arguments {
            elements.push(RespValue::BulkString(argument.clone()));
        }
        RespValue::Array(elements)
    }

    /// Encodes a flat array of bulk strings.
    pub fn encode_array_from_strings<S: AsRef<str>>(items: &[S]) -> String {
        RespValue::Array(
            items
                .iter()
                .map(|item| RespValue::BulkString(item.as_ref().to_string()))
                .collect(),
        )
        .encode()
    }
}

/// Attempts to extract one complete frame from the front of `buffer`.
///
/// Returns `Ok(None)` when the buffer does not yet hold a full frame; in
/// that case nothing is consumed. On success the frame's bytes are drained
/// from the buffer.
pub fn parse_frame(buffer: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
    match parse_at(buffer, 0)? {
        Some((value, consumed)) => {
            buffer.advance(consumed);
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Parses one frame starting at `pos`, returning the value and the total
/// number of bytes it occupies.
fn parse_at(buffer: &[u8], pos: usize) -> Result<Option<(RespValue, usize)>, RespError> {
    let Some((line, line_end)) = read_line(buffer, pos) else {
        return Ok(None);
    };

    if line.is_empty() {
        return Err(RespError::UnknownType);
    }

    let body = std::str::from_utf8(&line[1..]).map_err(|_| RespError::InvalidUtf8)?;

    match line[0] {
        b'+' => Ok(Some((
            RespValue::SimpleString(body.to_string()),
            line_end - pos,
        ))),
        b'-' => Ok(Some((RespValue::Error(body.to_string()), line_end - pos))),
        b':' => {
            let value = body.parse::<i64>().map_err(|_| RespError::InvalidInteger)?;
            Ok(Some((RespValue::Integer(value), line_end - pos)))
        }
        b'_' => {
            if !body.is_empty() {
                return Err(RespError::UnknownType);
            }
            Ok(Some((RespValue::Null, line_end - pos)))
        }
        b'$' => {
            if body == "-1" {
                return Ok(Some((RespValue::NullBulkString, line_end - pos)));
            }
            let length = body
                .parse::<usize>()
                .map_err(|_| RespError::InvalidLength)?;
            let payload_end = line_end
                .checked_add(length)
                .and_then(|end| end.checked_add(2))
                .ok_or(RespError::InvalidLength)?;
            if buffer.len() < payload_end {
                return Ok(None);
            }
            if &buffer[line_end + length..payload_end] != b"\r\n" {
                return Err(RespError::InvalidBulkString);
            }
            let payload = std::str::from_utf8(&buffer[line_end..line_end + length])
                .map_err(|_| RespError::InvalidUtf8)?;
            Ok(Some((
                RespValue::BulkString(payload.to_string()),
                payload_end - pos,
            )))
        }
        b'*' => {
            if body == "-1" {
                return Ok(Some((RespValue::NullBulkString, line_end - pos)));
            }
            let count = body
                .parse::<usize>()
                .map_err(|_| RespError::InvalidLength)?;
            let mut elements = Vec::with_capacity(count);
            let mut cursor = line_end;
            for _ in 0..count {
                match parse_at(buffer, cursor)? {
                    Some((element, consumed)) => {
                        elements.push(element);
                        cursor += consumed;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((RespValue::Array(elements), cursor - pos)))
        }
        _ => Err(RespError::UnknownType),
    }
}

/// Finds the next CRLF-terminated line starting at `pos`. Returns the line
/// contents (without the terminator) and the index just past the CRLF.
fn read_line(buffer: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    let haystack = buffer.get(pos..)?;
    let offset = haystack.windows(2).position(|window| window == b"\r\n")?;
    Some((&haystack[..offset], pos + offset + 2))
}
