//! The on-disk snapshot image.
//!
//! A dump is self-describing: a magic header, an entry count, then one
//! record per key carrying a type tag and a tag-specific payload. Strings
//! store their expiry as epoch milliseconds so TTLs survive a restart.
//! Keys are written in sorted order, which makes two saves of the same
//! state byte-identical.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! "RUDB" <version u8>
//! <entry count u64>
//! per entry:
//!   <key len u32> <key bytes>
//!   <tag u8>                       0 = string, 1 = list, 2 = set
//!                                  (3 = hash, 4 = sorted set reserved)
//!   string: <expiry flag u8> [<expiry ms i64>] <len u32> <bytes>
//!   list:   <item count u32> (<len u32> <bytes>)*
//!   set:    <item count u32> (<len u32> <bytes>)*   items sorted
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use jiff::Timestamp;
use thiserror::Error;

use crate::store::Value;

const MAGIC: &[u8; 4] = b"RUDB";
const VERSION: u8 = 1;

const TAG_STRING: u8 = 0;
const TAG_LIST: u8 = 1;
const TAG_SET: u8 = 2;

#[derive(Error, Debug, PartialEq)]
pub enum SnapshotError {
    #[error("unexpected end of snapshot stream")]
    UnexpectedEof,
    #[error("invalid snapshot header")]
    BadHeader,
    #[error("unknown value tag {0}")]
    UnknownTag(u8),
    #[error("snapshot contains invalid UTF-8")]
    InvalidUtf8,
    #[error("invalid expiry timestamp")]
    InvalidTimestamp,
}

/// Serializes the keyspace. Expired string entries are filtered out, so
/// encoding is safe under a read lock.
pub fn encode(entries: &HashMap<String, Value>) -> Vec<u8> {
    let now = Timestamp::now();
    let mut keys: Vec<&String> = entries
        .iter()
        .filter(|(_, value)| match value {
            Value::Str {
                expires_at: Some(deadline),
                ..
            } => now <= *deadline,
            _ => true,
        })
        .map(|(key, _)| key)
        .collect();
    keys.sort();

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(keys.len() as u64).to_le_bytes());

    for key in keys {
        write_string(&mut out, key);
        match &entries[key] {
            Value::Str { data, expires_at } => {
                out.push(TAG_STRING);
                match expires_at {
                    Some(deadline) => {
                        out.push(1);
                        out.extend_from_slice(&deadline.as_millisecond().to_le_bytes());
                    }
                    None => out.push(0),
                }
                write_string(&mut out, data);
            }
            Value::List(items) => {
                out.push(TAG_LIST);
                out.extend_from_slice(&(items.len() as u32).to_le_bytes());
                for item in items {
                    write_string(&mut out, item);
                }
            }
            Value::Set(members) => {
                out.push(TAG_SET);
                out.extend_from_slice(&(members.len() as u32).to_le_bytes());
                let mut sorted: Vec<&String> = members.iter().collect();
                sorted.sort();
                for member in sorted {
                    write_string(&mut out, member);
                }
            }
        }
    }

    out
}

/// Reconstructs a keyspace from an image produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<HashMap<String, Value>, SnapshotError> {
    let mut cursor = Cursor::new(bytes);

    let magic = cursor.take(4)?;
    if magic != MAGIC {
        return Err(SnapshotError::BadHeader);
    }
    if cursor.take_u8()? != VERSION {
        return Err(SnapshotError::BadHeader);
    }

    let count = cursor.take_u64()?;
    let mut entries = HashMap::with_capacity(count as usize);

    for _ in 0..count {
        let key = cursor.take_string()?;
        let tag = cursor.take_u8()?;
        let value = match tag {
            TAG_STRING => {
                let expires_at = match cursor.take_u8()? {
                    0 => None,
                    _ => {
                        let millis = cursor.take_i64()?;
                        Some(
                            Timestamp::from_millisecond(millis)
                                .map_err(|_| SnapshotError::InvalidTimestamp)?,
                        )
                    }
                };
                Value::Str {
                    data: cursor.take_string()?,
                    expires_at,
                }
            }
            TAG_LIST => {
                let len = cursor.take_u32()?;
                let mut items = VecDeque::with_capacity(len as usize);
                for _ in 0..len {
                    items.push_back(cursor.take_string()?);
                }
                Value::List(items)
            }
            TAG_SET => {
                let len = cursor.take_u32()?;
                let mut members = HashSet::with_capacity(len as usize);
                for _ in 0..len {
                    members.insert(cursor.take_string()?);
                }
                Value::Set(members)
            }
            other => return Err(SnapshotError::UnknownTag(other)),
        };
        entries.insert(key, value);
    }

    Ok(entries)
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
}

struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SnapshotError> {
        let end = self
            .position
            .checked_add(len)
            .ok_or(SnapshotError::UnexpectedEof)?;
        let slice = self
            .bytes
            .get(self.position..end)
            .ok_or(SnapshotError::UnexpectedEof)?;
        self.position = end;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take(1)?[0])
    }

    fn take_u32(&mut self) -> Result<u32, SnapshotError> {
        let bytes: [u8; 4] = self
            .take(4)?
            .try_into()
            .map_err(|_| SnapshotError::UnexpectedEof)?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn take_u64(&mut self) -> Result<u64, SnapshotError> {
        let bytes: [u8; 8] = self
            .take(8)?
            .try_into()
            .map_err(|_| SnapshotError::UnexpectedEof)?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn take_i64(&mut self) -> Result<i64, SnapshotError> {
        let bytes: [u8; 8] = self
            .take(8)?
            .try_into()
            .map_err(|_| SnapshotError::UnexpectedEof)?;
        Ok(i64::from_le_bytes(bytes))
    }

    fn take_string(&mut self) -> Result<String, SnapshotError> {
        let len = self.take_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SnapshotError::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;

    fn sample_entries() -> HashMap<String, Value> {
        let mut entries = HashMap::new();
        entries.insert(
            "plain".to_string(),
            Value::Str {
                data: "hello".to_string(),
                expires_at: None,
            },
        );
        entries.insert(
            "expiring".to_string(),
            Value::Str {
                data: "soon".to_string(),
                expires_at: Some(Timestamp::now() + 1.hours()),
            },
        );
        entries.insert(
            "queue".to_string(),
            Value::List(VecDeque::from(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
            ])),
        );
        entries.insert(
            "tags".to_string(),
            Value::Set(HashSet::from(["x".to_string(), "y".to_string()])),
        );
        entries
    }

    #[test]
    fn test_round_trip() {
        let entries = sample_entries();
        let image = encode(&entries);
        let decoded = decode(&image).unwrap();

        assert_eq!(decoded.len(), entries.len());
        match (&decoded["expiring"], &entries["expiring"]) {
            (
                Value::Str {
                    data: decoded_data,
                    expires_at: Some(decoded_expiry),
                },
                Value::Str {
                    data: original_data,
                    expires_at: Some(original_expiry),
                },
            ) => {
                assert_eq!(decoded_data, original_data);
                assert_eq!(
                    decoded_expiry.as_millisecond(),
                    original_expiry.as_millisecond()
                );
            }
            other => panic!("unexpected shapes: {:?}", other),
        }
        assert_eq!(decoded["queue"], entries["queue"]);
        assert_eq!(decoded["tags"], entries["tags"]);
        assert_eq!(decoded["plain"], entries["plain"]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let entries = sample_entries();
        assert_eq!(encode(&entries), encode(&entries));
    }

    #[test]
    fn test_encode_filters_expired_strings() {
        let mut entries = HashMap::new();
        entries.insert(
            "stale".to_string(),
            Value::Str {
                data: "x".to_string(),
                expires_at: Some(Timestamp::now() - 1.seconds()),
            },
        );

        let decoded = decode(&encode(&entries)).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_empty_entry_count() {
        let decoded = decode(&encode(&HashMap::new())).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_bad_magic() {
        assert_eq!(decode(b"NOPE\x01"), Err(SnapshotError::BadHeader));
    }

    #[test]
    fn test_decode_truncated_image() {
        let image = encode(&sample_entries());
        assert_eq!(
            decode(&image[..image.len() - 3]),
            Err(SnapshotError::UnexpectedEof)
        );
    }
}
