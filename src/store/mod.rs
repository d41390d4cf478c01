//! The typed keyspace engine.
//!
//! Every live key maps to exactly one [`Value`] variant, so a key can never
//! hold two kinds of data at once. String entries may carry a wall-clock
//! expiry; expired entries are deleted lazily by whichever accessor observes
//! them first and reclaimed in bulk by the background sweeper.
//!
//! The whole store, including the blocking-waiter index, sits behind a
//! single write-preferring `tokio::sync::RwLock`. Accessors that can
//! observe an expired entry take the write lock so they can delete in
//! place.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use jiff::Timestamp;
use regex::Regex;
use thiserror::Error;
use tokio::sync::RwLock;

pub mod blocking;
pub mod list;
pub mod set;

pub use blocking::{block_move, block_pop, Delivery, PopEnd};

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("value is not an integer or out of range")]
    NotInteger,
    #[error("increment or decrement would overflow")]
    Overflow,
}

/// A stored value together with its intrinsic type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str {
        data: String,
        expires_at: Option<Timestamp>,
    },
    List(VecDeque<String>),
    Set(HashSet<String>),
}

/// Options resolved from the SET command grammar.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SetOptions {
    pub expires_at: Option<Timestamp>,
    pub keep_ttl: bool,
    pub nx: bool,
    pub xx: bool,
    pub get_previous: bool,
}

/// Outcome of a SET, from which the handler builds its reply.
#[derive(Debug, PartialEq)]
pub enum SetReply {
    Ok,
    Nil,
    Previous(Option<String>),
}

pub struct Store {
    pub(crate) entries: HashMap<String, Value>,
    pub(crate) waiters: HashMap<String, VecDeque<blocking::WaiterRecord>>,
}

pub type SharedStore = Arc<RwLock<Store>>;

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Store {
            entries: HashMap::new(),
            waiters: HashMap::new(),
        }
    }

    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Store::new()))
    }

    fn is_expired(expires_at: Option<Timestamp>) -> bool {
        expires_at
            .map(|deadline| Timestamp::now() > deadline)
            .unwrap_or(false)
    }

    /// Deletes the entry at `key` if it is an expired string. Every
    /// accessor goes through this before touching the entry, which is what
    /// makes an expired key observably absent.
    pub(crate) fn expire_if_due(&mut self, key: &str) {
        if let Some(Value::Str { expires_at, .. }) = self.entries.get(key) {
            if Self::is_expired(*expires_at) {
                self.entries.remove(key);
            }
        }
    }

    /// Removes every expired string entry. Called by the periodic sweeper
    /// and before a foreground save.
    pub fn purge_expired(&mut self) -> usize {
        let now = Timestamp::now();
        let before = self.entries.len();
        self.entries.retain(|_, value| match value {
            Value::Str {
                expires_at: Some(deadline),
                ..
            } => now <= *deadline,
            _ => true,
        });
        before - self.entries.len()
    }

    /// Looks up a string value.
    ///
    /// Returns the payload and its expiry, `None` for an absent (or
    /// expired) key, or `WrongType` when the key holds a list or set.
    pub fn get(&mut self, key: &str) -> Result<Option<(String, Option<Timestamp>)>, StoreError> {
        self.expire_if_due(key);
        match self.entries.get(key) {
            None => Ok(None),
            Some(Value::Str { data, expires_at }) => Ok(Some((data.clone(), *expires_at))),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Installs a string value subject to the NX/XX/KEEPTTL/GET options.
    ///
    /// An unmet NX or XX condition installs nothing; the reply is nil
    /// unless GET was requested, in which case it carries the previous
    /// value (or nil). Without KEEPTTL the new entry has no expiry
    /// regardless of what the old one carried.
    pub fn set(
        &mut self,
        key: &str,
        value: String,
        options: &SetOptions,
    ) -> Result<SetReply, StoreError> {
        self.expire_if_due(key);
        let previous = match self.entries.get(key) {
            None => None,
            Some(Value::Str { data, expires_at }) => Some((data.clone(), *expires_at)),
            Some(_) => return Err(StoreError::WrongType),
        };

        let unmet = (options.nx && previous.is_some()) || (options.xx && previous.is_none());

        let reply = if options.get_previous {
            SetReply::Previous(previous.as_ref().map(|(data, _)| data.clone()))
        } else if unmet {
            SetReply::Nil
        } else {
            SetReply::Ok
        };

        if unmet {
            return Ok(reply);
        }

        let expires_at = if options.keep_ttl {
            previous.and_then(|(_, expiry)| expiry)
        } else {
            options.expires_at
        };

        self.entries.insert(
            key.to_string(),
            Value::Str {
                data: value,
                expires_at,
            },
        );

        Ok(reply)
    }

    /// Adds `delta` to the integer stored at `key`, creating the key with
    /// value `delta` when absent. The existing expiry is preserved.
    pub fn increment(&mut self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.expire_if_due(key);
        let entry = self.entries.entry(key.to_string()).or_insert(Value::Str {
            data: "0".to_string(),
            expires_at: None,
        });
        match entry {
            Value::Str { data, .. } => {
                let current = data.parse::<i64>().map_err(|_| StoreError::NotInteger)?;
                let next = current.checked_add(delta).ok_or(StoreError::Overflow)?;
                *data = next.to_string();
                Ok(next)
            }
            _ => Err(StoreError::WrongType),
        }
    }

    /// Appends `suffix` to the string at `key`, treating an absent key as
    /// the empty string. Returns the resulting length.
    pub fn append(&mut self, key: &str, suffix: &str) -> Result<usize, StoreError> {
        self.expire_if_due(key);
        let entry = self.entries.entry(key.to_string()).or_insert(Value::Str {
            data: String::new(),
            expires_at: None,
        });
        match entry {
            Value::Str { data, .. } => {
                data.push_str(suffix);
                Ok(data.len())
            }
            _ => Err(StoreError::WrongType),
        }
    }

    /// Installs every pair, unconditionally and without expiry. A single
    /// lock acquisition covers the whole batch because the caller holds the
    /// write guard for the duration of this call.
    pub fn mset(&mut self, pairs: Vec<(String, String)>) {
        for (key, value) in pairs {
            self.entries.insert(
                key,
                Value::Str {
                    data: value,
                    expires_at: None,
                },
            );
        }
    }

    /// Batch lookup. Keys that are absent, expired or hold a non-string
    /// value yield `None`.
    pub fn mget(&mut self, keys: &[String]) -> Vec<Option<String>> {
        keys.iter()
            .map(|key| match self.get(key) {
                Ok(Some((data, _))) => Some(data),
                _ => None,
            })
            .collect()
    }

    /// Remaining time to live in whole seconds: `-2` for an unknown key,
    /// `-1` for a key without expiry.
    pub fn ttl(&mut self, key: &str) -> i64 {
        self.expire_if_due(key);
        match self.entries.get(key) {
            None => -2,
            Some(Value::Str {
                expires_at: Some(deadline),
                ..
            }) => (deadline.as_millisecond() - Timestamp::now().as_millisecond()) / 1000,
            Some(_) => -1,
        }
    }

    /// Deletes the named keys, returning how many were actually removed.
    pub fn delete(&mut self, keys: &[String]) -> usize {
        let mut removed = 0;
        for key in keys {
            self.expire_if_due(key);
            if self.entries.remove(key.as_str()).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Counts how many of the named keys exist, counting duplicates once
    /// per occurrence.
    pub fn exists(&mut self, keys: &[String]) -> usize {
        let mut present = 0;
        for key in keys {
            self.expire_if_due(key);
            if self.entries.contains_key(key.as_str()) {
                present += 1;
            }
        }
        present
    }

    /// Returns every live key matching the compiled pattern, in
    /// unspecified order.
    pub fn keys_matching(&mut self, pattern: &Regex) -> Vec<String> {
        self.purge_expired();
        self.entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect()
    }

    /// Replaces the entire keyspace, used when loading a snapshot.
    pub fn replace_entries(&mut self, entries: HashMap<String, Value>) {
        self.entries = entries;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Translates a glob pattern into an anchored regular expression.
///
/// Every byte is quoted first, then the quoted glob operators (`?`, `*`,
/// `[`, `[^`, `]`) are unquoted, and the result is anchored with `^` and
/// `$`. An invalid pattern (for example an unterminated character class)
/// yields `None` and the caller treats it as matching nothing.
pub fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let translated = regex::escape(pattern)
        .replace("\\?", ".")
        .replace("\\*", ".*")
        .replace("\\[\\^", "[^")
        .replace("\\[", "[")
        .replace("\\]", "]")
        .replace("\\-", "-");

    Regex::new(&format!("^{}$", translated)).ok()
}
