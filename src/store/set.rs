//! The set engine: unordered collections with unique membership and the
//! usual algebra. Sets follow the same lifecycle rule as lists: an
//! operation that empties a set removes the entry and its tag in the same
//! step.

use std::collections::HashSet;

use super::{Store, StoreError, Value};

impl Store {
    fn check_set(&self, key: &str) -> Result<(), StoreError> {
        match self.entries.get(key) {
            None | Some(Value::Set(_)) => Ok(()),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Adds members, creating the set on demand. Returns how many were
    /// newly added across the whole call.
    pub fn sadd(&mut self, key: &str, members: Vec<String>) -> Result<usize, StoreError> {
        self.check_set(key)?;
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Set(HashSet::new()));
        let Value::Set(set) = entry else {
            return Err(StoreError::WrongType);
        };

        Ok(members
            .into_iter()
            .filter(|member| set.insert(member.clone()))
            .count())
    }

    /// Removes members, returning how many were present. Drops the set
    /// when it becomes empty.
    pub fn srem(&mut self, key: &str, members: &[String]) -> Result<usize, StoreError> {
        self.check_set(key)?;
        let Some(Value::Set(set)) = self.entries.get_mut(key) else {
            return Ok(0);
        };

        let removed = members
            .iter()
            .filter(|member| set.remove(member.as_str()))
            .count();
        if set.is_empty() {
            self.entries.remove(key);
        }

        Ok(removed)
    }

    pub fn sismember(&mut self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.check_set(key)?;
        match self.entries.get(key) {
            Some(Value::Set(set)) => Ok(set.contains(member)),
            _ => Ok(false),
        }
    }

    pub fn scard(&mut self, key: &str) -> Result<usize, StoreError> {
        self.check_set(key)?;
        match self.entries.get(key) {
            Some(Value::Set(set)) => Ok(set.len()),
            _ => Ok(0),
        }
    }

    /// All members, in unspecified order.
    pub fn smembers(&mut self, key: &str) -> Result<Vec<String>, StoreError> {
        self.check_set(key)?;
        match self.entries.get(key) {
            Some(Value::Set(set)) => Ok(set.iter().cloned().collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// Union over any number of keys; absent keys contribute nothing.
    pub fn sunion(&mut self, keys: &[String]) -> Result<Vec<String>, StoreError> {
        let mut union = HashSet::new();
        for key in keys {
            self.check_set(key)?;
            if let Some(Value::Set(set)) = self.entries.get(key.as_str()) {
                union.extend(set.iter().cloned());
            }
        }
        Ok(union.into_iter().collect())
    }

    /// Intersection over any number of keys; one absent key empties the
    /// result, but every named key is still type-checked.
    pub fn sinter(&mut self, keys: &[String]) -> Result<Vec<String>, StoreError> {
        for key in keys {
            self.check_set(key)?;
        }

        let Some((first, rest)) = keys.split_first() else {
            return Ok(Vec::new());
        };
        let mut intersection: HashSet<String> = match self.entries.get(first.as_str()) {
            Some(Value::Set(set)) => set.clone(),
            _ => return Ok(Vec::new()),
        };
        for key in rest {
            match self.entries.get(key.as_str()) {
                Some(Value::Set(set)) => intersection.retain(|member| set.contains(member)),
                _ => return Ok(Vec::new()),
            }
        }

        Ok(intersection.into_iter().collect())
    }

    /// Moves `member` from `src` to `dst`, creating the destination on
    /// demand. Returns whether the member was present in the source.
    pub fn smove(&mut self, src: &str, dst: &str, member: &str) -> Result<bool, StoreError> {
        self.check_set(src)?;
        self.check_set(dst)?;

        let Some(Value::Set(source)) = self.entries.get_mut(src) else {
            return Ok(false);
        };
        if !source.remove(member) {
            return Ok(false);
        }
        if source.is_empty() {
            self.entries.remove(src);
        }

        let entry = self
            .entries
            .entry(dst.to_string())
            .or_insert_with(|| Value::Set(HashSet::new()));
        if let Value::Set(destination) = entry {
            destination.insert(member.to_string());
        }

        Ok(true)
    }
}
