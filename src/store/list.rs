//! The list engine.
//!
//! Lists are double-ended sequences supporting O(1) push and pop at both
//! ends. A list never exists empty: whichever operation drains the last
//! element also removes the entry and its tag in the same critical
//! section. Pushes hand elements straight to parked waiters before the
//! lock is released (see [`super::blocking`]).

use std::collections::VecDeque;

use super::blocking::PopEnd;
use super::{Store, StoreError, Value};

impl Store {
    /// Fails with `WrongType` when `key` holds a non-list value.
    pub(crate) fn check_list(&self, key: &str) -> Result<(), StoreError> {
        match self.entries.get(key) {
            None | Some(Value::List(_)) => Ok(()),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Pushes `values` onto one end of the list at `key` in argument
    /// order, creating the list on demand. Parked waiters are then served
    /// head-of-queue first, one element each. Returns the list length
    /// right after the push.
    pub fn push(
        &mut self,
        key: &str,
        end: PopEnd,
        values: Vec<String>,
    ) -> Result<usize, StoreError> {
        self.check_list(key)?;
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::List(VecDeque::new()));
        let Value::List(list) = entry else {
            return Err(StoreError::WrongType);
        };

        for value in values {
            match end {
                PopEnd::Left => list.push_front(value),
                PopEnd::Right => list.push_back(value),
            }
        }
        let length = list.len();

        self.drain_waiters(key);

        Ok(length)
    }

    /// Pops one element, dropping the list when it becomes empty.
    pub fn pop(&mut self, key: &str, end: PopEnd) -> Result<Option<String>, StoreError> {
        self.check_list(key)?;
        let Some(Value::List(list)) = self.entries.get_mut(key) else {
            return Ok(None);
        };

        let popped = match end {
            PopEnd::Left => list.pop_front(),
            PopEnd::Right => list.pop_back(),
        };
        if list.is_empty() {
            self.entries.remove(key);
        }

        Ok(popped)
    }

    /// Pops up to `count` elements, returning them in pop order. `None`
    /// means the list does not exist.
    pub fn pop_count(
        &mut self,
        key: &str,
        end: PopEnd,
        count: usize,
    ) -> Result<Option<Vec<String>>, StoreError> {
        self.check_list(key)?;
        let Some(Value::List(list)) = self.entries.get_mut(key) else {
            return Ok(None);
        };

        let take = count.min(list.len());
        let mut popped = Vec::with_capacity(take);
        for _ in 0..take {
            let element = match end {
                PopEnd::Left => list.pop_front(),
                PopEnd::Right => list.pop_back(),
            };
            if let Some(element) = element {
                popped.push(element);
            }
        }
        if list.is_empty() {
            self.entries.remove(key);
        }

        Ok(Some(popped))
    }

    pub fn list_len(&self, key: &str) -> Result<usize, StoreError> {
        self.check_list(key)?;
        match self.entries.get(key) {
            Some(Value::List(list)) => Ok(list.len()),
            _ => Ok(0),
        }
    }

    /// Returns the inclusive sub-range, with negative indices counted
    /// from the tail and the end clamped to the last element.
    pub fn list_range(
        &mut self,
        key: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<String>, StoreError> {
        self.check_list(key)?;
        let Some(Value::List(list)) = self.entries.get(key) else {
            return Ok(Vec::new());
        };

        let Some((from, to)) = normalize_range(list.len(), start, end) else {
            return Ok(Vec::new());
        };

        Ok(list
            .iter()
            .skip(from)
            .take(to - from + 1)
            .cloned()
            .collect())
    }

    /// Retains only the given sub-range, deleting the key when the range
    /// is empty.
    pub fn list_trim(&mut self, key: &str, start: i64, end: i64) -> Result<(), StoreError> {
        self.check_list(key)?;
        let Some(Value::List(list)) = self.entries.get_mut(key) else {
            return Ok(());
        };

        match normalize_range(list.len(), start, end) {
            Some((from, to)) => {
                let kept: VecDeque<String> =
                    list.iter().skip(from).take(to - from + 1).cloned().collect();
                *list = kept;
            }
            None => {
                self.entries.remove(key);
            }
        }

        Ok(())
    }

    /// Pops one element from `src_end` of `src` and pushes it onto
    /// `dst_end` of `dst`, creating the destination on demand. Returns the
    /// moved element, or `None` when the source is absent.
    pub fn move_element(
        &mut self,
        src: &str,
        dst: &str,
        src_end: PopEnd,
        dst_end: PopEnd,
    ) -> Result<Option<String>, StoreError> {
        self.check_list(src)?;
        self.check_list(dst)?;

        let Some(element) = self.pop(src, src_end)? else {
            return Ok(None);
        };
        self.push(dst, dst_end, vec![element.clone()])?;

        Ok(Some(element))
    }
}

/// Normalizes an inclusive `[start, end]` range against a list of `len`
/// elements. Returns `None` when the range selects nothing.
fn normalize_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let mut from = if start < 0 { len + start } else { start };
    let mut to = if end < 0 { len + end } else { end };

    if from < 0 {
        from = 0;
    }
    if to >= len {
        to = len - 1;
    }
    if from >= len || from > to {
        return None;
    }

    Some((from as usize, to as usize))
}
