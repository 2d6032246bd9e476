use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::algebra::{self, EmptyPolicy, Fold};
use crate::coord::Coordinate;
use crate::row::Row;

/// Row keys addressed by callers, their rows, and the all-zero template new
/// rows are copied from.
///
/// Nothing here locks. Every method runs inside the guard held by
/// [`DataMatrix`](crate::DataMatrix).
#[derive(Default, Debug)]
pub(crate) struct RowStore {
    default_row: Row,
    rows: FxHashMap<u64, Row>,
    last_key: u64,
}

impl RowStore {
    /// Drops every row and resizes the template to `words` zero words.
    ///
    /// The row-key counter keeps running.
    pub(crate) fn reset(&mut self, words: usize) {
        self.default_row = Row::zeroed(words);
        self.rows.clear();
    }

    /// Hands out the next row key, saturating at `u64::MAX`.
    pub(crate) fn allocate_key(&mut self) -> u64 {
        if self.last_key == u64::MAX {
            warn!(key = self.last_key, "row keys exhausted, returning saturated key");
            return self.last_key;
        }
        self.last_key += 1;
        self.last_key
    }

    #[cfg(test)]
    pub(crate) fn set_last_key(&mut self, key: u64) {
        self.last_key = key;
    }

    #[inline]
    pub(crate) fn last_key(&self) -> u64 {
        self.last_key
    }

    /// Materializes the row for `key` from the template if needed and sets
    /// `coord` in it.
    ///
    /// A key of `0` allocates a fresh key first. Returns the resolved key.
    pub(crate) fn light_up(&mut self, key: u64, coord: Option<Coordinate>) -> u64 {
        let key = if key == 0 { self.allocate_key() } else { key };
        let row = self
            .rows
            .entry(key)
            .or_insert_with(|| self.default_row.clone());
        if let Some(coord) = coord {
            trace!(key, %coord, "light up");
            row.set(coord);
        }
        key
    }

    /// Sets `coord` in the row for `key` only if that row already exists.
    pub(crate) fn light_up_existing(&mut self, key: u64, coord: Coordinate) {
        if let Some(row) = self.rows.get_mut(&key) {
            trace!(key, %coord, "light up");
            row.set(coord);
        }
    }

    pub(crate) fn turn_off(&mut self, key: u64, coord: Coordinate) {
        if let Some(row) = self.rows.get_mut(&key) {
            trace!(key, %coord, "turn off");
            row.unset(coord);
        }
    }

    /// Clears `coord` in every stored row.
    pub(crate) fn clear_everywhere(&mut self, coord: Coordinate) {
        for row in self.rows.values_mut() {
            row.unset(coord);
        }
    }

    /// Appends one zero word to the template and to every stored row.
    pub(crate) fn widen(&mut self) {
        self.default_row.push_word();
        for row in self.rows.values_mut() {
            row.push_word();
        }
    }

    /// Shifts the last word of every stored row left by one bit.
    ///
    /// The template is all zero and needs no shift.
    pub(crate) fn shift_last_word(&mut self) {
        for row in self.rows.values_mut() {
            row.shift_last_word_left();
        }
    }

    pub(crate) fn release(&mut self, key: u64) -> bool {
        self.rows.remove(&key).is_some()
    }

    /// A copy of the row for `key`, or of the template if none is stored.
    pub(crate) fn get(&self, key: u64) -> (Row, bool) {
        match self.rows.get(&key) {
            Some(row) => (row.clone(), true),
            None => (self.default_row.clone(), false),
        }
    }

    pub(crate) fn reduce(&self, keys: &[u64], fold: Fold, policy: EmptyPolicy) -> Row {
        algebra::reduce(keys.iter().map(|key| self.rows.get(key)), fold, policy)
    }

    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.default_row.len()
    }

    #[inline]
    pub(crate) fn default_row(&self) -> &Row {
        &self.default_row
    }

    /// Stored rows sorted by key.
    pub(crate) fn rows(&self) -> Vec<(u64, &Row)> {
        let mut rows: Vec<_> = self.rows.iter().map(|(key, row)| (*key, row)).collect();
        rows.sort_unstable_by_key(|(key, _)| *key);
        rows
    }

    #[inline]
    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }
}
