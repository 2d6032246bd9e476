use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::coord::{Coordinate, WORD_BITS, word_count};

/// Where [`IdIndex::allocate`] placed a new id, and what the rows must do
/// to stay in step.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Slot {
    /// A hole left by a removed id was handed over; rows are untouched.
    Reused(Coordinate),
    /// The last word was full; every row gains one zero word.
    Appended(Coordinate),
    /// The last word had room; every row shifts its last word left by one.
    Shifted(Coordinate),
}

impl Slot {
    pub(crate) fn coordinate(&self) -> Coordinate {
        match *self {
            Slot::Reused(coord) | Slot::Appended(coord) | Slot::Shifted(coord) => coord,
        }
    }
}

/// Maps record ids to their coordinates and tracks holes for reuse.
#[derive(Default, Debug)]
pub(crate) struct IdIndex {
    coords: FxHashMap<i64, Coordinate>,
    // Oldest removal first.
    removed: VecDeque<(i64, Coordinate)>,
    record_count: usize,
}

impl IdIndex {
    /// Replaces the whole index with `ids`, deduplicated in first-seen order.
    ///
    /// Returns the number of words rows need to hold every id.
    pub(crate) fn rebuild<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = i64>,
    {
        let mut seen = FxHashSet::default();
        let unique: Vec<i64> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        let total = unique.len();

        self.coords = unique
            .into_iter()
            .enumerate()
            .map(|(position, id)| (id, Coordinate::from_position(position, total)))
            .collect();
        self.removed.clear();
        self.record_count = total;

        word_count(total)
    }

    /// Gives `id` a coordinate, reusing a hole when one is available.
    ///
    /// Returns `None` if the index holds no slots yet or `id` is already
    /// present.
    pub(crate) fn allocate(&mut self, id: i64) -> Option<Slot> {
        if self.record_count == 0 || self.coords.contains_key(&id) {
            return None;
        }

        if let Some((previous, coord)) = self.removed.pop_front() {
            debug!(id, previous, %coord, "reusing removed coordinate");
            self.coords.insert(id, coord);
            return Some(Slot::Reused(coord));
        }

        let last_word = word_count(self.record_count) - 1;
        let slot = if self.record_count % WORD_BITS == 0 {
            Slot::Appended(Coordinate::new(last_word + 1, 1))
        } else {
            for coord in self.coords.values_mut() {
                if coord.word() == last_word {
                    *coord = coord.shifted_up();
                }
            }
            Slot::Shifted(Coordinate::new(last_word, 1))
        };

        self.coords.insert(id, slot.coordinate());
        self.record_count += 1;
        Some(slot)
    }

    /// Drops `id` from the index and remembers its coordinate as a hole.
    pub(crate) fn remove(&mut self, id: i64) -> Option<Coordinate> {
        let coord = self.coords.remove(&id)?;
        self.removed.push_back((id, coord));
        Some(coord)
    }

    #[inline]
    pub(crate) fn coordinate(&self, id: i64) -> Option<Coordinate> {
        self.coords.get(&id).copied()
    }

    /// Every live id whose bit is set in `row`, in ascending order.
    pub(crate) fn resolve(&self, row: &[u64]) -> Vec<i64> {
        if row.is_empty() {
            return Vec::new();
        }
        let mut ids: Vec<i64> = self
            .coords
            .iter()
            .filter(|(_, coord)| {
                row.get(coord.word())
                    .is_some_and(|word| word & coord.mask() != 0)
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    #[inline]
    pub(crate) fn record_count(&self) -> usize {
        self.record_count
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.coords.len()
    }

    /// Live ids with their coordinates, sorted by id.
    pub(crate) fn live(&self) -> Vec<(i64, Coordinate)> {
        let mut live: Vec<_> = self.coords.iter().map(|(id, c)| (*id, *c)).collect();
        live.sort_unstable();
        live
    }

    /// Holes in reuse order, with the id that last owned each.
    pub(crate) fn holes(&self) -> impl Iterator<Item = &(i64, Coordinate)> {
        self.removed.iter()
    }
}
