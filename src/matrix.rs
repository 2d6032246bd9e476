use core::any::Any;
use core::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use tracing::debug;

use crate::algebra::{EmptyPolicy, Fold};
use crate::coord::Coordinate;
use crate::error::{HandlerError, MatrixError, Result};
use crate::index::{IdIndex, Slot};
use crate::row::Row;
use crate::stopwatch::Stopwatch;
use crate::store::RowStore;

type Handler = Arc<dyn Fn(&dyn Any) -> core::result::Result<(), HandlerError> + Send + Sync>;

#[derive(Default, Debug)]
struct State {
    name: String,
    created_at: Option<SystemTime>,
    index: IdIndex,
    store: RowStore,
}

impl State {
    fn add_point(&mut self, id: i64) {
        let Some(slot) = self.index.allocate(id) else {
            return;
        };
        match slot {
            Slot::Reused(_) => {}
            Slot::Appended(coord) => {
                self.store.widen();
                debug!(id, %coord, width = self.store.width(), "rows widened");
            }
            Slot::Shifted(coord) => {
                self.store.shift_last_word();
                debug!(id, %coord, "last word shifted");
            }
        }
    }

    fn remove_point(&mut self, id: i64) {
        if let Some(coord) = self.index.remove(id) {
            self.store.clear_everywhere(coord);
        }
    }

    fn turn_off_everywhere(&mut self, id: i64) {
        if let Some(coord) = self.index.coordinate(id) {
            self.store.clear_everywhere(coord);
        }
    }
}

/// An in-memory bitmap index.
///
/// Each record id owns one bit coordinate. Rows, addressed by `u64` row
/// keys, hold one bit per id; rows are combined with AND/OR and resolved
/// back into ids.
///
/// All state sits behind one reader/writer lock. Mutations hold the write
/// side for the whole call, batch forms included; reads share the read
/// side. Operations on unknown ids or row keys do nothing.
///
/// # Examples
/// ```
/// use data_matrix::{DataMatrix, EmptyPolicy};
///
/// let matrix = DataMatrix::new();
/// matrix.init("butterflies", [1, 2, 3, 4]);
///
/// let asia = matrix.light_up(1, 0);
/// matrix.light_up(3, asia);
/// let long_lived = matrix.light_up(3, 0);
/// matrix.light_up(4, long_lived);
///
/// let both = matrix.and_reduce(&[asia, long_lived], EmptyPolicy::SkipMissing);
/// assert_eq!(matrix.resolve_ids(&both), vec![3]);
/// let either = matrix.or_reduce(&[asia, long_lived], EmptyPolicy::SkipMissing);
/// assert_eq!(matrix.resolve_ids(&either), vec![1, 3, 4]);
/// ```
#[derive(Default)]
pub struct DataMatrix {
    state: RwLock<State>,
    handler: RwLock<Option<Handler>>,
    stopwatch: Stopwatch,
}

impl DataMatrix {
    /// Creates an empty, uninitialized matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty matrix with a custom handler already configured.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&dyn Any) -> core::result::Result<(), HandlerError> + Send + Sync + 'static,
    {
        let matrix = Self::new();
        matrix.set_handler(handler);
        matrix
    }

    /// Rebuilds the id index from `ids`.
    ///
    /// Duplicates are dropped, keeping the first occurrence. All stored rows
    /// and holes are discarded; the row-key counter is kept. With no ids the
    /// matrix stays empty and [`add_point`](Self::add_point) has no effect.
    pub fn init<I>(&self, name: impl Into<String>, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        let mut state = self.state.write();
        state.name = name.into();
        let width = state.index.rebuild(ids);
        state.store.reset(width);
        if state.index.record_count() > 0 {
            state.created_at = Some(SystemTime::now());
        }
        debug!(
            name = %state.name,
            ids = state.index.record_count(),
            width,
            "matrix initialized"
        );
    }

    /// Name given to the last [`init`](Self::init).
    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    /// When the last non-empty [`init`](Self::init) ran.
    pub fn created_at(&self) -> Option<SystemTime> {
        self.state.read().created_at
    }

    /// Allocates a new row key.
    ///
    /// Keys start at 1 and increase by one. Once `u64::MAX` is reached every
    /// further call returns `u64::MAX` again, so the returned key may already
    /// be in use.
    pub fn allocate_row_key(&self) -> u64 {
        self.state.write().store.allocate_key()
    }

    /// The most recently allocated row key, `0` if none was allocated.
    pub fn current_row_key(&self) -> u64 {
        self.state.read().store.last_key()
    }

    #[cfg(test)]
    pub(crate) fn seed_row_key(&self, key: u64) {
        self.state.write().store.set_last_key(key);
    }

    /// Deletes the row stored under `key`. The id index is untouched.
    pub fn release_row_key(&self, key: u64) {
        self.state.write().store.release(key);
    }

    /// Deletes the rows stored under every key in `keys`.
    pub fn release_row_keys<I>(&self, keys: I)
    where
        I: IntoIterator<Item = u64>,
    {
        let mut state = self.state.write();
        for key in keys {
            state.store.release(key);
        }
    }

    /// Sets the bit of `id` in the row under `key` and returns the key.
    ///
    /// A `key` of `0` allocates a fresh key. A missing row is created from
    /// the all-zero default, even when `id` is unknown.
    pub fn light_up(&self, id: i64, key: u64) -> u64 {
        let mut state = self.state.write();
        let coord = state.index.coordinate(id);
        state.store.light_up(key, coord)
    }

    /// Sets bits for every `(id, keys)` pair, touching only rows that
    /// already exist. Unknown ids and missing rows are skipped.
    pub fn light_up_batch<I, K>(&self, batch: I)
    where
        I: IntoIterator<Item = (i64, K)>,
        K: IntoIterator<Item = u64>,
    {
        let mut state = self.state.write();
        for (id, keys) in batch {
            let Some(coord) = state.index.coordinate(id) else {
                continue;
            };
            for key in keys {
                state.store.light_up_existing(key, coord);
            }
        }
    }

    /// Clears the bit of `id` in the row under `key`, if both exist.
    pub fn turn_off(&self, id: i64, key: u64) {
        let mut state = self.state.write();
        if let Some(coord) = state.index.coordinate(id) {
            state.store.turn_off(key, coord);
        }
    }

    /// Clears bits for every `(id, keys)` pair.
    pub fn turn_off_batch<I, K>(&self, batch: I)
    where
        I: IntoIterator<Item = (i64, K)>,
        K: IntoIterator<Item = u64>,
    {
        let mut state = self.state.write();
        for (id, keys) in batch {
            let Some(coord) = state.index.coordinate(id) else {
                continue;
            };
            for key in keys {
                state.store.turn_off(key, coord);
            }
        }
    }

    /// Clears the bit of each id in every stored row. The ids stay live.
    pub fn turn_off_by_ids<I>(&self, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        let mut state = self.state.write();
        for id in ids {
            state.turn_off_everywhere(id);
        }
    }

    /// Gives `id` a coordinate.
    ///
    /// Coordinates freed by removal are reused oldest first. Otherwise the
    /// id takes offset 1 of the last word, shifting the ids already there up
    /// by one, or opens a new word when the last one is full.
    ///
    /// Does nothing if `id` is already present or the matrix was never
    /// initialized with at least one id.
    pub fn add_point(&self, id: i64) {
        self.state.write().add_point(id);
    }

    /// [`add_point`](Self::add_point) for each id under a single lock.
    pub fn add_points<I>(&self, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        let mut state = self.state.write();
        for id in ids {
            state.add_point(id);
        }
    }

    /// Removes `id`, clearing its bit in every stored row and keeping its
    /// coordinate for reuse.
    pub fn remove_point(&self, id: i64) {
        self.state.write().remove_point(id);
    }

    /// [`remove_point`](Self::remove_point) for each id under a single lock.
    pub fn remove_points<I>(&self, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        let mut state = self.state.write();
        for id in ids {
            state.remove_point(id);
        }
    }

    /// A copy of the row under `key` and whether it was stored.
    ///
    /// Without a stored row this is a copy of the all-zero default row.
    pub fn get_row(&self, key: u64) -> (Row, bool) {
        self.state.read().store.get(key)
    }

    /// AND of the rows under `keys`.
    ///
    /// See [`EmptyPolicy`] for how keys without a stored row are handled.
    /// Returns an empty row if no row took part.
    pub fn and_reduce(&self, keys: &[u64], policy: EmptyPolicy) -> Row {
        self.state.read().store.reduce(keys, Fold::And, policy)
    }

    /// OR of the rows under `keys`.
    ///
    /// See [`EmptyPolicy`] for how keys without a stored row are handled.
    /// Returns an empty row if no row took part.
    pub fn or_reduce(&self, keys: &[u64], policy: EmptyPolicy) -> Row {
        self.state.read().store.reduce(keys, Fold::Or, policy)
    }

    /// Every live id whose bit is set in `row`, in ascending order.
    ///
    /// Runs in time linear to the number of live ids.
    pub fn resolve_ids(&self, row: impl AsRef<[u64]>) -> Vec<i64> {
        let row = row.as_ref();
        if row.is_empty() {
            return Vec::new();
        }
        self.state.read().index.resolve(row)
    }

    /// Current coordinate of `id`, if it is live.
    pub fn coordinate(&self, id: i64) -> Option<Coordinate> {
        self.state.read().index.coordinate(id)
    }

    /// Number of slots ever allocated. Removal does not decrease it.
    pub fn record_count(&self) -> usize {
        self.state.read().index.record_count()
    }

    /// Number of live ids.
    pub fn len(&self) -> usize {
        self.state.read().index.len()
    }

    /// Returns `true` if no id is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of words in every row.
    pub fn width(&self) -> usize {
        self.state.read().store.width()
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.state.read().store.row_count()
    }

    /// Configures the custom handler, replacing any previous one.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&dyn Any) -> core::result::Result<(), HandlerError> + Send + Sync + 'static,
    {
        *self.handler.write() = Some(Arc::new(handler));
    }

    /// Removes the custom handler.
    pub fn clear_handler(&self) {
        *self.handler.write() = None;
    }

    /// Forwards `value` to the custom handler.
    ///
    /// The handler runs without any matrix lock held, so it may call back
    /// into the matrix.
    ///
    /// # Errors
    /// [`MatrixError::HandlerNotConfigured`] if no handler is set,
    /// [`MatrixError::Handler`] if the handler fails.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::{DataMatrix, MatrixError};
    ///
    /// let matrix = DataMatrix::new();
    /// assert!(matches!(matrix.handle(&1), Err(MatrixError::HandlerNotConfigured)));
    ///
    /// matrix.set_handler(|value| match value.downcast_ref::<i32>() {
    ///     Some(_) => Ok(()),
    ///     None => Err("expected an i32".into()),
    /// });
    /// assert!(matrix.handle(&1i32).is_ok());
    /// assert!(matches!(matrix.handle(&"x"), Err(MatrixError::Handler(_))));
    /// ```
    pub fn handle(&self, value: &dyn Any) -> Result<()> {
        let handler = self
            .handler
            .read()
            .clone()
            .ok_or(MatrixError::HandlerNotConfigured)?;
        (*handler)(value).map_err(MatrixError::Handler)
    }

    /// Records a start mark for [`mark_finish`](Self::mark_finish).
    pub fn mark_start(&self) {
        self.stopwatch.mark_start();
    }

    /// Microseconds since the last [`mark_start`](Self::mark_start).
    pub fn mark_finish(&self) -> u64 {
        self.stopwatch.mark_finish()
    }
}

/// Multi-line diagnostic dump. Not a stable format.
impl Display for DataMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let state = self.state.read();
        writeln!(f, "name: {}", state.name)?;
        writeln!(f, "records: {}", state.index.record_count())?;
        writeln!(f, "max row key: {}", state.store.last_key())?;
        writeln!(f, "default row:")?;
        writeln!(f, "\t{:?}", state.store.default_row().words())?;
        writeln!(f, "ids:")?;
        for (id, coord) in state.index.live() {
            writeln!(f, "\tid: {id} / coordinate: {coord}")?;
        }
        writeln!(f, "removed:")?;
        for (id, coord) in state.index.holes() {
            writeln!(f, "\tid: {id} / coordinate: {coord}")?;
        }
        writeln!(f, "rows:")?;
        for (key, row) in state.store.rows() {
            writeln!(f, "\tkey: {key} / words: {:?}", row.words())?;
        }
        Ok(())
    }
}
