use core::fmt::{Debug, Formatter};
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use crate::coord::{Coordinate, WORD_BITS};

/// A bit row: one bit per coordinate, stored in `u64` words.
///
/// Rows handed out by [`DataMatrix`] are copies, never views into the
/// matrix, so they may be freely mutated and combined.
///
/// Binary operations between rows of different widths only cover the
/// common prefix of both rows; the wider tail is dropped.
///
/// [`DataMatrix`]: crate::DataMatrix
#[derive(PartialEq, Eq, Hash, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row(pub(crate) Vec<u64>);

impl Row {
    /// Creates a row of `words` all-zero words.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::Row;
    ///
    /// let row = Row::zeroed(2);
    /// assert_eq!(row.len(), 2);
    /// assert!(!row.any());
    /// ```
    pub fn zeroed(words: usize) -> Self {
        Self(vec![0u64; words])
    }

    /// Wraps raw words into a row.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::Row;
    ///
    /// let row = Row::from_words(vec![0b101, 0]);
    /// assert_eq!(row.popcount(), 2);
    /// ```
    pub fn from_words(words: Vec<u64>) -> Self {
        Self(words)
    }

    /// The words of this row.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.0
    }

    /// Consumes the row and returns its words.
    #[inline]
    pub fn into_words(self) -> Vec<u64> {
        self.0
    }

    /// Number of words in the row.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the row has no words at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets the bit at `coord`.
    ///
    /// Coordinates beyond the row width are ignored.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::{Coordinate, Row};
    ///
    /// let mut row = Row::zeroed(1);
    /// row.set(Coordinate::new(0, 3));
    /// assert_eq!(row.words(), &[0b100]);
    /// ```
    #[inline]
    pub fn set(&mut self, coord: Coordinate) {
        if let Some(word) = self.0.get_mut(coord.word()) {
            *word |= coord.mask();
        }
    }

    /// Unsets the bit at `coord`.
    ///
    /// Coordinates beyond the row width are ignored.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::{Coordinate, Row};
    ///
    /// let mut row = Row::from_words(vec![0b110]);
    /// row.unset(Coordinate::new(0, 2));
    /// assert_eq!(row.words(), &[0b100]);
    /// ```
    #[inline]
    pub fn unset(&mut self, coord: Coordinate) {
        if let Some(word) = self.0.get_mut(coord.word()) {
            *word &= !coord.mask();
        }
    }

    /// Returns `true` if the bit at `coord` is set.
    ///
    /// A coordinate beyond the row width reads as unset.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::{Coordinate, Row};
    ///
    /// let row = Row::from_words(vec![0b1]);
    /// assert!(row.is_set(Coordinate::new(0, 1)));
    /// assert!(!row.is_set(Coordinate::new(0, 2)));
    /// assert!(!row.is_set(Coordinate::new(5, 1)));
    /// ```
    #[inline]
    pub fn is_set(&self, coord: Coordinate) -> bool {
        self.0
            .get(coord.word())
            .is_some_and(|word| word & coord.mask() != 0)
    }

    /// Returns `true` if any bit in the row is set.
    #[inline]
    pub fn any(&self) -> bool {
        self.0.iter().any(|w| *w != 0)
    }

    /// Returns the number of set bits in the row.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::Row;
    ///
    /// let row = Row::from_words(vec![0b1011, u64::MAX]);
    /// assert_eq!(row.popcount(), 67);
    /// ```
    #[inline]
    pub fn popcount(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Appends one all-zero word.
    #[inline]
    pub(crate) fn push_word(&mut self) {
        self.0.push(0);
    }

    /// Shifts the last word left by one bit, freeing offset 1.
    #[inline]
    pub(crate) fn shift_last_word_left(&mut self) {
        if let Some(last) = self.0.last_mut() {
            *last <<= 1;
        }
    }

    /// Returns a new row holding the bitwise AND of `self` and `other`,
    /// truncated to the shorter of the two.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::Row;
    ///
    /// let a = Row::from_words(vec![0b1100, 0b1]);
    /// let b = Row::from_words(vec![0b1010]);
    /// assert_eq!(a.bit_and(&b), Row::from_words(vec![0b1000]));
    /// ```
    #[inline]
    pub fn bit_and(&self, other: &Self) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a & b).collect())
    }

    /// Performs an in-place bitwise AND with another row.
    ///
    /// `self` is truncated to the common prefix of both rows.
    #[inline]
    pub fn in_place_bit_and(&mut self, other: &Self) {
        self.0.truncate(other.0.len());
        for (self_word, other_word) in self.0.iter_mut().zip(other.0.iter()) {
            *self_word &= other_word
        }
    }

    /// Returns a new row holding the bitwise OR of `self` and `other`,
    /// truncated to the shorter of the two.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::Row;
    ///
    /// let a = Row::from_words(vec![0b1100, 0b1]);
    /// let b = Row::from_words(vec![0b1010]);
    /// assert_eq!(a.bit_or(&b), Row::from_words(vec![0b1110]));
    /// ```
    #[inline]
    pub fn bit_or(&self, other: &Self) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a | b).collect())
    }

    /// Performs an in-place bitwise OR with another row.
    ///
    /// `self` is truncated to the common prefix of both rows.
    #[inline]
    pub fn in_place_bit_or(&mut self, other: &Self) {
        self.0.truncate(other.0.len());
        for (self_word, other_word) in self.0.iter_mut().zip(other.0.iter()) {
            *self_word |= other_word
        }
    }
}

impl From<Vec<u64>> for Row {
    fn from(words: Vec<u64>) -> Self {
        Self(words)
    }
}

impl AsRef<[u64]> for Row {
    fn as_ref(&self) -> &[u64] {
        &self.0
    }
}

impl Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "MSB -> ")?;
        for (i, word) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{i}: {word:0width$b}", width = WORD_BITS)?;
        }
        write!(f, " <- LSB")?;
        Ok(())
    }
}

impl BitAnd for &Row {
    type Output = Row;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.bit_and(rhs)
    }
}

impl BitAndAssign<&Row> for Row {
    fn bitand_assign(&mut self, rhs: &Row) {
        self.in_place_bit_and(rhs)
    }
}

impl BitOr for &Row {
    type Output = Row;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.bit_or(rhs)
    }
}

impl BitOrAssign<&Row> for Row {
    fn bitor_assign(&mut self, rhs: &Row) {
        self.in_place_bit_or(rhs)
    }
}
