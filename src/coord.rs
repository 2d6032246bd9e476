use core::fmt::{Display, Formatter};

/// Number of bits stored in one row word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Computes the number of words needed to hold `record_count` slots.
///
/// # Examples
/// ```
/// use data_matrix::word_count;
///
/// assert_eq!(word_count(0), 0);
/// assert_eq!(word_count(3), 1);
/// assert_eq!(word_count(64), 1);
/// assert_eq!(word_count(65), 2);
/// ```
pub const fn word_count(record_count: usize) -> usize {
    record_count.div_ceil(WORD_BITS)
}

/// The bit position of one id inside every row.
///
/// `word` selects the row word, `offset` is the 1-based bit position inside
/// that word (`1` is the least significant bit, `64` the most significant).
/// An offset of `0` never appears on a live coordinate.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    word: usize,
    offset: u8,
}

impl Coordinate {
    /// Creates a coordinate.
    ///
    /// # Panics
    /// Panics if `offset` is not within `1..=64`.
    #[inline]
    pub fn new(word: usize, offset: u8) -> Self {
        assert!(
            (1..=WORD_BITS as u8).contains(&offset),
            "Bit offset {offset} out of bounds"
        );
        Self { word, offset }
    }

    /// Coordinate of the `position`-th distinct id (0-based) out of `total`
    /// ids handed to a bulk initialization.
    ///
    /// Offsets descend from the top of each word as positions increase. The
    /// last word, when only partially filled, starts from its fill level
    /// instead of from 64.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::Coordinate;
    ///
    /// assert_eq!(Coordinate::from_position(0, 3), Coordinate::new(0, 3));
    /// assert_eq!(Coordinate::from_position(2, 3), Coordinate::new(0, 1));
    /// assert_eq!(Coordinate::from_position(0, 70), Coordinate::new(0, 64));
    /// assert_eq!(Coordinate::from_position(64, 70), Coordinate::new(1, 6));
    /// ```
    pub fn from_position(position: usize, total: usize) -> Self {
        debug_assert!(position < total);
        let word = position / WORD_BITS;
        let remainder = position % WORD_BITS;
        let partial = total % WORD_BITS;
        let is_last = word + 1 >= word_count(total);
        let offset = if is_last && partial != 0 {
            partial - remainder
        } else {
            WORD_BITS - remainder
        };
        Self {
            word,
            offset: offset as u8,
        }
    }

    /// Index of the word inside a row.
    #[inline]
    pub const fn word(&self) -> usize {
        self.word
    }

    /// 1-based bit position inside the word.
    #[inline]
    pub const fn offset(&self) -> u8 {
        self.offset
    }

    /// The same coordinate one bit higher, used when the last word makes room
    /// at offset 1.
    #[inline]
    pub(crate) fn shifted_up(self) -> Self {
        debug_assert!((self.offset as usize) < WORD_BITS);
        Self {
            word: self.word,
            offset: self.offset + 1,
        }
    }

    /// The single-bit mask selecting this coordinate inside its word.
    #[inline]
    pub const fn mask(&self) -> u64 {
        1u64 << (self.offset - 1)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{} {}]", self.word, self.offset)
    }
}
