use crate::row::Row;

/// What a multi-row reduction does with a row key that has no stored row.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmptyPolicy {
    /// Missing rows are skipped; the reduction continues with the rest.
    #[default]
    SkipMissing,
    /// A single missing row makes the whole reduction empty.
    ShortCircuit,
}

/// Word-wise AND of two rows over their common prefix.
///
/// Returns the combined row and whether any bit survived. An empty input on
/// either side yields an empty row and `false`.
///
/// # Examples
/// ```
/// use data_matrix::bit_and;
///
/// let (row, hit) = bit_and(&[0b0110, 0b1], &[0b0011]);
/// assert_eq!(row.words(), &[0b0010]);
/// assert!(hit);
///
/// let (row, hit) = bit_and(&[0b1], &[]);
/// assert!(row.is_empty());
/// assert!(!hit);
/// ```
pub fn bit_and(a: &[u64], b: &[u64]) -> (Row, bool) {
    combine(a, b, |x, y| x & y)
}

/// Word-wise OR of two rows over their common prefix.
///
/// Returns the combined row and whether any bit is set. An empty input on
/// either side yields an empty row and `false`.
///
/// # Examples
/// ```
/// use data_matrix::bit_or;
///
/// let (row, hit) = bit_or(&[0b0100], &[0b0001, 0b1]);
/// assert_eq!(row.words(), &[0b0101]);
/// assert!(hit);
/// ```
pub fn bit_or(a: &[u64], b: &[u64]) -> (Row, bool) {
    combine(a, b, |x, y| x | y)
}

#[inline]
fn combine(a: &[u64], b: &[u64], op: impl Fn(u64, u64) -> u64) -> (Row, bool) {
    let words: Vec<u64> = a.iter().zip(b).map(|(x, y)| op(*x, *y)).collect();
    let hit = words.iter().any(|w| *w != 0);
    (Row(words), hit)
}

/// The two folds supported by [`reduce`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Fold {
    And,
    Or,
}

/// Folds a sequence of possibly missing rows into one.
///
/// The first present row seeds the accumulator as a copy; every later row is
/// folded in over the common prefix only.
pub(crate) fn reduce<'a, I>(rows: I, fold: Fold, policy: EmptyPolicy) -> Row
where
    I: IntoIterator<Item = Option<&'a Row>>,
{
    let mut acc: Option<Row> = None;
    for row in rows {
        let Some(row) = row else {
            match policy {
                EmptyPolicy::SkipMissing => continue,
                EmptyPolicy::ShortCircuit => return Row::default(),
            }
        };
        match acc.as_mut() {
            None => acc = Some(row.clone()),
            Some(acc) => match fold {
                Fold::And => acc.in_place_bit_and(row),
                Fold::Or => acc.in_place_bit_or(row),
            },
        }
    }
    acc.unwrap_or_default()
}
