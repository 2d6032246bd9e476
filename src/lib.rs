//! An in-memory bitmap index for filtering and faceting.
//!
//! Every record id is assigned a fixed bit coordinate inside a family of
//! equally wide bit rows. Callers light up or clear bits per row and combine
//! rows with AND/OR to answer "which ids satisfy X and Y" without touching
//! record payloads.
//!
//! [`DataMatrix`] is the main struct in this library.
//!
//! # Examples
//! ```
//! use data_matrix::DataMatrix;
//!
//! let matrix = DataMatrix::new();
//! matrix.init("records", [1, 2, 3]);
//! matrix.add_point(4);
//! assert_eq!(matrix.width(), 1);
//!
//! let key = matrix.light_up(1, 7);
//! let (row, stored) = matrix.get_row(key);
//! assert!(stored);
//! assert_eq!(row.popcount(), 1);
//! assert_eq!(matrix.resolve_ids(&row), vec![1]);
//! ```
//!
//! # Features
//!
//! - Bulk id initialization with deterministic coordinates
//! - Incremental id insertion that reuses coordinates freed by removal
//! - Lazily materialized rows copied from an all-zero default row
//! - Pairwise [`bit_and`] / [`bit_or`] and multi-row AND/OR reductions
//!   with a configurable [`EmptyPolicy`]
//! - One reader/writer lock around the whole structure; every call is atomic
//! - Optional `serde` support for [`Coordinate`], [`Row`] and [`EmptyPolicy`]
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod algebra;
mod coord;
mod error;
mod index;
mod matrix;
mod row;
mod stopwatch;
mod store;

pub use algebra::{EmptyPolicy, bit_and, bit_or};
pub use coord::{Coordinate, WORD_BITS, word_count};
pub use error::{HandlerError, MatrixError, Result};
pub use matrix::DataMatrix;
pub use row::Row;
pub use stopwatch::Stopwatch;
