use std::time::Instant;

use parking_lot::Mutex;

/// Start/finish timing pair with microsecond resolution.
///
/// Calls must come in strict `mark_start` / `mark_finish` pairs; nesting
/// overwrites the start mark.
#[derive(Debug, Default)]
pub struct Stopwatch {
    started: Mutex<Option<Instant>>,
}

impl Stopwatch {
    /// Creates a stopwatch with no start mark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current instant as the start mark.
    pub fn mark_start(&self) {
        *self.started.lock() = Some(Instant::now());
    }

    /// Microseconds elapsed since the last [`mark_start`], or `0` if there
    /// was none.
    ///
    /// # Examples
    /// ```
    /// use data_matrix::Stopwatch;
    ///
    /// let watch = Stopwatch::new();
    /// assert_eq!(watch.mark_finish(), 0);
    /// watch.mark_start();
    /// std::thread::sleep(std::time::Duration::from_millis(2));
    /// assert!(watch.mark_finish() >= 2_000);
    /// ```
    ///
    /// [`mark_start`]: Stopwatch::mark_start
    pub fn mark_finish(&self) -> u64 {
        self.started.lock().map_or(0, |started| {
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
        })
    }
}
