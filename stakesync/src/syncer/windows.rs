use std::cmp::min;

use derive_more::Display;

/// An inclusive block range scanned in one tick
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[display("[{start}, {end}]")]
pub struct Window {
    pub start: u64,
    pub end: u64,
}

impl Window {
    /// The next window starting at `start`, at most `size` blocks long and
    /// never past `current`.
    ///
    /// None while the chain has not moved past `start`.
    pub fn compute(start: u64, current: u64, size: u64) -> Option<Self> {
        if current <= start || size == 0 {
            return None;
        }

        Some(Self {
            start,
            end: min(start.saturating_add(size - 1), current),
        })
    }

    pub fn block_count(&self) -> u64 {
        self.end - self.start + 1
    }
}
