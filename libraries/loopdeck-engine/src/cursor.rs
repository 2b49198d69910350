//! Current-index reconciliation
//!
//! Every command that shifts track positions reports the change here and
//! gets back the index that keeps pointing at the same track (or the
//! nearest valid one when that track is gone).

/// Positional change applied to the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// Track at `index` was removed
    Removed {
        /// Index before removal
        index: usize,
    },

    /// Track at `from` now sits at `to`
    Moved {
        /// Index before the move
        from: usize,
        /// Index after the move
        to: usize,
    },

    /// Every track was removed
    Cleared,
}

/// Compute the current index after `change`
///
/// `len_after` is the playlist length once the change is applied. An empty
/// playlist always yields 0.
pub fn reconcile(current: usize, change: ListChange, len_after: usize) -> usize {
    if len_after == 0 {
        return 0;
    }

    match change {
        ListChange::Removed { index } => {
            let shifted = if index < current { current - 1 } else { current };
            shifted.min(len_after - 1)
        }
        ListChange::Moved { from, to } => {
            if from == to {
                current
            } else if from == current {
                to
            } else if from < current && current <= to {
                current - 1
            } else if to <= current && current < from {
                current + 1
            } else {
                current
            }
        }
        ListChange::Cleared => 0,
    }
}
