use crate::constants::{MAX_DRAG_OFFSET_PERCENT, MINIMIZE_THRESHOLD_PERCENT};

/// What a released drag commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Minimize,
    SpringBack,
}

/// An in-progress drag of an overlay's handle.
///
/// Offsets are percentages of the overlay's own height, `0` being fully open
/// and `100` fully pushed below the viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragGesture {
    start_row: u16,
    origin: u16,
    offset: u16,
    extent: u16,
}

impl DragGesture {
    /// Starts a drag at `start_row`, capturing the overlay's current offset as
    /// the origin. `extent` is the overlay height in rows.
    pub fn begin(start_row: u16, origin: u16, extent: u16) -> Self {
        let origin = origin.min(MAX_DRAG_OFFSET_PERCENT);
        Self {
            start_row,
            origin,
            offset: origin,
            extent: extent.max(1),
        }
    }

    /// Moves the pointer to `row` and returns the new offset, clamped to
    /// `0..=MAX_DRAG_OFFSET_PERCENT`.
    pub fn update(&mut self, row: u16) -> u16 {
        let delta_rows = i32::from(row) - i32::from(self.start_row);
        let delta = delta_rows * 100 / i32::from(self.extent);
        let next = (i32::from(self.origin) + delta).clamp(0, i32::from(MAX_DRAG_OFFSET_PERCENT));
        self.offset = next as u16;
        self.offset
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn finish(self) -> DragOutcome {
        if self.offset >= MINIMIZE_THRESHOLD_PERCENT {
            DragOutcome::Minimize
        } else {
            DragOutcome::SpringBack
        }
    }
}
