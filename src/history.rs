use std::collections::VecDeque;

use crate::canvas::Canvas;
use crate::raster::PixelBuffer;

// ============================================================================
// HISTORY — snapshot-based undo/redo over the base buffer
// ============================================================================

pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Undo/redo stacks of whole-base snapshots where the undo stack's top is
/// always the current committed state.
///
/// - `push()` once per finished gesture (after the stroke/shape lands).
/// - New edits clear the redo stack.
/// - Transparent canvases snapshot and restore with alpha intact.
pub struct History {
    undo: VecDeque<PixelBuffer>, // back = current
    redo: VecDeque<PixelBuffer>, // back = next
    max_depth: usize,
}

impl History {
    /// Seed the history with the canvas's current base as the initial state;
    /// the undo stack is never empty afterwards.
    pub fn new(canvas: &Canvas) -> Self {
        Self::with_depth(canvas, DEFAULT_MAX_DEPTH)
    }

    pub fn with_depth(canvas: &Canvas, max_depth: usize) -> Self {
        let mut undo = VecDeque::new();
        undo.push_back(canvas.snapshot_base());
        Self {
            undo,
            redo: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Capture the current base as the new current entry. Call AFTER the
    /// gesture finishes. Drops the oldest entry past the depth cap and
    /// invalidates redo (new-branch rule).
    pub fn push(&mut self, canvas: &Canvas) {
        if self.undo.len() >= self.max_depth {
            self.undo.pop_front();
        }
        self.undo.push_back(canvas.snapshot_base());
        self.redo.clear();
    }

    /// At least one non-current entry to step back to.
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Step back to the previous state; a no-op when there is none.
    pub fn undo(&mut self, canvas: &mut Canvas) {
        if !self.can_undo() {
            return;
        }
        if let Some(current) = self.undo.pop_back() {
            self.redo.push_back(current);
        }
        if let Some(previous) = self.undo.back() {
            canvas.restore_base(previous);
        }
    }

    /// Step forward to the next state, if any.
    pub fn redo(&mut self, canvas: &mut Canvas) {
        let Some(next) = self.redo.pop_back() else {
            return;
        };
        canvas.restore_base(&next);
        if self.undo.len() >= self.max_depth {
            self.undo.pop_front();
        }
        self.undo.push_back(next);
    }

    /// Drop all history and reseed from the current base.
    pub fn clear(&mut self, canvas: &Canvas) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push_back(canvas.snapshot_base());
    }

    /// The snapshot corresponding to the current committed state. Direct
    /// tools restore from this on cancel.
    pub fn current(&self) -> &PixelBuffer {
        // Invariant: the undo stack is never empty.
        self.undo.back().unwrap_or_else(|| unreachable!("undo stack is never empty"))
    }

    pub fn depth(&self) -> usize {
        self.undo.len()
    }
}
