//! Canonical point sequence, selection state and deletion history.
//!
//! Every structural edit funnels through `TrackStore::remove_positions`,
//! which records what was removed and repairs the selection with
//! [`Selection::repair_after_removal`]. Undo is the only way points come
//! back, always at the positions they were removed from.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::Rejection;
use crate::point::TrackPoint;

/// One undo unit: the removed points and the positions they held.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionRecord {
    indices: Vec<usize>,
    points: Vec<TrackPoint>,
}

impl DeletionRecord {
    /// Indices in strictly ascending order, relative to the track before the deletion.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Single highlight plus the checkbox set, both positions in the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cursor: Option<usize>,
    checked: BTreeSet<usize>,
}

impl Selection {
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn checked(&self) -> &BTreeSet<usize> {
        &self.checked
    }

    /// Shift surviving positions down past removed ones.
    ///
    /// `removed` must be ascending. A removed cursor lands on the next
    /// surviving point, clamped to the new end; checked positions that were
    /// removed are dropped.
    pub fn repair_after_removal(&mut self, removed: &[usize], new_len: usize) {
        self.cursor = self.cursor.and_then(|c| {
            if new_len == 0 {
                return None;
            }
            Some(shift_down(c, removed).min(new_len - 1))
        });

        self.checked = self
            .checked
            .iter()
            .filter(|i| removed.binary_search(i).is_err())
            .map(|&i| shift_down(i, removed))
            .filter(|&i| i < new_len)
            .collect();
    }

    fn clear(&mut self) {
        self.cursor = None;
        self.checked.clear();
    }
}

/// Position of `index` once the ascending `removed` positions are gone.
pub fn shift_down(index: usize, removed: &[usize]) -> usize {
    index - removed.partition_point(|&r| r < index)
}

/// Which edit controls the current state allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlStates {
    pub can_undo: bool,
    pub can_delete_before: bool,
    pub can_delete_after: bool,
    pub can_delete_selected: bool,
    pub can_export: bool,
}

#[derive(Debug, Default)]
pub struct TrackStore {
    points: Vec<TrackPoint>,
    selection: Selection,
    undo_stack: Vec<DeletionRecord>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn cursor(&self) -> Option<usize> {
        self.selection.cursor
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn controls(&self) -> ControlStates {
        let len = self.points.len();
        let cursor = self.selection.cursor;
        ControlStates {
            can_undo: self.can_undo(),
            can_delete_before: matches!(cursor, Some(c) if c > 0),
            can_delete_after: matches!(cursor, Some(c) if c + 1 < len),
            can_delete_selected: !self.selection.checked.is_empty(),
            can_export: len > 0,
        }
    }

    /// Replace the whole track. History and selection start over.
    pub fn load(&mut self, points: Vec<TrackPoint>) {
        debug!("Loading {} points, dropping {} undo records", points.len(), self.undo_stack.len());
        self.points = points;
        self.undo_stack.clear();
        self.selection.clear();
    }

    pub fn select(&mut self, index: Option<usize>) -> Result<(), Rejection> {
        if let Some(i) = index {
            self.check_index(i)?;
        }
        self.selection.cursor = index;
        Ok(())
    }

    /// Move the highlight by `step`, clamped to the track.
    ///
    /// Without a highlight, forward steps start from the first point and
    /// backward steps from the last one.
    pub fn move_cursor(&mut self, step: isize) -> Result<usize, Rejection> {
        let len = self.points.len();
        if len == 0 {
            return Err(Rejection::NoCursor);
        }
        let start = match self.selection.cursor {
            Some(c) => c as isize,
            None if step > 0 => 0,
            None => len as isize - 1,
        };
        let target = (start + step).clamp(0, len as isize - 1) as usize;
        self.selection.cursor = Some(target);
        Ok(target)
    }

    /// Flip the checkbox of one point. Returns the new checked state.
    pub fn toggle_checked(&mut self, index: usize) -> Result<bool, Rejection> {
        self.check_index(index)?;
        if self.selection.checked.remove(&index) {
            Ok(false)
        } else {
            self.selection.checked.insert(index);
            Ok(true)
        }
    }

    pub fn clear_checked(&mut self) {
        self.selection.checked.clear();
    }

    pub fn delete_one(&mut self, index: usize) -> Result<&DeletionRecord, Rejection> {
        self.check_index(index)?;
        debug!("Deleting point {}", index);
        self.remove_positions(vec![index]);
        Ok(self.latest_record())
    }

    /// Remove every point before `index`; the highlight moves to the new first point.
    pub fn delete_before(&mut self, index: usize) -> Result<&DeletionRecord, Rejection> {
        self.check_index(index)?;
        if index == 0 {
            return Err(Rejection::EmptyRange);
        }
        debug!("Deleting {} points before {}", index, index);
        self.remove_positions((0..index).collect());
        self.selection.cursor = Some(0);
        Ok(self.latest_record())
    }

    /// Remove every point after `index`; the highlight is left alone.
    pub fn delete_after(&mut self, index: usize) -> Result<&DeletionRecord, Rejection> {
        self.check_index(index)?;
        let len = self.points.len();
        if index + 1 >= len {
            return Err(Rejection::EmptyRange);
        }
        debug!("Deleting {} points after {}", len - index - 1, index);
        self.remove_positions((index + 1..len).collect());
        Ok(self.latest_record())
    }

    /// Remove every checked point as a single undo unit.
    pub fn delete_selected(&mut self) -> Result<&DeletionRecord, Rejection> {
        if self.selection.checked.is_empty() {
            return Err(Rejection::EmptySelection);
        }
        // BTreeSet iteration is ascending.
        let indices: Vec<usize> = self.selection.checked.iter().copied().collect();
        debug!("Deleting {} checked points", indices.len());
        self.selection.checked.clear();
        self.remove_positions(indices);
        Ok(self.latest_record())
    }

    /// Put the most recent deletion back where it came from.
    ///
    /// Returns the position of the first restored point, which also becomes
    /// the highlight. Checkboxes are cleared.
    pub fn undo(&mut self) -> Result<usize, Rejection> {
        let record = self.undo_stack.pop().ok_or(Rejection::NothingToUndo)?;
        debug!(
            "Restoring {} points, {} undo records left",
            record.len(),
            self.undo_stack.len()
        );

        let mut first_restored = None;
        for (index, point) in record.indices.into_iter().zip(record.points) {
            let at = if index > self.points.len() {
                warn!(
                    "Undo index {} beyond track length {}, appending",
                    index,
                    self.points.len()
                );
                self.points.len()
            } else {
                index
            };
            self.points.insert(at, point);
            first_restored.get_or_insert(at);
        }

        self.selection.checked.clear();
        self.selection.cursor = first_restored;
        // Records are never empty, so a point was restored.
        Ok(first_restored.unwrap_or(0))
    }

    fn check_index(&self, index: usize) -> Result<(), Rejection> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(Rejection::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    /// Split the track in one pass into survivors and the removed points,
    /// push the record and repair the selection.
    ///
    /// `indices` must be non-empty, strictly ascending and in range.
    fn remove_positions(&mut self, indices: Vec<usize>) {
        let old = std::mem::take(&mut self.points);
        let mut kept = Vec::with_capacity(old.len() - indices.len());
        let mut removed = Vec::with_capacity(indices.len());
        let mut next = indices.iter().peekable();

        for (i, point) in old.into_iter().enumerate() {
            if next.peek() == Some(&&i) {
                next.next();
                removed.push(point);
            } else {
                kept.push(point);
            }
        }

        self.points = kept;
        self.selection.repair_after_removal(&indices, self.points.len());
        self.undo_stack.push(DeletionRecord {
            indices,
            points: removed,
        });
    }

    fn latest_record(&self) -> &DeletionRecord {
        &self.undo_stack[self.undo_stack.len() - 1]
    }
}
