//! Column order operations and drag activation.
//!
//! Pure functions over an ordered list of column ids. The pinned selection
//! column always sits at index 0 and never takes part in a drag.

use crate::model::{ColumnId, ColumnSet};
use std::time::Duration;

/// Pointer drags start only after the pointer travels this far (px).
pub const POINTER_ACTIVATION_DISTANCE: f64 = 8.0;

/// Touch drags start only after the finger rests this long.
pub const TOUCH_ACTIVATION_DELAY: Duration = Duration::from_millis(250);

/// Movement (px) tolerated during the touch delay before the gesture is
/// treated as a scroll instead of a drag.
pub const TOUCH_ACTIVATION_TOLERANCE: f64 = 5.0;

/// Move the selection column to the front, inserting it if missing.
pub fn ensure_pinned(mut order: Vec<ColumnId>) -> Vec<ColumnId> {
    order.retain(|id| !id.is_select());
    order.insert(0, ColumnId::select());
    order
}

/// Reconcile a (possibly stale) order with the current column set: unknown
/// and duplicate ids are dropped, columns missing from `order` are appended
/// in definition order, and the selection column is pinned first.
pub fn normalize_order(order: &[ColumnId], columns: &ColumnSet) -> Vec<ColumnId> {
    let mut out: Vec<ColumnId> = Vec::with_capacity(columns.len());
    for id in order {
        if columns.get(id.as_str()).is_some() && !out.contains(id) {
            out.push(id.clone());
        }
    }
    for column in columns.all() {
        if !out.contains(&column.id) {
            out.push(column.id.clone());
        }
    }
    ensure_pinned(out)
}

/// Columns that may be picked up by a drag.
pub fn drag_candidates(order: &[ColumnId]) -> Vec<&ColumnId> {
    order.iter().filter(|id| !id.is_select()).collect()
}

/// Remove the element at `from` and reinsert it at `to`.
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if from >= out.len() || to >= out.len() {
        return out;
    }
    let item = out.remove(from);
    out.insert(to, item);
    out
}

/// Drop `active` onto `over`: the dragged column takes the target's index,
/// landing after it when moving right and before it when moving left.
///
/// Unknown ids, identical ids and the selection column leave the order
/// unchanged.
pub fn move_column(order: &[ColumnId], active: &ColumnId, over: &ColumnId) -> Vec<ColumnId> {
    if active == over || active.is_select() || over.is_select() {
        return order.to_vec();
    }
    let from = order.iter().position(|id| id == active);
    let to = order.iter().position(|id| id == over);
    match (from, to) {
        (Some(from), Some(to)) => array_move(order, from, to),
        _ => order.to_vec(),
    }
}

/// Which side of the drop target the dragged column lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Land left of the target.
    Before,
    /// Land right of the target.
    After,
}

/// Remove `id` and reinsert it immediately before or after `target`,
/// preserving the relative order of every other column.
pub fn move_relative(
    order: &[ColumnId],
    id: &ColumnId,
    target: &ColumnId,
    placement: Placement,
) -> Vec<ColumnId> {
    if id == target || id.is_select() || target.is_select() || !order.contains(id) {
        return order.to_vec();
    }
    let mut out: Vec<ColumnId> = order.iter().filter(|c| *c != id).cloned().collect();
    let Some(target_index) = out.iter().position(|c| c == target) else {
        return order.to_vec();
    };
    let index = match placement {
        Placement::Before => target_index,
        Placement::After => target_index + 1,
    };
    out.insert(index, id.clone());
    out
}

/// Input device driving a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputModality {
    /// Mouse or pen; activates after a travel distance.
    Pointer,
    /// Touch; activates after a hold delay.
    Touch,
    /// Keyboard; always active.
    Keyboard,
}

/// Lifecycle of a drag gesture before the column is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Activation constraint not yet satisfied.
    Pending,
    /// Reordering is live.
    Active,
    /// Gesture abandoned (touch moved too early); no reorder happens.
    Cancelled,
}

/// Tracks whether a press has turned into a reorder drag.
///
/// Ordinary clicks and scrolls must never reorder columns, so each modality
/// has its own activation constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragGesture {
    modality: InputModality,
    phase: DragPhase,
}

impl DragGesture {
    /// Start tracking a press. Keyboard drags are active immediately.
    pub fn begin(modality: InputModality) -> Self {
        let phase = match modality {
            InputModality::Keyboard => DragPhase::Active,
            InputModality::Pointer | InputModality::Touch => DragPhase::Pending,
        };
        Self { modality, phase }
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Whether the drag may reorder columns.
    pub fn is_active(&self) -> bool {
        self.phase == DragPhase::Active
    }

    /// Feed the time since press and the distance moved since press.
    pub fn update(&mut self, elapsed: Duration, distance: f64) -> DragPhase {
        if self.phase != DragPhase::Pending {
            return self.phase;
        }
        self.phase = match self.modality {
            InputModality::Keyboard => DragPhase::Active,
            InputModality::Pointer if distance >= POINTER_ACTIVATION_DISTANCE => DragPhase::Active,
            InputModality::Pointer => DragPhase::Pending,
            InputModality::Touch if distance > TOUCH_ACTIVATION_TOLERANCE => DragPhase::Cancelled,
            InputModality::Touch if elapsed >= TOUCH_ACTIVATION_DELAY => DragPhase::Active,
            InputModality::Touch => DragPhase::Pending,
        };
        self.phase
    }
}

#[cfg(test)]
#[path = "column_order_tests.rs"]
mod tests;
