//! Turns user intents into track store edits and fans the results out.
//!
//! For every applied structural edit listeners see, in this order:
//! 1. [`EditorEvent::TrackChanged`] with the new points,
//! 2. [`EditorEvent::StatsUpdated`] recomputed from those same points,
//! 3. [`EditorEvent::SelectionChanged`] then [`EditorEvent::ControlsChanged`].
//!
//! Selection intents publish only the last two. A rejected intent publishes
//! [`EditorEvent::ControlsChanged`] and nothing else.

use std::cell::RefCell;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Rejection;
use crate::events::{EditKind, EditorEvent, EditorListeners, EventFilter, SubscriptionId};
use crate::gate::MutationGate;
use crate::pipeline::StatsPipeline;
use crate::point::TrackPoint;
use crate::stats::{StatsParams, StatsSnapshot};
use crate::track_store::{ControlStates, TrackStore};

/// A request coming from the list, map or keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    Load(Vec<TrackPoint>),
    Select(Option<usize>),
    MoveCursor(isize),
    ToggleChecked(usize),
    ClearChecked,
    DeleteOne(usize),
    /// Delete everything before the highlighted point.
    DeleteBefore,
    /// Delete everything after the highlighted point.
    DeleteAfter,
    DeleteSelected,
    Undo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Rejected(Rejection),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            EditOutcome::Applied => None,
            EditOutcome::Rejected(r) => Some(*r),
        }
    }
}

#[derive(Debug)]
pub struct EditOrchestrator {
    store: RefCell<TrackStore>,
    pipeline: RefCell<StatsPipeline>,
    listeners: EditorListeners,
    gate: MutationGate,
}

impl Default for EditOrchestrator {
    fn default() -> Self {
        Self::new(StatsParams::default())
    }
}

impl EditOrchestrator {
    pub fn new(params: StatsParams) -> Self {
        EditOrchestrator {
            store: RefCell::new(TrackStore::new()),
            pipeline: RefCell::new(StatsPipeline::new(params)),
            listeners: EditorListeners::new(),
            gate: MutationGate::new(),
        }
    }

    pub fn subscribe<F>(&self, filter: EventFilter, listener: F) -> SubscriptionId
    where
        F: Fn(&EditorEvent) + 'static,
    {
        self.listeners.subscribe(filter, listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn handle(&self, intent: UserIntent) -> EditOutcome {
        match intent {
            UserIntent::Load(points) => self.apply_edit(EditKind::Load, move |store| {
                store.load(points);
                Ok(())
            }),
            UserIntent::DeleteOne(index) => {
                self.apply_edit(EditKind::DeleteOne, |store| store.delete_one(index).map(|_| ()))
            }
            UserIntent::DeleteBefore => self.apply_edit(EditKind::DeleteBefore, |store| {
                let cursor = store.cursor().ok_or(Rejection::NoCursor)?;
                store.delete_before(cursor).map(|_| ())
            }),
            UserIntent::DeleteAfter => self.apply_edit(EditKind::DeleteAfter, |store| {
                let cursor = store.cursor().ok_or(Rejection::NoCursor)?;
                store.delete_after(cursor).map(|_| ())
            }),
            UserIntent::DeleteSelected => {
                self.apply_edit(EditKind::DeleteSelected, |store| store.delete_selected().map(|_| ()))
            }
            UserIntent::Undo => self.apply_edit(EditKind::Undo, |store| store.undo().map(|_| ())),
            UserIntent::Select(index) => self.apply_selection(|store| store.select(index)),
            UserIntent::MoveCursor(step) => {
                self.apply_selection(|store| store.move_cursor(step).map(|_| ()))
            }
            UserIntent::ToggleChecked(index) => {
                self.apply_selection(|store| store.toggle_checked(index).map(|_| ()))
            }
            UserIntent::ClearChecked => self.apply_selection(|store| {
                store.clear_checked();
                Ok(())
            }),
        }
    }

    /// Copy of the current points.
    pub fn points(&self) -> Arc<[TrackPoint]> {
        Arc::from(self.store.borrow().points())
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.store.borrow().cursor()
    }

    pub fn checked(&self) -> Vec<usize> {
        self.store.borrow().selection().checked().iter().copied().collect()
    }

    pub fn undo_depth(&self) -> usize {
        self.store.borrow().undo_depth()
    }

    pub fn controls(&self) -> ControlStates {
        self.store.borrow().controls()
    }

    pub fn stats(&self) -> Arc<StatsSnapshot> {
        self.pipeline.borrow().latest()
    }

    fn apply_edit<F>(&self, kind: EditKind, mutate: F) -> EditOutcome
    where
        F: FnOnce(&mut TrackStore) -> Result<(), Rejection>,
    {
        let _ticket = match self.gate.enter() {
            Ok(ticket) => ticket,
            Err(rejection) => {
                self.log_rejection(&kind.to_string(), rejection);
                self.publish_controls();
                return EditOutcome::Rejected(rejection);
            }
        };

        let result = mutate(&mut self.store.borrow_mut());
        if let Err(rejection) = result {
            self.log_rejection(&kind.to_string(), rejection);
            self.publish_controls();
            return EditOutcome::Rejected(rejection);
        }

        let points = self.points();
        self.listeners.publish(&EditorEvent::TrackChanged {
            kind,
            points: Arc::clone(&points),
        });
        let (snapshot, recomputes) = {
            let mut pipeline = self.pipeline.borrow_mut();
            (pipeline.on_track_changed(&points), pipeline.recompute_count())
        };
        debug!("Applied {}, {} points, stats recompute #{}", kind, points.len(), recomputes);
        self.listeners.publish(&EditorEvent::StatsUpdated(snapshot));
        self.publish_selection();
        self.publish_controls();
        EditOutcome::Applied
    }

    fn apply_selection<F>(&self, change: F) -> EditOutcome
    where
        F: FnOnce(&mut TrackStore) -> Result<(), Rejection>,
    {
        let result = change(&mut self.store.borrow_mut());

        match result {
            Ok(()) => {
                self.publish_selection();
                self.publish_controls();
                EditOutcome::Applied
            }
            Err(rejection) => {
                self.log_rejection("selection change", rejection);
                self.publish_controls();
                EditOutcome::Rejected(rejection)
            }
        }
    }

    /// `Busy` is logged at warn, validation failures at debug.
    fn log_rejection(&self, action: &str, rejection: Rejection) {
        if rejection.is_validation() {
            debug!("Rejected {}: {}", action, rejection);
        } else {
            warn!("Rejected {} (gate {:?}): {}", action, self.gate.phase(), rejection);
        }
    }

    fn publish_selection(&self) {
        let event = {
            let store = self.store.borrow();
            EditorEvent::SelectionChanged {
                cursor: store.cursor(),
                checked: store.selection().checked().iter().copied().collect(),
            }
        };
        self.listeners.publish(&event);
    }

    fn publish_controls(&self) {
        let controls = self.controls();
        self.listeners.publish(&EditorEvent::ControlsChanged(controls));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventCategory;
    use std::rc::Rc;

    fn points(n: usize) -> Vec<TrackPoint> {
        (0..n)
            .map(|i| TrackPoint::new(35.0, 139.0 + i as f64 * 0.001).with_elevation(100.0 + i as f64))
            .collect()
    }

    fn recorder(editor: &EditOrchestrator) -> Rc<RefCell<Vec<EventCategory>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        editor.subscribe(EventFilter::All, move |e| l.borrow_mut().push(e.category()));
        log
    }

    #[test]
    fn test_applied_edit_event_order() {
        let editor = EditOrchestrator::default();
        editor.handle(UserIntent::Load(points(4)));
        let log = recorder(&editor);

        assert!(editor.handle(UserIntent::DeleteOne(2)).is_applied());
        assert_eq!(
            *log.borrow(),
            vec![
                EventCategory::Track,
                EventCategory::Stats,
                EventCategory::Selection,
                EventCategory::Controls,
            ]
        );
    }

    #[test]
    fn test_rejected_edit_only_publishes_controls() {
        let editor = EditOrchestrator::default();
        editor.handle(UserIntent::Load(points(3)));
        let log = recorder(&editor);

        let outcome = editor.handle(UserIntent::DeleteBefore);
        assert_eq!(outcome, EditOutcome::Rejected(Rejection::NoCursor));
        assert_eq!(editor.handle(UserIntent::Undo).rejection(), Some(Rejection::NothingToUndo));
        assert_eq!(*log.borrow(), vec![EventCategory::Controls, EventCategory::Controls]);
    }

    #[test]
    fn test_selection_intent_events() {
        let editor = EditOrchestrator::default();
        editor.handle(UserIntent::Load(points(3)));
        let log = recorder(&editor);

        assert!(editor.handle(UserIntent::ToggleChecked(1)).is_applied());
        assert_eq!(*log.borrow(), vec![EventCategory::Selection, EventCategory::Controls]);
        assert_eq!(editor.checked(), vec![1]);
        assert!(editor.controls().can_delete_selected);
    }

    #[test]
    fn test_clear_checked() {
        let editor = EditOrchestrator::default();
        editor.handle(UserIntent::Load(points(4)));
        editor.handle(UserIntent::ToggleChecked(0));
        editor.handle(UserIntent::ToggleChecked(3));
        let log = recorder(&editor);

        assert!(editor.handle(UserIntent::ClearChecked).is_applied());
        assert!(editor.checked().is_empty());
        assert!(!editor.controls().can_delete_selected);
        assert_eq!(*log.borrow(), vec![EventCategory::Selection, EventCategory::Controls]);
    }

    #[test]
    fn test_stats_follow_every_mutation() {
        let editor = EditOrchestrator::default();
        editor.handle(UserIntent::Load(points(5)));
        let full = editor.stats().total_distance_km;

        editor.handle(UserIntent::Select(Some(2)));
        editor.handle(UserIntent::DeleteAfter);
        assert_eq!(editor.len(), 3);
        assert!(editor.stats().total_distance_km < full);
        assert_eq!(editor.stats().cumulative_distance_km.len(), 3);

        editor.handle(UserIntent::Undo);
        assert_eq!(editor.stats().total_distance_km, full);
    }
}
