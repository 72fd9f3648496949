//! Typed editor events and the listener registry.
//!
//! Renderers (map, point list, elevation profile) subscribe here instead of
//! being handed callbacks. The orchestrator publishes in a fixed order, see
//! [`crate::orchestrator::EditOrchestrator`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use crate::point::TrackPoint;
use crate::stats::StatsSnapshot;
use crate::track_store::ControlStates;

/// Structural edits that replace the track contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Load,
    DeleteOne,
    DeleteBefore,
    DeleteAfter,
    DeleteSelected,
    Undo,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditKind::Load => "load",
            EditKind::DeleteOne => "delete one",
            EditKind::DeleteBefore => "delete before",
            EditKind::DeleteAfter => "delete after",
            EditKind::DeleteSelected => "delete selected",
            EditKind::Undo => "undo",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The point sequence changed; redraw polylines and rows.
    TrackChanged {
        kind: EditKind,
        points: Arc<[TrackPoint]>,
    },
    StatsUpdated(Arc<StatsSnapshot>),
    SelectionChanged {
        cursor: Option<usize>,
        checked: Vec<usize>,
    },
    ControlsChanged(ControlStates),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    Track,
    Stats,
    Selection,
    Controls,
}

impl EditorEvent {
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::TrackChanged { .. } => EventCategory::Track,
            EditorEvent::StatsUpdated(_) => EventCategory::Stats,
            EditorEvent::SelectionChanged { .. } => EventCategory::Selection,
            EditorEvent::ControlsChanged(_) => EventCategory::Controls,
        }
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &EditorEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type Listener = Rc<dyn Fn(&EditorEvent)>;

/// Listeners are called in subscription order on the publishing thread.
#[derive(Default)]
pub struct EditorListeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, EventFilter, Listener)>>,
}

impl EditorListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, filter: EventFilter, listener: F) -> SubscriptionId
    where
        F: Fn(&EditorEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push((id, filter, Rc::new(listener)));
        debug!("Subscription {} added", id);
        id
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(sid, _, _)| *sid != id);
        let removed = entries.len() != before;
        if removed {
            debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Deliver to every matching listener. Returns how many were called.
    ///
    /// The registry is snapshotted first, so listeners may subscribe,
    /// unsubscribe or trigger further edits while being notified.
    pub fn publish(&self, event: &EditorEvent) -> usize {
        let targets: Vec<Listener> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, filter, _)| filter.matches(event))
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        for listener in &targets {
            listener(event);
        }
        targets.len()
    }
}

impl fmt::Debug for EditorListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorListeners")
            .field("subscriptions", &self.len())
            .finish()
    }
}
